//! Verification of third-party tokens via OpenID Connect discovery
//!
//! The [`RemoteVerifier`] checks tokens issued by an external identity
//! provider. Each verification call discovers the provider's published
//! key set over HTTP, locates the key named by the token's `kid`
//! header, and evaluates the token against the issuer, time-window, and
//! signature constraints.
//!
//! Nothing is cached between calls: every verification re-fetches the
//! discovery document and key set, trading latency for always-fresh key
//! material. Deployments that verify tokens on a hot path are expected
//! to layer a cache keyed by issuer URL around this component, and to
//! re-validate key freshness across `kid` values when doing so.
//!
//! # Feature flags
//!
//! This crate does not automatically enable TLS support in `reqwest`
//! itself. If your application already uses `reqwest` with some TLS
//! settings (native/OpenSSL/rustls), then this crate will use those
//! settings automatically. However, if the only reason you are using
//! `reqwest` is transitively through this crate, you may need to enable
//! the `default-tls` or `rustls-tls` feature to enable support for
//! calling out to an HTTPS endpoint.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod oidc;
mod verifier;

pub use oidc::OidcConfiguration;
pub use verifier::{RemoteVerifier, RemoteVerifyError};
