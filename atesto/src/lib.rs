//! Issuance and verification of signed, claim-bearing access tokens.
//!
//! This crate issues JWT-style tokens against named, immutable
//! [`TokenProfile`][profile::TokenProfile]s and verifies them against the
//! same configuration. The building blocks follow the JOSE family of
//! standards:
//!
//! * signatures and signing algorithms: [RFC7515][] / [RFC7518][]
//! * key material: [RFC7517][]
//! * tokens and claims: [RFC7519][]
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! Verification of tokens issued by third-party identity providers,
//! using OIDC discovery and remote key sets, lives in the companion
//! `atesto_oidc` crate.
//!
//! # Example
//!
//! ```
//! use aliri_base64::Base64UrlRef;
//! use atesto::{jwa, jwt, profile::TokenProfile, Jwk};
//!
//! let secret = Base64UrlRef::from_slice(b"keykeykeykeykeykeykeykeykeykeyke").to_owned();
//! let key = Jwk::from(jwa::Hmac::new(secret));
//!
//! let profile = TokenProfile::new(
//!     jwa::Algorithm::HS256,
//!     key,
//!     jwt::TokenId::from_static("id"),
//!     jwt::Issuer::from_static("issuer"),
//! )
//! .unwrap();
//!
//! let token = profile.issue("2", "test@example.com").unwrap();
//! assert!(profile.is_valid(&token));
//!
//! let parsed = profile.verify(&token).unwrap();
//! assert_eq!(parsed.subject_id().as_str(), "2");
//! assert_eq!(parsed.email(), "test@example.com");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod error;
pub mod jwa;
pub mod jwk;
mod jwks;
pub mod jws;
pub mod jwt;
pub mod profile;
pub mod registry;

#[doc(inline)]
pub use jwk::Jwk;
#[doc(inline)]
pub use jwks::Jwks;
#[doc(inline)]
pub use jwt::{Jwt, JwtRef};
#[doc(inline)]
pub use profile::{ClaimResult, TokenProfile};
#[doc(inline)]
pub use registry::ProfileRegistry;
