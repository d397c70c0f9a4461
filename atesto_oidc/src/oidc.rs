//! OpenID Connect provider metadata

use serde::{Deserialize, Serialize};

/// The subset of an OIDC discovery document used for token verification
///
/// A conforming provider publishes this document at
/// `{issuer}/.well-known/openid-configuration`. Only the location of the
/// provider's key set is required here; a document without a `jwks_uri`
/// member is unusable and is rejected during deserialization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OidcConfiguration {
    /// The location of the provider's published key set
    pub jwks_uri: String,
}

/// The well-known discovery location for an issuer
#[must_use]
pub fn discovery_url(issuer: &str) -> String {
    format!("{}/.well-known/openid-configuration", issuer)
}
