use std::error::Error as StdError;

use atesto::{
    jwt::{self, CoreHeaders},
    Jwks, JwtRef,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::oidc::{discovery_url, OidcConfiguration};

/// An error preventing remote verification from reaching a verdict
///
/// Constraint failures (wrong issuer, expired token, bad signature) are
/// not errors: they are reported as a `false` verdict from
/// [`RemoteVerifier::verify`]. The errors here are reserved for caller
/// mistakes and for tokens or provider responses that could not be
/// processed at all.
#[derive(Debug, Error)]
pub enum RemoteVerifyError {
    /// The expected issuer is not a well-formed absolute URL
    ///
    /// This is a caller configuration error, raised before any network
    /// I/O, and is distinguished from token-validity failures since it
    /// is never an attacker-controlled condition.
    #[error("issuer '{issuer}' is not a valid absolute URL")]
    InvalidIssuerUrl {
        /// The offending issuer value
        issuer: String,
        /// The underlying parse failure
        #[source]
        source: url::ParseError,
    },

    /// The token could not be verified
    ///
    /// Covers malformed tokens, discovery and key-set fetch failures,
    /// and unusable published keys. The original cause is preserved for
    /// diagnostics, but callers are expected to treat every variant of
    /// this condition as "reject this token" rather than branching on
    /// the sub-cause.
    #[error("invalid token")]
    InvalidToken(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

fn invalid_token(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> RemoteVerifyError {
    RemoteVerifyError::InvalidToken(source.into())
}

/// A verifier for tokens issued by external identity providers
///
/// Holds only an HTTP client; it may be cloned and shared freely across
/// tasks, and concurrent verifications do not coordinate with one
/// another.
#[derive(Debug, Clone)]
#[must_use]
pub struct RemoteVerifier {
    client: Client,
}

impl RemoteVerifier {
    /// Constructs a verifier with a default HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be
    /// constructed.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("atesto_oidc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client))
    }

    /// Constructs a verifier using the provided HTTP client
    ///
    /// Timeouts, proxies, and TLS configuration belong to the client;
    /// this verifier adds no retries and no caching of its own.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Verifies a token against the issuer's published key set
    ///
    /// The issuer's OIDC discovery document and key set are fetched
    /// fresh, the key matching the token's `kid` header is located, and
    /// the token is evaluated against the issuer, time-window, and
    /// signature constraints, short-circuiting on the first failure.
    /// The time-window check is loose: absent `nbf`/`exp` claims are
    /// tolerated, since some providers omit them.
    ///
    /// Returns `Ok(true)` when every constraint holds and `Ok(false)`
    /// when the token is well-formed but rejected by a constraint.
    ///
    /// # Errors
    ///
    /// * [`RemoteVerifyError::InvalidIssuerUrl`] if `issuer` is not an
    ///   absolute URL; no network request is made in this case.
    /// * [`RemoteVerifyError::InvalidToken`] if the token cannot be
    ///   parsed, discovery or the key-set fetch fails, or no usable key
    ///   matches the token's `kid`.
    pub async fn verify(
        &self,
        token: &JwtRef,
        issuer: &str,
    ) -> Result<bool, RemoteVerifyError> {
        if let Err(source) = Url::parse(issuer) {
            tracing::debug!(%issuer, "issuer is not an absolute URL");
            return Err(RemoteVerifyError::InvalidIssuerUrl {
                issuer: issuer.to_owned(),
                source,
            });
        }

        let decomposed: jwt::Decomposed = token.decompose().map_err(invalid_token)?;

        // The issuer string is used verbatim, not in its normalized URL
        // form, both for the discovery location and the `iss` comparison.
        let config: OidcConfiguration = self.fetch_json(&discovery_url(issuer)).await?;
        let jwks: Jwks = self.fetch_json(&config.jwks_uri).await?;

        let kid = decomposed.kid().ok_or_else(|| {
            tracing::debug!("token header carries no key id");
            invalid_token("no key located for token")
        })?;

        let key = jwks.get_key_by_id(kid).ok_or_else(|| {
            tracing::debug!(%kid, "no key located for token");
            invalid_token("no key located for token")
        })?;

        let alg = key.algorithm().ok_or_else(|| {
            tracing::debug!(%kid, "located key does not declare an algorithm");
            invalid_token("located key does not declare an algorithm")
        })?;

        let validator = jwt::CoreValidator::default()
            .add_approved_algorithm(alg)
            .require_issuer(jwt::Issuer::new(issuer.to_string()))
            .check_expiration()
            .check_not_before()
            .tolerate_missing_timestamps();

        match decomposed.verify::<jwt::BasicClaims, _>(key, &validator) {
            Ok(_) => Ok(true),
            Err(atesto::error::JwtVerifyError::KeyVerifyError(err)) => {
                tracing::debug!(error = %err, "token rejected by key");
                Ok(false)
            }
            Err(atesto::error::JwtVerifyError::ClaimsRejected(err)) => {
                tracing::debug!(error = %err, "token rejected by claims validator");
                Ok(false)
            }
            Err(err) => Err(invalid_token(err)),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteVerifyError> {
        let response = self.client.get(url).send().await.map_err(|err| {
            tracing::debug!(http.url = %url, error = %err, "fetch failed");
            invalid_token(err)
        })?;

        if let Err(err) = response.error_for_status_ref() {
            tracing::debug!(
                http.url = %url,
                http.status_code = response.status().as_u16(),
                "unexpected response status"
            );
            return Err(invalid_token(err));
        }

        response.json::<T>().await.map_err(|err| {
            tracing::debug!(http.url = %url, error = %err, "undecodable response body");
            invalid_token(err)
        })
    }
}
