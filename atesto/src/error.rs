//! Common errors

#![allow(missing_copy_implementations)]

use std::error::Error as StdError;

use thiserror::Error;

/// The key cannot be used with the requested algorithm
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("key incompatible with algorithm '{alg}'")]
pub struct IncompatibleAlgorithm {
    alg: crate::jwa::Algorithm,
}

#[inline]
pub(crate) fn incompatible_algorithm(
    alg: impl Into<crate::jwa::Algorithm>,
) -> IncompatibleAlgorithm {
    IncompatibleAlgorithm { alg: alg.into() }
}

/// The provided name could not be matched with supported algorithms
#[derive(Debug, Error)]
#[error("'{alg}' does not match supported algorithms")]
pub struct UnknownAlgorithm {
    alg: String,
}

#[inline]
pub(crate) fn unknown_algorithm(alg: String) -> UnknownAlgorithm {
    UnknownAlgorithm { alg }
}

/// The key has a specific usage that disallows this use
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("key cannot be used in this way")]
pub struct KeyUsageMismatch {
    _p: (),
}

pub(crate) const fn key_usage_mismatch() -> KeyUsageMismatch {
    KeyUsageMismatch { _p: () }
}

/// The token is malformed and cannot be parsed out into header, payload,
/// and signature sections
#[derive(Clone, Copy, Debug, Error)]
#[error("malformed token")]
pub struct MalformedToken {
    _p: (),
}

pub(crate) fn malformed_token() -> MalformedToken {
    MalformedToken { _p: () }
}

/// The token header section is malformed
#[derive(Debug, Error)]
#[error("malformed token header")]
pub struct MalformedTokenHeader {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_token_header(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedTokenHeader {
    MalformedTokenHeader {
        source: source.into(),
    }
}

/// The token payload section is malformed
#[derive(Debug, Error)]
#[error("malformed token payload")]
pub struct MalformedTokenPayload {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_token_payload(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedTokenPayload {
    MalformedTokenPayload {
        source: source.into(),
    }
}

/// The token signature section is malformed
#[derive(Debug, Error)]
#[error("malformed token signature")]
pub struct MalformedTokenSignature {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn malformed_token_signature(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> MalformedTokenSignature {
    MalformedTokenSignature {
        source: source.into(),
    }
}

/// The signature did not match
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("signature mismatch")]
pub struct SignatureMismatch {
    _p: (),
}

pub(crate) const fn signature_mismatch() -> SignatureMismatch {
    SignatureMismatch { _p: () }
}

/// The key was rejected
#[derive(Debug, Error)]
#[error("key rejected")]
pub struct KeyRejected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn key_rejected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> KeyRejected {
    KeyRejected {
        source: source.into(),
    }
}

/// Missing private key
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("cannot sign without a private key")]
pub struct MissingPrivateKey {
    _p: (),
}

pub(crate) const fn missing_private_key() -> MissingPrivateKey {
    MissingPrivateKey { _p: () }
}

/// Unexpected error (possibly a bug)
#[derive(Debug, Error)]
#[error("unexpected error")]
pub struct Unexpected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn unexpected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> Unexpected {
    Unexpected {
        source: source.into(),
    }
}

/// The serialized token is too long to be safely carried in a URL
/// query parameter
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("token of {length} characters is too long for URL transport")]
pub struct TokenTooLarge {
    length: usize,
}

pub(crate) const fn token_too_large(length: usize) -> TokenTooLarge {
    TokenTooLarge { length }
}

/// The requested validity window would make a token expire at or before
/// the moment it becomes valid
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("token would expire at or before its validity start")]
pub struct InvalidValidityWindow {
    _p: (),
}

pub(crate) const fn invalid_validity_window() -> InvalidValidityWindow {
    InvalidValidityWindow { _p: () }
}

/// The named field is not present in the token's extra data
#[derive(Debug, Error)]
#[error("extra field '{field}' does not exist")]
pub struct MissingExtraField {
    field: String,
}

pub(crate) fn missing_extra_field(field: impl Into<String>) -> MissingExtraField {
    MissingExtraField {
        field: field.into(),
    }
}

/// The profile named as the registry default does not exist
#[derive(Debug, Error)]
#[error("default profile '{name}' is not defined")]
pub struct UnknownDefaultProfile {
    name: String,
}

pub(crate) fn unknown_default_profile(name: impl Into<String>) -> UnknownDefaultProfile {
    UnknownDefaultProfile { name: name.into() }
}

/// An error occurring while creating a signature
#[derive(Debug, Error)]
pub enum SigningError {
    /// The key cannot be used for signing operations
    #[error(transparent)]
    MissingPrivateKey(#[from] MissingPrivateKey),

    /// Key cannot be used for signature creation
    #[error(transparent)]
    KeyUsageMismatch(#[from] KeyUsageMismatch),

    /// Key cannot be used with this algorithm
    #[error(transparent)]
    IncompatibleAlgorithm(#[from] IncompatibleAlgorithm),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

impl From<std::convert::Infallible> for SigningError {
    fn from(_: std::convert::Infallible) -> Self {
        unreachable!("infallible result")
    }
}

/// An error occurring while verifying a signature with a key
#[derive(Debug, Error)]
pub enum KeyVerifyError {
    /// Token cannot be used with this algorithm
    #[error(transparent)]
    IncompatibleAlgorithm(#[from] IncompatibleAlgorithm),

    /// Key cannot be used for signature verification
    #[error(transparent)]
    KeyUsageMismatch(#[from] KeyUsageMismatch),

    /// Signature is invalid
    #[error(transparent)]
    SignatureMismatch(#[from] SignatureMismatch),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

impl KeyVerifyError {
    /// Whether the error is due to an incompatible algorithm
    #[must_use]
    pub fn is_incompatible_alg(&self) -> bool {
        matches!(self, Self::IncompatibleAlgorithm(_))
    }

    /// Whether the error is due to a usage mismatch
    #[must_use]
    pub fn is_usage_mismatch(&self) -> bool {
        matches!(self, Self::KeyUsageMismatch(_))
    }

    /// Whether the error is due to a signature mismatch
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, Self::SignatureMismatch(_))
    }
}

/// An error occurring while verifying a token
#[derive(Debug, Error)]
pub enum JwtVerifyError {
    /// The token was rejected by the key
    #[error("token rejected by key")]
    KeyVerifyError(#[from] KeyVerifyError),

    /// The token is malformed, without a discernible header, payload,
    /// and signature
    #[error(transparent)]
    MalformedToken(#[from] MalformedToken),

    /// The token header is malformed
    #[error(transparent)]
    MalformedTokenHeader(#[from] MalformedTokenHeader),

    /// The token payload is malformed
    #[error(transparent)]
    MalformedTokenPayload(#[from] MalformedTokenPayload),

    /// The token signature is malformed
    #[error(transparent)]
    MalformedTokenSignature(#[from] MalformedTokenSignature),

    /// The token was rejected by the claims validator
    #[error("token rejected by claims validator")]
    ClaimsRejected(#[from] ClaimsRejected),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

/// An error occurring while signing a token
#[derive(Debug, Error)]
pub enum JwtSigningError {
    /// The signature could not be produced
    #[error(transparent)]
    SigningError(#[from] SigningError),

    /// The token header could not be serialized
    #[error(transparent)]
    MalformedTokenHeader(#[from] MalformedTokenHeader),

    /// The token payload could not be serialized
    #[error(transparent)]
    MalformedTokenPayload(#[from] MalformedTokenPayload),

    /// An unexpected error
    #[error(transparent)]
    Unexpected(#[from] Unexpected),
}

/// An error occurring while issuing a token from a profile
#[derive(Debug, Error)]
pub enum IssueError {
    /// The serialized token exceeds the URL-safe length ceiling
    #[error(transparent)]
    TokenTooLarge(#[from] TokenTooLarge),

    /// The expiration would not leave a usable validity window
    #[error(transparent)]
    InvalidValidityWindow(#[from] InvalidValidityWindow),

    /// The token could not be signed
    #[error(transparent)]
    Signing(#[from] JwtSigningError),
}

/// An error occurring while constructing a token profile
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The configured algorithm name is not supported
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// The configured key cannot be used with the configured algorithm
    #[error(transparent)]
    IncompatibleAlgorithm(#[from] IncompatibleAlgorithm),
}

/// An error occurring while building a profile registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry default names a profile that was not defined
    #[error(transparent)]
    UnknownDefaultProfile(#[from] UnknownDefaultProfile),

    /// A profile definition is invalid
    #[error("profile '{name}' is invalid")]
    InvalidProfile {
        /// The name of the offending profile
        name: String,
        /// The underlying profile construction failure
        #[source]
        source: ProfileError,
    },

    /// A profile's key material was rejected
    #[error("key material for profile '{name}' was rejected")]
    KeyRejected {
        /// The name of the offending profile
        name: String,
        /// The underlying key failure
        #[source]
        source: KeyRejected,
    },
}

/// An error occurring when validating the claims of a token
#[derive(Debug, Error)]
pub enum ClaimsRejected {
    /// The token algorithm is not acceptable
    #[error("invalid algorithm")]
    InvalidAlgorithm,

    /// The token audience is not acceptable
    #[error("invalid audience")]
    InvalidAudience,

    /// The token issuer is not acceptable
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The token id is not acceptable
    #[error("invalid token id")]
    InvalidTokenId,

    /// The token subject is not acceptable
    #[error("invalid subject")]
    InvalidSubject,

    /// The token is expired according to the `exp` claim
    #[error("token expired")]
    TokenExpired,

    /// The token is not yet valid according to the `nbf` claim
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// A required claim is missing
    #[error("required {_0} claim missing")]
    MissingRequiredClaim(&'static str),

    /// Custom validation error
    #[error(transparent)]
    Custom(Box<dyn StdError + Send + Sync>),
}
