//! Token profiles: the issuance and verification engine
//!
//! A [`TokenProfile`] bundles one issuance/verification configuration:
//! the signing algorithm, key material, issuer, audience, token id, and
//! expiration durations. A profile is constructed once, is immutable
//! thereafter, and may be shared freely across threads; its claim
//! constraints are resolved at construction time rather than per call.
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
//!
//! let parsed = profile.verify(&token).unwrap();
//! assert_eq!(parsed.subject_id().as_str(), "2");
//! assert_eq!(parsed.email(), "test@example.com");
//! assert!(!parsed.has_extra());
//! ```

use std::{convert::TryFrom, time::Duration};

use aliri_clock::{Clock, System, UnixTime};
use serde::{Deserialize, Serialize};

use crate::{
    error, jwa, jwk,
    jwt::{
        Audience, Audiences, BasicHeaders, CoreClaims, CoreValidator, Issuer, IssuerRef, Jwt,
        JwtRef, Subject, SubjectRef, TokenId, TokenIdRef, Validated,
    },
    Jwk,
};

/// The longest serialized token that is still safely embeddable in a URL
/// query parameter, the intended transport for short-lived tokens.
pub const MAX_TOKEN_LENGTH: usize = 2000;

/// The default validity duration for issued tokens (two days)
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(172_800);

/// The default validity duration for short-lived tokens (one hour)
pub const DEFAULT_SHORT_EXPIRATION: Duration = Duration::from_secs(3_600);

/// The default validity duration for long-lived tokens (thirty days)
pub const DEFAULT_LONG_EXPIRATION: Duration = Duration::from_secs(2_592_000);

/// The claims carried by tokens issued through a [`TokenProfile`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct TokenClaims {
    iss: Issuer,
    aud: Audiences,
    jti: TokenId,
    iat: UnixTime,
    nbf: UnixTime,
    exp: UnixTime,
    #[serde(rename = "userId")]
    user_id: Subject,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extra: Option<String>,
}

impl TokenClaims {
    /// The time at which the token was issued
    #[must_use]
    pub fn iat(&self) -> UnixTime {
        self.iat
    }

    /// The subject identifier carried in the `userId` claim
    pub fn user_id(&self) -> &SubjectRef {
        &self.user_id
    }

    /// The email address carried in the token
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The serialized extra data, if any
    #[must_use]
    pub fn extra(&self) -> Option<&str> {
        self.extra.as_deref()
    }
}

impl CoreClaims for TokenClaims {
    fn nbf(&self) -> Option<UnixTime> {
        Some(self.nbf)
    }

    fn exp(&self) -> Option<UnixTime> {
        Some(self.exp)
    }

    fn aud(&self) -> &Audiences {
        &self.aud
    }

    fn iss(&self) -> Option<&IssuerRef> {
        Some(&self.iss)
    }

    fn jti(&self) -> Option<&TokenIdRef> {
        Some(&self.jti)
    }

    fn sub(&self) -> Option<&SubjectRef> {
        None
    }
}

/// The mapping type used for a token's extra data
///
/// Extra data is carried as a JSON object serialized into the `extra`
/// claim. Decoding can only ever produce passive values (strings,
/// numbers, sequences, mappings), never instances carrying behavior.
pub type ExtraData = serde_json::Map<String, serde_json::Value>;

/// The claims extracted from a successfully verified token
///
/// Produced only by [`TokenProfile::verify`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct ClaimResult {
    subject_id: Subject,
    email: String,
    extra: Option<ExtraData>,
}

impl ClaimResult {
    /// The verified subject identifier
    pub fn subject_id(&self) -> &SubjectRef {
        &self.subject_id
    }

    /// The verified email address
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the token carried any extra data
    #[must_use]
    pub fn has_extra(&self) -> bool {
        self.extra.is_some()
    }

    /// The extra data carried by the token, if any
    #[must_use]
    pub fn extra(&self) -> Option<&ExtraData> {
        self.extra.as_ref()
    }

    /// The value of a single field of the extra data
    ///
    /// # Errors
    ///
    /// Returns an error if the named field is absent. This distinguishes
    /// a caller asking for a field that was never issued from a token
    /// that legitimately carries no extra data at all, which is queried
    /// through [`has_extra()`][Self::has_extra].
    pub fn extra_field(&self, field: &str) -> Result<&serde_json::Value, error::MissingExtraField> {
        self.extra
            .as_ref()
            .and_then(|extra| extra.get(field))
            .ok_or_else(|| error::missing_extra_field(field))
    }
}

/// A named, immutable bundle of issuance and verification configuration
#[derive(Clone, Debug)]
#[must_use]
pub struct TokenProfile {
    algorithm: jwa::Algorithm,
    key: Jwk,
    issuer: Issuer,
    audience: Audience,
    token_id: TokenId,
    default_expiration: Duration,
    short_expiration: Duration,
    long_expiration: Duration,
    validator: CoreValidator,
}

impl TokenProfile {
    /// Constructs a new profile for the given algorithm and key
    ///
    /// The audience defaults to the issuer and the default expiration to
    /// [`DEFAULT_EXPIRATION`]; use the `with_*` builders to override.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be used with the requested
    /// algorithm.
    pub fn new(
        algorithm: jwa::Algorithm,
        key: Jwk,
        token_id: TokenId,
        issuer: Issuer,
    ) -> Result<Self, error::ProfileError> {
        if !key.is_compatible(algorithm) {
            return Err(error::incompatible_algorithm(algorithm).into());
        }

        if let Some(key_alg) = key.algorithm() {
            if key_alg != algorithm {
                return Err(error::incompatible_algorithm(algorithm).into());
            }
        }

        let audience = Audience::new(issuer.as_str().to_owned());

        let mut profile = Self {
            algorithm,
            key,
            issuer,
            audience,
            token_id,
            default_expiration: DEFAULT_EXPIRATION,
            short_expiration: DEFAULT_SHORT_EXPIRATION,
            long_expiration: DEFAULT_LONG_EXPIRATION,
            validator: CoreValidator::default(),
        };
        profile.rebuild_validator();

        Ok(profile)
    }

    /// Constructs a new profile, resolving the algorithm by its wire name
    ///
    /// # Errors
    ///
    /// Returns an error if the name does not match a supported algorithm
    /// or if the key cannot be used with it. Configuration errors are
    /// reported here, at construction, never per request.
    pub fn from_algorithm_name(
        algorithm: &str,
        key: Jwk,
        token_id: TokenId,
        issuer: Issuer,
    ) -> Result<Self, error::ProfileError> {
        let algorithm = jwa::Algorithm::try_from(algorithm)?;
        Self::new(algorithm, key, token_id, issuer)
    }

    /// Sets the expected audience
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self.rebuild_validator();
        self
    }

    /// Sets the default expiration applied when issuance does not
    /// specify one
    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Sets the duration used by [`issue_short`][Self::issue_short]
    pub fn with_short_expiration(mut self, expiration: Duration) -> Self {
        self.short_expiration = expiration;
        self
    }

    /// Sets the duration used by [`issue_long`][Self::issue_long]
    pub fn with_long_expiration(mut self, expiration: Duration) -> Self {
        self.long_expiration = expiration;
        self
    }

    fn rebuild_validator(&mut self) {
        self.validator = CoreValidator::default()
            .add_approved_algorithm(self.algorithm)
            .require_issuer(self.issuer.clone())
            .add_allowed_audience(self.audience.clone())
            .require_token_id(self.token_id.clone())
            .check_expiration()
            .check_not_before();
    }

    /// The algorithm used by this profile
    #[must_use]
    pub fn algorithm(&self) -> jwa::Algorithm {
        self.algorithm
    }

    /// The issuer stamped into and expected from tokens
    pub fn issuer(&self) -> &IssuerRef {
        &self.issuer
    }

    /// The audience stamped into and expected from tokens
    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    /// The token id stamped into and expected from tokens
    pub fn token_id(&self) -> &TokenIdRef {
        &self.token_id
    }

    /// Begins building a token issuance with non-default parameters
    pub fn issuance(&self) -> Issuance<'_> {
        Issuance {
            profile: self,
            extra: None,
            expiration: None,
            key_id: None,
        }
    }

    /// Issues a token for the given subject with this profile's defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be signed or if the
    /// serialized token exceeds [`MAX_TOKEN_LENGTH`].
    pub fn issue(
        &self,
        subject_id: impl Into<Subject>,
        email: impl Into<String>,
    ) -> Result<Jwt, error::IssueError> {
        self.issuance().issue(subject_id, email)
    }

    /// Issues a token with this profile's short-lived duration
    ///
    /// # Errors
    ///
    /// See [`issue`][Self::issue].
    pub fn issue_short(
        &self,
        subject_id: impl Into<Subject>,
        email: impl Into<String>,
    ) -> Result<Jwt, error::IssueError> {
        self.issuance()
            .with_expiration(self.short_expiration)
            .issue(subject_id, email)
    }

    /// Issues a token with this profile's long-lived duration
    ///
    /// # Errors
    ///
    /// See [`issue`][Self::issue].
    pub fn issue_long(
        &self,
        subject_id: impl Into<Subject>,
        email: impl Into<String>,
    ) -> Result<Jwt, error::IssueError> {
        self.issuance()
            .with_expiration(self.long_expiration)
            .issue(subject_id, email)
    }

    /// Verifies a token issued through this profile
    ///
    /// The token must parse, its signature must verify under this
    /// profile's key and algorithm, and its claims must satisfy the
    /// profile's constraints: issuer and token id equality, audience
    /// containment, and the current time lying within `[nbf, exp)`.
    ///
    /// # Errors
    ///
    /// Any violated expectation rejects the token with a
    /// [`JwtVerifyError`][error::JwtVerifyError]; rejection from any
    /// stage is final and equally reported.
    pub fn verify(&self, token: &JwtRef) -> Result<ClaimResult, error::JwtVerifyError> {
        let validated: Validated<TokenClaims> = token.verify(&self.key, &self.validator)?;

        let (_, claims) = validated.extract();

        let extra = claims
            .extra
            .as_deref()
            .map(serde_json::from_str::<ExtraData>)
            .transpose()
            .map_err(error::malformed_token_payload)?;

        Ok(ClaimResult {
            subject_id: claims.user_id,
            email: claims.email,
            extra,
        })
    }

    /// Whether the token passes [`verify`][Self::verify]
    #[must_use]
    pub fn is_valid(&self, token: &JwtRef) -> bool {
        self.verify(token).is_ok()
    }
}

/// An in-progress token issuance
///
/// Produced by [`TokenProfile::issuance`] to carry the optional
/// parameters of an issuance: extra data, an expiration override, and a
/// key id to stamp into the header.
#[derive(Clone, Debug)]
#[must_use]
pub struct Issuance<'a> {
    profile: &'a TokenProfile,
    extra: Option<ExtraData>,
    expiration: Option<Duration>,
    key_id: Option<jwk::KeyId>,
}

impl<'a> Issuance<'a> {
    /// Attaches extra data, to be serialized into the `extra` claim
    pub fn with_extra(mut self, extra: ExtraData) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Overrides the profile's default expiration
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Stamps a key id into the token header
    pub fn with_key_id(mut self, key_id: impl Into<jwk::KeyId>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Issues the token using the system clock
    ///
    /// # Errors
    ///
    /// Returns an error if the validity window is empty, the token
    /// cannot be signed, or the serialized token exceeds
    /// [`MAX_TOKEN_LENGTH`].
    pub fn issue(
        self,
        subject_id: impl Into<Subject>,
        email: impl Into<String>,
    ) -> Result<Jwt, error::IssueError> {
        self.issue_with_clock(subject_id, email, &System)
    }

    /// Issues the token using the specified clock
    ///
    /// # Errors
    ///
    /// See [`issue`][Self::issue].
    pub fn issue_with_clock<C: Clock>(
        self,
        subject_id: impl Into<Subject>,
        email: impl Into<String>,
        clock: &C,
    ) -> Result<Jwt, error::IssueError> {
        let profile = self.profile;

        let expiration = self.expiration.unwrap_or(profile.default_expiration);
        if expiration.as_secs() == 0 {
            return Err(error::invalid_validity_window().into());
        }

        let extra = self
            .extra
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| error::JwtSigningError::from(error::malformed_token_payload(e)))?;

        let now = clock.now();

        let claims = TokenClaims {
            iss: profile.issuer.clone(),
            aud: Audiences::single(profile.audience.clone()),
            jti: profile.token_id.clone(),
            iat: now,
            nbf: now,
            exp: UnixTime(now.0 + expiration.as_secs()),
            user_id: subject_id.into(),
            email: email.into(),
            extra,
        };

        let headers = match self.key_id {
            Some(kid) => BasicHeaders::with_key_id(profile.algorithm, kid),
            None => BasicHeaders::new(profile.algorithm),
        };

        let token = Jwt::try_from_parts_with_signature(&headers, &claims, &profile.key)?;

        if token.as_str().len() > MAX_TOKEN_LENGTH {
            return Err(error::token_too_large(token.as_str().len()).into());
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use aliri_base64::{Base64Url, Base64UrlRef};
    use aliri_clock::TestClock;
    use color_eyre::Result;
    use serde_json::{json, Value};

    use super::*;
    use crate::jwt::{CoreHeaders, Decomposed, HasAlgorithm};

    #[cfg(feature = "hmac")]
    fn hmac_profile() -> TokenProfile {
        // the key requires min 256 bits (8 bits per char)
        let secret = Base64UrlRef::from_slice(b"keykeykeykeykeykeykeykeykeykeyke").to_owned();
        let key = Jwk::from(jwa::Hmac::new(secret));

        TokenProfile::new(
            jwa::Algorithm::HS256,
            key,
            TokenId::from_static("id"),
            Issuer::from_static("issuer"),
        )
        .expect("HS256 profile should build")
    }

    #[cfg(feature = "hmac")]
    fn decode_claims(token: &JwtRef) -> TokenClaims {
        let decomposed: Decomposed = token.decompose().expect("token should decompose");
        let raw = Base64Url::from_encoded(decomposed.untrusted_payload())
            .expect("payload should decode");
        serde_json::from_slice(raw.as_slice()).expect("claims should deserialize")
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn token_expiration_time() -> Result<()> {
        let profile = hmac_profile().with_default_expiration(Duration::from_secs(3600));
        let time = System.now();

        let token = profile.issue("2", "test@example.com")?;

        let decomposed: Decomposed = token.decompose()?;
        assert_eq!(
            decomposed.untrusted_header().alg(),
            jwa::Algorithm::HS256
        );
        assert_eq!(decomposed.untrusted_header().typ(), Some("JWT"));

        let claims = decode_claims(&token);
        assert_eq!(claims.iss().unwrap().as_str(), "issuer");
        assert!(claims.aud().iter().any(|a| a.as_str() == "issuer"));
        assert!(claims.exp().unwrap().0 >= time.0 + 3600);
        assert!(claims.nbf().unwrap().0 >= time.0);

        let parsed = profile.verify(&token)?;
        assert_eq!(parsed.subject_id().as_str(), "2");
        assert_eq!(parsed.email(), "test@example.com");
        assert!(!parsed.has_extra());
        assert!(parsed.extra().is_none());

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn token_override_expiration_time() -> Result<()> {
        let profile = hmac_profile().with_default_expiration(Duration::from_secs(3600));
        let time = System.now();

        let token = profile
            .issuance()
            .with_expiration(Duration::from_secs(7200))
            .issue("2", "test@example.com")?;

        let claims = decode_claims(&token);
        assert!(claims.exp().unwrap().0 >= time.0 + 7200);

        let parsed = profile.verify(&token)?;
        assert_eq!(parsed.subject_id().as_str(), "2");

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn token_extra_data() -> Result<()> {
        let profile = hmac_profile();

        let mut extra = ExtraData::new();
        extra.insert("something".into(), json!("another"));
        extra.insert("whatever".into(), json!(4));

        let token = profile
            .issuance()
            .with_extra(extra.clone())
            .issue("2", "test@example.com")?;

        let parsed = profile.verify(&token)?;
        assert_eq!(parsed.subject_id().as_str(), "2");
        assert_eq!(parsed.email(), "test@example.com");
        assert!(parsed.has_extra());
        assert_eq!(parsed.extra(), Some(&extra));
        assert_eq!(parsed.extra_field("something")?, &json!("another"));
        assert_eq!(parsed.extra_field("whatever")?, &json!(4));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn missing_extra_field_is_an_error() -> Result<()> {
        let profile = hmac_profile();

        let mut extra = ExtraData::new();
        extra.insert("something".into(), json!("nothing"));

        let token = profile
            .issuance()
            .with_extra(extra)
            .issue("1", "user@example.net")?;

        let parsed = profile.verify(&token)?;
        assert_eq!(parsed.extra_field("something")?, &json!("nothing"));
        assert!(parsed.extra_field("another").is_err());

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn token_with_no_audience_defaults_to_issuer() -> Result<()> {
        let profile = hmac_profile();
        let time = System.now();

        let token = profile.issue("2", "test@example.com")?;

        let claims = decode_claims(&token);
        assert_eq!(claims.iss().unwrap().as_str(), "issuer");
        assert!(claims.aud().iter().any(|a| a.as_str() == "issuer"));
        assert!(claims.exp().unwrap().0 >= time.0 + DEFAULT_EXPIRATION.as_secs());

        assert!(profile.is_valid(&token));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn token_with_explicit_audience() -> Result<()> {
        let profile = hmac_profile().with_audience(Audience::from_static("audience"));

        let token = profile.issue("2", "test@example.com")?;

        let claims = decode_claims(&token);
        assert!(claims.aud().iter().any(|a| a.as_str() == "audience"));
        assert!(claims.aud().iter().all(|a| a.as_str() != "issuer"));

        assert!(profile.is_valid(&token));

        // A profile expecting the issuer as audience must not accept it.
        let issuer_only = hmac_profile();
        assert!(!issuer_only.is_valid(&token));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn serialized_objects_decode_to_passive_values() -> Result<()> {
        #[derive(Serialize)]
        struct Opaque {
            prop: &'static str,
        }

        let profile = hmac_profile();

        let mut extra = ExtraData::new();
        extra.insert("hash".into(), json!("blah blah blah"));
        extra.insert(
            "stdClass".into(),
            serde_json::to_value(Opaque { prop: "something" })?,
        );

        let token = profile
            .issuance()
            .with_extra(extra)
            .issue("2", "test@example.com")?;

        let parsed = profile.verify(&token)?;
        let value = parsed.extra_field("stdClass")?;
        assert!(matches!(value, Value::Object(_)));
        assert_eq!(value["prop"], json!("something"));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn invalid_tokens_are_rejected() {
        let profile = hmac_profile();

        for token in &["something.totally.invalid", "no dots"] {
            let token = JwtRef::from_str(token);
            assert!(profile.verify(token).is_err());
            assert!(!profile.is_valid(token));
        }
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn tampered_token_is_rejected() -> Result<()> {
        let profile = hmac_profile();

        let token = profile.issue("2", "test@example.com")?;

        // Flip the leading character of the signature segment.
        let dot = token.as_str().rfind('.').expect("token has a signature");
        let mut tampered = token.as_str()[..=dot].to_owned();
        let signature = &token.as_str()[dot + 1..];
        tampered.push(if signature.starts_with('A') { 'B' } else { 'A' });
        tampered.push_str(&signature[1..]);

        assert!(!profile.is_valid(JwtRef::from_str(&tampered)));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn oversized_token_fails_issuance() {
        let profile = hmac_profile();

        let mut extra = ExtraData::new();
        extra.insert("payload".into(), json!("x".repeat(3000)));

        let err = profile
            .issuance()
            .with_extra(extra)
            .issue("2", "test@example.com")
            .unwrap_err();

        assert!(matches!(err, error::IssueError::TokenTooLarge(_)));
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn zero_expiration_fails_issuance() {
        let profile = hmac_profile();

        let err = profile
            .issuance()
            .with_expiration(Duration::ZERO)
            .issue("2", "test@example.com")
            .unwrap_err();

        assert!(matches!(err, error::IssueError::InvalidValidityWindow(_)));
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn expired_token_fails_verification() -> Result<()> {
        let profile = hmac_profile().with_default_expiration(Duration::from_secs(3600));

        // Issued far enough in the past that the token has expired by now.
        let past = TestClock::new(UnixTime(1_000));
        let token = profile
            .issuance()
            .issue_with_clock("2", "test@example.com", &past)?;

        assert!(profile.verify(&token).is_err());
        assert!(!profile.is_valid(&token));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn stamps_key_id_when_requested() -> Result<()> {
        let profile = hmac_profile();

        let token = profile
            .issuance()
            .with_key_id("D44C4DD0CFD0A76F5748AD8F541B07A536895CCD")
            .issue("1", "user@example.net")?;

        let decomposed: Decomposed = token.decompose()?;
        assert_eq!(
            decomposed.kid().map(|k| k.as_str()),
            Some("D44C4DD0CFD0A76F5748AD8F541B07A536895CCD")
        );

        assert!(profile.is_valid(&token));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn short_and_long_expirations() -> Result<()> {
        let profile = hmac_profile();
        let time = System.now();

        let short = profile.issue_short("2", "test@example.com")?;
        let long = profile.issue_long("2", "test@example.com")?;

        let short_exp = decode_claims(&short).exp().unwrap();
        let long_exp = decode_claims(&long).exp().unwrap();

        assert!(short_exp.0 >= time.0 + DEFAULT_SHORT_EXPIRATION.as_secs());
        assert!(long_exp.0 >= time.0 + DEFAULT_LONG_EXPIRATION.as_secs());
        assert!(short_exp < long_exp);

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn wrong_token_id_is_rejected() -> Result<()> {
        let profile = hmac_profile();

        let secret = Base64UrlRef::from_slice(b"keykeykeykeykeykeykeykeykeykeyke").to_owned();
        let other = TokenProfile::new(
            jwa::Algorithm::HS256,
            Jwk::from(jwa::Hmac::new(secret)),
            TokenId::from_static("other-id"),
            Issuer::from_static("issuer"),
        )
        .expect("profile should build");

        let token = other.issue("2", "test@example.com")?;
        assert!(!profile.is_valid(&token));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn profile_construction_rejects_unknown_algorithm() {
        let secret = Base64UrlRef::from_slice(b"test").to_owned();
        let key = Jwk::from(jwa::Hmac::new(secret));

        let err = TokenProfile::from_algorithm_name(
            "XX512",
            key,
            TokenId::from_static("id"),
            Issuer::from_static("issuer"),
        )
        .unwrap_err();

        assert!(matches!(err, error::ProfileError::UnknownAlgorithm(_)));
    }

    #[test]
    #[cfg(all(feature = "hmac", feature = "rsa"))]
    fn profile_construction_rejects_incompatible_key() {
        let secret = Base64UrlRef::from_slice(b"test").to_owned();
        let key = Jwk::from(jwa::Hmac::new(secret));

        let err = TokenProfile::new(
            jwa::Algorithm::RS256,
            key,
            TokenId::from_static("id"),
            Issuer::from_static("issuer"),
        )
        .unwrap_err();

        assert!(matches!(err, error::ProfileError::IncompatibleAlgorithm(_)));
    }

    #[test]
    #[cfg(all(feature = "rsa", feature = "private-keys"))]
    fn rsa_profile_round_trip() -> Result<()> {
        let key = Jwk::from(jwa::Rsa::generate().unwrap());

        let profile = TokenProfile::new(
            jwa::Algorithm::RS256,
            key,
            TokenId::from_static("id"),
            Issuer::from_static("https://issuer.example.com"),
        )
        .expect("profile should build");

        let token = profile.issue("42", "someone@example.com")?;
        let parsed = profile.verify(&token)?;

        assert_eq!(parsed.subject_id().as_str(), "42");
        assert_eq!(parsed.email(), "someone@example.com");

        Ok(())
    }
}
