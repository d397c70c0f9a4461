//! Keys and key material
//!
//! Keys follow the JSON Web Key interchange encoding described in
//! [RFC7517][], so that keys published by a remote party can be
//! converted directly into usable verification material.
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517

use std::convert::TryFrom;

use aliri_braid::braid;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    error, jwa,
    jws::{self, Signer, Verifier},
};

/// An identifier for a key
#[braid(serde, ref_doc = "A borrowed reference to a key identifier ([`KeyId`])")]
pub struct KeyId;

/// An identified key
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "JwkDto")]
#[must_use]
pub struct Jwk {
    key_id: Option<KeyId>,
    usage: Option<jwa::Usage>,
    algorithm: Option<jwa::Algorithm>,
    key: Key,
}

impl Jwk {
    /// The key ID
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.key_id.as_deref()
    }

    /// The intended usage of the key
    #[must_use]
    pub fn usage(&self) -> Option<jwa::Usage> {
        self.usage
    }

    /// The algorithm to be used with this key
    #[must_use]
    pub fn algorithm(&self) -> Option<jwa::Algorithm> {
        self.algorithm
    }

    /// Whether the key is compatible with the given algorithm
    #[must_use]
    pub fn is_compatible(&self, alg: jwa::Algorithm) -> bool {
        self.key.is_compatible(alg)
    }

    /// Sets the key ID
    pub fn with_key_id(self, kid: KeyId) -> Self {
        Self {
            key_id: Some(kid),
            ..self
        }
    }

    /// Sets the key's usage
    pub fn with_usage(self, usage: jwa::Usage) -> Self {
        Self {
            usage: Some(usage),
            ..self
        }
    }

    /// Sets the algorithm and usage consistent with that algorithm
    pub fn with_algorithm(self, alg: impl Into<jwa::Algorithm>) -> Self {
        let alg = alg.into();
        Self {
            algorithm: Some(alg),
            usage: Some(alg.to_usage()),
            ..self
        }
    }

    /// Strips any private key components
    pub fn public_only(self) -> Self {
        Self {
            key: self.key.public_only(),
            ..self
        }
    }
}

#[cfg(feature = "hmac")]
#[cfg_attr(docsrs, doc(cfg(feature = "hmac")))]
impl From<jwa::Hmac> for Jwk {
    fn from(key: jwa::Hmac) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl From<jwa::Rsa> for Jwk {
    fn from(key: jwa::Rsa) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl From<jwa::rsa::PublicKey> for Jwk {
    fn from(key: jwa::rsa::PublicKey) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

#[cfg(all(feature = "rsa", feature = "private-keys"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "rsa", feature = "private-keys"))))]
impl From<jwa::rsa::PrivateKey> for Jwk {
    fn from(key: jwa::rsa::PrivateKey) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl From<jwa::EllipticCurve> for Jwk {
    fn from(key: jwa::EllipticCurve) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl From<jwa::ec::PublicKey> for Jwk {
    fn from(key: jwa::ec::PublicKey) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

#[cfg(all(feature = "ec", feature = "private-keys"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "ec", feature = "private-keys"))))]
impl From<jwa::ec::PrivateKey> for Jwk {
    fn from(key: jwa::ec::PrivateKey) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key: Key::from(key),
        }
    }
}

impl Verifier for Jwk {
    type Algorithm = jwa::Algorithm;
    type Error = error::KeyVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        if let Ok(alg) = jws::Algorithm::try_from(alg) {
            self.key.can_verify(alg)
        } else {
            false
        }
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        if alg.to_usage() != jwa::Usage::Signing {
            return Err(error::key_usage_mismatch().into());
        }

        if let Some(u) = self.usage {
            if u != jwa::Usage::Signing {
                return Err(error::key_usage_mismatch().into());
            }
        }

        match self.algorithm {
            Some(key_alg) if key_alg == alg => {}
            Some(_) => {
                return Err(error::incompatible_algorithm(alg).into());
            }
            None => {}
        }

        let alg = jws::Algorithm::try_from(alg)?;
        self.key.verify(alg, data, signature)?;

        Ok(())
    }
}

impl Signer for Jwk {
    type Algorithm = jwa::Algorithm;
    type Error = error::SigningError;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        if let Ok(alg) = jws::Algorithm::try_from(alg) {
            self.key.can_sign(alg)
        } else {
            false
        }
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
        if alg.to_usage() != jwa::Usage::Signing {
            return Err(error::key_usage_mismatch().into());
        }

        if let Some(u) = self.usage {
            if u != jwa::Usage::Signing {
                return Err(error::key_usage_mismatch().into());
            }
        }

        match self.algorithm {
            Some(key_alg) if key_alg == alg => {}
            Some(_) => {
                return Err(error::incompatible_algorithm(alg).into());
            }
            None => {}
        }

        let alg = jws::Algorithm::try_from(alg)?;

        self.key.sign(alg, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JwkDto {
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    key_id: Option<KeyId>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    usage: Option<jwa::Usage>,

    #[serde(rename = "alg", default, skip_serializing_if = "Option::is_none")]
    algorithm: Option<jwa::Algorithm>,

    #[serde(flatten)]
    key: Key,
}

impl TryFrom<JwkDto> for Jwk {
    type Error = error::IncompatibleAlgorithm;

    fn try_from(dto: JwkDto) -> Result<Self, Self::Error> {
        if let Some(alg) = &dto.algorithm {
            if !dto.key.is_compatible(*alg) {
                return Err(error::incompatible_algorithm(*alg));
            }
        }

        Ok(Self {
            key_id: dto.key_id,
            usage: dto.usage,
            algorithm: dto.algorithm,
            key: dto.key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct JwkDtoRef<'a> {
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    key_id: Option<&'a KeyIdRef>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    usage: Option<jwa::Usage>,

    #[serde(rename = "alg", skip_serializing_if = "Option::is_none")]
    algorithm: Option<jwa::Algorithm>,

    #[serde(flatten)]
    key: &'a Key,
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dto = JwkDtoRef {
            key_id: self.key_id(),
            usage: self.usage(),
            algorithm: self.algorithm(),
            key: &self.key,
        };

        dto.serialize(serializer)
    }
}

/// The underlying key material
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kty")]
enum Key {
    /// RSA
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    #[serde(rename = "RSA")]
    Rsa(jwa::rsa::Rsa),

    /// Elliptic curve cryptography
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    #[serde(rename = "EC")]
    EllipticCurve(jwa::ec::EllipticCurve),

    /// HMAC symmetric
    #[cfg(feature = "hmac")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hmac")))]
    #[serde(rename = "oct")]
    Hmac(jwa::Hmac),
}

impl Key {
    fn is_compatible(&self, alg: jwa::Algorithm) -> bool {
        match alg {
            jwa::Algorithm::Signing(alg) => self.can_verify(alg),
        }
    }

    fn public_only(self) -> Self {
        match self {
            #[cfg(feature = "rsa")]
            Self::Rsa(k) => Self::Rsa(k.public_only()),

            #[cfg(feature = "ec")]
            Self::EllipticCurve(k) => Self::EllipticCurve(k.public_only()),

            #[cfg(feature = "hmac")]
            Self::Hmac(_) => self,
        }
    }
}

#[cfg(feature = "hmac")]
impl From<jwa::Hmac> for Key {
    fn from(key: jwa::Hmac) -> Self {
        Self::Hmac(key)
    }
}

#[cfg(feature = "rsa")]
impl From<jwa::Rsa> for Key {
    fn from(key: jwa::Rsa) -> Self {
        Self::Rsa(key)
    }
}

#[cfg(feature = "rsa")]
impl From<jwa::rsa::PublicKey> for Key {
    fn from(key: jwa::rsa::PublicKey) -> Self {
        Self::Rsa(key.into())
    }
}

#[cfg(all(feature = "rsa", feature = "private-keys"))]
impl From<jwa::rsa::PrivateKey> for Key {
    fn from(key: jwa::rsa::PrivateKey) -> Self {
        Self::Rsa(key.into())
    }
}

#[cfg(feature = "ec")]
impl From<jwa::EllipticCurve> for Key {
    fn from(key: jwa::EllipticCurve) -> Self {
        Self::EllipticCurve(key)
    }
}

#[cfg(feature = "ec")]
impl From<jwa::ec::PublicKey> for Key {
    fn from(key: jwa::ec::PublicKey) -> Self {
        Self::EllipticCurve(key.into())
    }
}

#[cfg(all(feature = "ec", feature = "private-keys"))]
impl From<jwa::ec::PrivateKey> for Key {
    fn from(key: jwa::ec::PrivateKey) -> Self {
        Self::EllipticCurve(key.into())
    }
}

impl Verifier for Key {
    type Algorithm = jws::Algorithm;
    type Error = error::KeyVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        match (self, alg) {
            #[cfg(feature = "rsa")]
            (Self::Rsa(key), jws::Algorithm::Rsa(alg)) => key.can_verify(alg),

            #[cfg(feature = "ec")]
            (Self::EllipticCurve(key), jws::Algorithm::EllipticCurve(alg)) => key.can_verify(alg),

            #[cfg(feature = "hmac")]
            (Self::Hmac(key), jws::Algorithm::Hmac(alg)) => key.can_verify(alg),

            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        match (self, alg) {
            #[cfg(feature = "rsa")]
            (Self::Rsa(key), jws::Algorithm::Rsa(alg)) => Ok(key.verify(alg, data, signature)?),

            #[cfg(feature = "ec")]
            (Self::EllipticCurve(key), jws::Algorithm::EllipticCurve(alg)) => {
                Ok(key.verify(alg, data, signature)?)
            }

            #[cfg(feature = "hmac")]
            (Self::Hmac(key), jws::Algorithm::Hmac(alg)) => Ok(key.verify(alg, data, signature)?),

            #[allow(unreachable_patterns)]
            _ => Err(error::incompatible_algorithm(alg).into()),
        }
    }
}

impl Signer for Key {
    type Algorithm = jws::Algorithm;
    type Error = error::SigningError;

    fn can_sign(&self, alg: Self::Algorithm) -> bool {
        match (self, alg) {
            #[cfg(feature = "rsa")]
            (Self::Rsa(key), jws::Algorithm::Rsa(alg)) => key.can_sign(alg),

            #[cfg(feature = "ec")]
            (Self::EllipticCurve(key), jws::Algorithm::EllipticCurve(alg)) => key.can_sign(alg),

            #[cfg(feature = "hmac")]
            (Self::Hmac(key), jws::Algorithm::Hmac(alg)) => key.can_sign(alg),

            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    fn sign(&self, alg: Self::Algorithm, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
        match (self, alg) {
            #[cfg(feature = "rsa")]
            (Self::Rsa(key), jws::Algorithm::Rsa(alg)) => key.sign(alg, data),

            #[cfg(feature = "ec")]
            (Self::EllipticCurve(key), jws::Algorithm::EllipticCurve(alg)) => key.sign(alg, data),

            #[cfg(feature = "hmac")]
            (Self::Hmac(key), jws::Algorithm::Hmac(alg)) => Ok(key.sign(alg, data)?),

            #[allow(unreachable_patterns)]
            _ => Err(error::incompatible_algorithm(alg).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "hmac")]
    #[test]
    fn deserializes_symmetric_jwk() {
        const JWK: &str = r#"{
            "kty": "oct",
            "kid": "hmac-key",
            "use": "sig",
            "alg": "HS256",
            "k": "dGVzdA"
        }"#;

        let jwk: Jwk = serde_json::from_str(JWK).unwrap();
        assert_eq!(jwk.key_id().map(|k| k.as_str()), Some("hmac-key"));
        assert_eq!(jwk.usage(), Some(jwa::Usage::Signing));
        assert_eq!(jwk.algorithm(), Some(jwa::Algorithm::HS256));
    }

    #[cfg(feature = "hmac")]
    #[test]
    fn rejects_jwk_with_mismatched_key_and_algorithm() {
        const JWK: &str = r#"{
            "kty": "oct",
            "alg": "RS256",
            "k": "dGVzdA"
        }"#;

        let result: Result<Jwk, _> = serde_json::from_str(JWK);
        assert!(result.is_err());
    }
}
