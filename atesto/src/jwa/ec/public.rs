use std::convert::TryFrom;

use aliri_base64::{Base64Url, Base64UrlRef};
use openssl::{
    bn::{BigNum, BigNumContext},
    ec::{EcKey, EcKeyRef},
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    pkey::{HasPublic, Public},
};
use serde::{Deserialize, Serialize};

use super::{Curve, SigningAlgorithm};
use crate::{error, jws};

/// ECC public key parameters
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyDto", into = "PublicKeyDto")]
pub struct PublicKey {
    curve: Curve,
    x: Base64Url,
    y: Base64Url,
}

impl PublicKey {
    /// The curve this key is defined on
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The x-coordinate of the public point
    pub fn x(&self) -> &Base64UrlRef {
        &self.x
    }

    /// The y-coordinate of the public point
    pub fn y(&self) -> &Base64UrlRef {
        &self.y
    }

    /// Constructs a public key from a curve and affine coordinates
    ///
    /// # Errors
    ///
    /// The coordinates do not name a point on the curve.
    pub fn from_public_components(
        curve: Curve,
        x: impl Into<Base64Url>,
        y: impl Into<Base64Url>,
    ) -> Result<Self, error::KeyRejected> {
        let key = Self {
            curve,
            x: x.into(),
            y: y.into(),
        };

        // Proves the point lies on the named curve.
        key.to_openssl_key().map_err(error::key_rejected)?;

        Ok(key)
    }

    /// Imports an ECC public key from a PEM file
    ///
    /// # Errors
    ///
    /// The provided PEM file is not a valid ECC public key on a
    /// supported curve.
    pub fn from_pem(pem: &str) -> Result<Self, error::KeyRejected> {
        let key = EcKey::public_key_from_pem(pem.as_bytes()).map_err(error::key_rejected)?;
        Self::from_openssl_eckey(&*key)
            .ok_or_else(|| error::key_rejected("unsupported elliptic curve"))
    }

    /// Exports the ECC public key as a PEM file
    ///
    /// # Errors
    ///
    /// The stored coordinates can no longer be reassembled into a key.
    pub fn to_pem(&self) -> Result<String, error::Unexpected> {
        let key = self.to_openssl_key().map_err(error::unexpected)?;
        let pem = key.public_key_to_pem().map_err(error::unexpected)?;
        String::from_utf8(pem).map_err(error::unexpected)
    }

    pub(super) fn from_openssl_eckey<T: HasPublic>(key: &EcKeyRef<T>) -> Option<Self> {
        let curve = Curve::from_group(key.group())?;

        let mut ctx = BigNumContext::new().ok()?;
        let mut x = BigNum::new().ok()?;
        let mut y = BigNum::new().ok()?;

        key.public_key()
            .affine_coordinates_gfp(key.group(), &mut x, &mut y, &mut ctx)
            .ok()?;

        let size = curve.coordinate_size() as i32;

        Some(Self {
            curve,
            x: Base64Url::from_raw(x.to_vec_padded(size).ok()?),
            y: Base64Url::from_raw(y.to_vec_padded(size).ok()?),
        })
    }

    fn to_openssl_key(&self) -> Result<EcKey<Public>, openssl::error::ErrorStack> {
        let group = self.curve.to_group();
        let x = BigNum::from_slice(self.x.as_slice())?;
        let y = BigNum::from_slice(self.y.as_slice())?;

        let key = EcKey::from_public_key_affine_coordinates(group, &x, &y)?;
        key.check_key()?;
        Ok(key)
    }

    /// The uncompressed SEC1 encoding of the public point
    fn uncompressed_point(&self) -> Vec<u8> {
        let mut point = Vec::with_capacity(1 + self.x.as_slice().len() + self.y.as_slice().len());
        point.push(0x04);
        point.extend_from_slice(self.x.as_slice());
        point.extend_from_slice(self.y.as_slice());
        point
    }

    fn verify_via_openssl(
        &self,
        digest: MessageDigest,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::SignatureMismatch> {
        let size = self.curve.coordinate_size();
        if signature.len() != size * 2 {
            return Err(error::signature_mismatch());
        }

        let r = BigNum::from_slice(&signature[..size]).map_err(|_| error::signature_mismatch())?;
        let s = BigNum::from_slice(&signature[size..]).map_err(|_| error::signature_mismatch())?;
        let sig =
            EcdsaSig::from_private_components(r, s).map_err(|_| error::signature_mismatch())?;

        let digest = hash(digest, data).map_err(|_| error::signature_mismatch())?;
        let key = self.to_openssl_key().map_err(|_| error::signature_mismatch())?;

        match sig.verify(&digest, &key) {
            Ok(true) => Ok(()),
            _ => Err(error::signature_mismatch()),
        }
    }
}

impl jws::Verifier for PublicKey {
    type Algorithm = SigningAlgorithm;
    type Error = error::SignatureMismatch;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        self.curve == Curve::from(alg)
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        if !self.can_verify(alg) {
            return Err(error::signature_mismatch());
        }

        match alg.ring_verification_algorithm() {
            Some(params) => {
                let key = ring::signature::UnparsedPublicKey::new(
                    params,
                    self.uncompressed_point(),
                );
                key.verify(data, signature)
                    .map_err(|_| error::signature_mismatch())
            }
            // ring has no P-521 support
            None => self.verify_via_openssl(MessageDigest::sha512(), data, signature),
        }
    }
}

impl TryFrom<PublicKeyDto> for PublicKey {
    type Error = error::KeyRejected;

    fn try_from(dto: PublicKeyDto) -> Result<Self, Self::Error> {
        Self::from_public_components(dto.curve, dto.x, dto.y)
    }
}

impl From<PublicKey> for PublicKeyDto {
    fn from(key: PublicKey) -> Self {
        Self {
            curve: key.curve,
            x: key.x,
            y: key.y,
        }
    }
}

/// ECC public key parameters
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(super) struct PublicKeyDto {
    #[serde(rename = "crv")]
    pub curve: Curve,
    pub x: Base64Url,
    pub y: Base64Url,
}
