//! A named registry of token profiles
//!
//! Applications commonly issue more than one kind of token. The registry
//! holds one [`TokenProfile`] per name, built once from declarative
//! configuration during process initialization, with one entry
//! designated the default. The default is resolved and validated at
//! build time: a configuration naming a nonexistent default fails
//! registry construction, not the first request.

use std::{collections::HashMap, convert::TryFrom, sync::Arc, time::Duration};

#[cfg(feature = "hmac")]
use aliri_base64::Base64Url;
use aliri_braid::braid;
use serde::Deserialize;

use crate::{
    error, jwa,
    jwt::{Audience, Issuer, TokenId},
    profile::TokenProfile,
    Jwk,
};

#[cfg(any(feature = "hmac", feature = "openssl"))]
use crate::jws;

/// The name of a registered token profile
#[braid(serde, ref_doc = "A borrowed reference to a [`ProfileName`]")]
pub struct ProfileName;

/// An immutable set of named token profiles with a designated default
#[derive(Clone, Debug)]
#[must_use]
pub struct ProfileRegistry {
    profiles: HashMap<ProfileName, Arc<TokenProfile>>,
    default: ProfileName,
}

impl ProfileRegistry {
    /// Assembles a registry from already-constructed profiles
    ///
    /// # Errors
    ///
    /// Returns an error if `default` does not name one of the provided
    /// profiles.
    pub fn new<I>(profiles: I, default: ProfileName) -> Result<Self, error::UnknownDefaultProfile>
    where
        I: IntoIterator<Item = (ProfileName, TokenProfile)>,
    {
        let profiles: HashMap<_, _> = profiles
            .into_iter()
            .map(|(name, profile)| (name, Arc::new(profile)))
            .collect();

        if !profiles.contains_key(&default) {
            return Err(error::unknown_default_profile(default.as_str()));
        }

        Ok(Self { profiles, default })
    }

    /// Builds a registry from declarative configuration
    ///
    /// Every profile is constructed eagerly, so configuration mistakes
    /// (unsupported algorithm names, unusable key material, a missing
    /// default) are all reported here.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid profile definition,
    /// or the missing default.
    pub fn from_config(config: RegistryConfig) -> Result<Self, error::RegistryError> {
        let mut profiles = Vec::with_capacity(config.profiles.len());

        for (name, definition) in config.profiles {
            let profile = build_profile(&name, definition)?;
            profiles.push((name, profile));
        }

        Ok(Self::new(profiles, config.default)?)
    }

    /// The default profile
    #[must_use]
    pub fn default_profile(&self) -> &Arc<TokenProfile> {
        self.profiles
            .get(&self.default)
            .expect("default existence is validated at construction")
    }

    /// The name of the default profile
    pub fn default_name(&self) -> &ProfileNameRef {
        &self.default
    }

    /// Looks up a profile by name
    #[must_use]
    pub fn get(&self, name: &ProfileNameRef) -> Option<&Arc<TokenProfile>> {
        self.profiles.get(name)
    }

    /// Iterates over the registered profile names
    pub fn names(&self) -> impl Iterator<Item = &ProfileNameRef> {
        self.profiles.keys().map(AsRef::as_ref)
    }
}

fn build_profile(
    name: &ProfileNameRef,
    definition: ProfileConfig,
) -> Result<TokenProfile, error::RegistryError> {
    let invalid = |source: error::ProfileError| error::RegistryError::InvalidProfile {
        name: name.as_str().to_owned(),
        source,
    };

    let algorithm = jwa::Algorithm::try_from(definition.algorithm.as_str())
        .map_err(|e| invalid(e.into()))?;

    let key = definition
        .key
        .into_jwk(algorithm)
        .map_err(|source| error::RegistryError::KeyRejected {
            name: name.as_str().to_owned(),
            source,
        })?;

    let mut profile = TokenProfile::new(algorithm, key, definition.token_id, definition.issuer)
        .map_err(invalid)?;

    if let Some(audience) = definition.audience {
        profile = profile.with_audience(audience);
    }

    if let Some(secs) = definition.expiration_secs {
        profile = profile.with_default_expiration(Duration::from_secs(secs));
    }

    if let Some(secs) = definition.short_expiration_secs {
        profile = profile.with_short_expiration(Duration::from_secs(secs));
    }

    if let Some(secs) = definition.long_expiration_secs {
        profile = profile.with_long_expiration(Duration::from_secs(secs));
    }

    Ok(profile)
}

/// Declarative configuration for a [`ProfileRegistry`]
#[derive(Clone, Debug, Deserialize)]
pub struct RegistryConfig {
    /// The name of the profile to use when none is specified
    pub default: ProfileName,

    /// The profile definitions, by name
    pub profiles: HashMap<ProfileName, ProfileConfig>,
}

/// Declarative configuration for a single [`TokenProfile`]
#[derive(Clone, Debug, Deserialize)]
pub struct ProfileConfig {
    /// The wire name of the signing algorithm (e.g. `"HS256"`)
    pub algorithm: String,

    /// The signing/verification key material
    pub key: KeyMaterial,

    /// The issuer stamped into and expected from tokens
    pub issuer: Issuer,

    /// The expected audience; defaults to the issuer when unset
    #[serde(default)]
    pub audience: Option<Audience>,

    /// The token id stamped into and expected from tokens
    pub token_id: TokenId,

    /// The default expiration, in seconds
    #[serde(default)]
    pub expiration_secs: Option<u64>,

    /// The short-lived expiration, in seconds
    #[serde(default)]
    pub short_expiration_secs: Option<u64>,

    /// The long-lived expiration, in seconds
    #[serde(default)]
    pub long_expiration_secs: Option<u64>,
}

/// Key material supplied by configuration
///
/// The registry performs no file or network access itself; whatever
/// loads the configuration is responsible for inlining the key material
/// here.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyMaterial {
    /// A base64url-encoded symmetric secret
    #[cfg(feature = "hmac")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hmac")))]
    Secret {
        /// The secret bytes
        secret: Base64Url,
    },

    /// A PEM-encoded RSA or ECC key, optionally passphrase-protected
    #[cfg(feature = "openssl")]
    #[cfg_attr(docsrs, doc(cfg(feature = "openssl")))]
    Pem {
        /// The PEM document
        pem: String,
        /// The passphrase protecting the PEM document, if any
        #[serde(default)]
        passphrase: Option<String>,
    },

    /// A complete JWK object
    Jwk {
        /// The key
        jwk: Jwk,
    },
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let kind = match self {
            #[cfg(feature = "hmac")]
            Self::Secret { .. } => "Secret",
            #[cfg(feature = "openssl")]
            Self::Pem { .. } => "Pem",
            Self::Jwk { .. } => "Jwk",
        };
        f.debug_struct(kind).finish_non_exhaustive()
    }
}

impl KeyMaterial {
    fn into_jwk(self, algorithm: jwa::Algorithm) -> Result<Jwk, error::KeyRejected> {
        match self {
            #[cfg(feature = "hmac")]
            Self::Secret { secret } => {
                if !matches!(
                    algorithm,
                    jwa::Algorithm::Signing(jws::Algorithm::Hmac(_))
                ) {
                    return Err(error::key_rejected(
                        "a symmetric secret requires an HMAC algorithm",
                    ));
                }

                Ok(Jwk::from(jwa::Hmac::new(secret)))
            }

            #[cfg(feature = "openssl")]
            Self::Pem { pem, passphrase } => pem_to_jwk(algorithm, &pem, passphrase.as_deref()),

            Self::Jwk { jwk } => Ok(jwk),
        }
    }
}

#[cfg(feature = "openssl")]
fn pem_to_jwk(
    algorithm: jwa::Algorithm,
    pem: &str,
    passphrase: Option<&str>,
) -> Result<Jwk, error::KeyRejected> {
    let alg =
        jws::Algorithm::try_from(algorithm).map_err(error::key_rejected)?;

    match alg {
        #[cfg(feature = "hmac")]
        jws::Algorithm::Hmac(_) => Err(error::key_rejected(
            "an HMAC algorithm requires a symmetric secret, not a PEM document",
        )),

        #[cfg(feature = "rsa")]
        jws::Algorithm::Rsa(_) => {
            if pem.contains("PRIVATE KEY") {
                rsa_private_from_pem(pem, passphrase)
            } else {
                Ok(Jwk::from(jwa::rsa::PublicKey::from_pem(pem)?))
            }
        }

        #[cfg(feature = "ec")]
        jws::Algorithm::EllipticCurve(_) => {
            if pem.contains("PRIVATE KEY") {
                ec_private_from_pem(pem, passphrase)
            } else {
                Ok(Jwk::from(jwa::ec::PublicKey::from_pem(pem)?))
            }
        }
    }
}

#[cfg(all(feature = "rsa", feature = "private-keys"))]
fn rsa_private_from_pem(pem: &str, passphrase: Option<&str>) -> Result<Jwk, error::KeyRejected> {
    let key = match passphrase {
        Some(passphrase) => jwa::Rsa::private_key_from_pem_with_passphrase(pem, passphrase)?,
        None => jwa::Rsa::private_key_from_pem(pem)?,
    };

    Ok(Jwk::from(key))
}

#[cfg(all(feature = "rsa", feature = "openssl", not(feature = "private-keys")))]
fn rsa_private_from_pem(_pem: &str, _passphrase: Option<&str>) -> Result<Jwk, error::KeyRejected> {
    Err(error::key_rejected(
        "private key support is not enabled in this build",
    ))
}

#[cfg(all(feature = "ec", feature = "private-keys"))]
fn ec_private_from_pem(pem: &str, passphrase: Option<&str>) -> Result<Jwk, error::KeyRejected> {
    let key = match passphrase {
        Some(passphrase) => jwa::ec::PrivateKey::from_pem_with_passphrase(pem, passphrase)?,
        None => jwa::ec::PrivateKey::from_pem(pem)?,
    };

    Ok(Jwk::from(key))
}

#[cfg(all(feature = "ec", not(feature = "private-keys")))]
fn ec_private_from_pem(_pem: &str, _passphrase: Option<&str>) -> Result<Jwk, error::KeyRejected> {
    Err(error::key_rejected(
        "private key support is not enabled in this build",
    ))
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[cfg(feature = "hmac")]
    const CONFIG: &str = r#"
        {
            "default": "web",
            "profiles": {
                "web": {
                    "algorithm": "HS256",
                    "key": { "secret": "a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2U" },
                    "issuer": "https://web.example.com",
                    "token_id": "web-tokens",
                    "expiration_secs": 3600
                },
                "api": {
                    "algorithm": "HS512",
                    "key": { "secret": "c2VjcmV0c2VjcmV0c2VjcmV0c2VjcmV0c2VjcmV0c2U" },
                    "issuer": "https://api.example.com",
                    "audience": "https://api.example.com/v2",
                    "token_id": "api-tokens"
                }
            }
        }
    "#;

    #[test]
    #[cfg(feature = "hmac")]
    fn builds_registry_from_config() -> Result<()> {
        let config: RegistryConfig = serde_json::from_str(CONFIG)?;
        let registry = ProfileRegistry::from_config(config)?;

        assert_eq!(registry.default_name().as_str(), "web");
        assert_eq!(registry.names().count(), 2);

        let web = registry.default_profile();
        assert_eq!(web.issuer().as_str(), "https://web.example.com");
        assert_eq!(web.audience().as_str(), "https://web.example.com");

        let api = registry
            .get(ProfileNameRef::from_str("api"))
            .expect("api profile is registered");
        assert_eq!(api.audience().as_str(), "https://api.example.com/v2");

        assert!(registry.get(ProfileNameRef::from_str("mobile")).is_none());

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn registered_profiles_issue_and_verify() -> Result<()> {
        let config: RegistryConfig = serde_json::from_str(CONFIG)?;
        let registry = ProfileRegistry::from_config(config)?;

        let web = registry.default_profile();
        let token = web.issue("2", "test@example.com")?;
        let parsed = web.verify(&token)?;
        assert_eq!(parsed.subject_id().as_str(), "2");

        // Tokens issued under one profile are rejected by another.
        let api = registry
            .get(ProfileNameRef::from_str("api"))
            .expect("api profile is registered");
        assert!(!api.is_valid(&token));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn missing_default_fails_at_construction() -> Result<()> {
        let mut config: RegistryConfig = serde_json::from_str(CONFIG)?;
        config.default = ProfileName::from_static("mobile");

        let err = ProfileRegistry::from_config(config).unwrap_err();
        assert!(matches!(
            err,
            error::RegistryError::UnknownDefaultProfile(_)
        ));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn unknown_algorithm_fails_at_construction() -> Result<()> {
        let config: RegistryConfig = serde_json::from_str(
            r#"
            {
                "default": "web",
                "profiles": {
                    "web": {
                        "algorithm": "XX256",
                        "key": { "secret": "a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2U" },
                        "issuer": "https://web.example.com",
                        "token_id": "web-tokens"
                    }
                }
            }
            "#,
        )?;

        let err = ProfileRegistry::from_config(config).unwrap_err();
        assert!(matches!(err, error::RegistryError::InvalidProfile { .. }));

        Ok(())
    }

    #[test]
    #[cfg(all(feature = "hmac", feature = "rsa"))]
    fn secret_with_asymmetric_algorithm_fails() -> Result<()> {
        let config: RegistryConfig = serde_json::from_str(
            r#"
            {
                "default": "web",
                "profiles": {
                    "web": {
                        "algorithm": "RS256",
                        "key": { "secret": "a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2U" },
                        "issuer": "https://web.example.com",
                        "token_id": "web-tokens"
                    }
                }
            }
            "#,
        )?;

        let err = ProfileRegistry::from_config(config).unwrap_err();
        assert!(matches!(err, error::RegistryError::KeyRejected { .. }));

        Ok(())
    }

    #[test]
    #[cfg(feature = "hmac")]
    fn empty_registry_has_no_default() {
        let err =
            ProfileRegistry::new(Vec::new(), ProfileName::from_static("default")).unwrap_err();
        let _ = err;
    }
}
