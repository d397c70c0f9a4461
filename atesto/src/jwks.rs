use crate::{jwa, jwk, Jwk};

use serde::{Deserialize, Serialize};

/// A JSON Web Key Set (JWKS)
///
/// A `keys` member is required; published keys that cannot be used by
/// this crate (unknown key types or algorithms) are skipped rather than
/// failing the whole set, since remote providers routinely publish keys
/// for algorithms a given consumer does not use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    #[serde(deserialize_with = "deserialize_keys")]
    keys: Vec<Jwk>,
}

impl Jwks {
    /// Adds a key to the set
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    /// A view of the keys in this set
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }

    /// Gets the key with the given key id
    ///
    /// If multiple keys share an id, the first is returned.
    pub fn get_key_by_id(&self, kid: &'_ jwk::KeyIdRef) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.key_id() == Some(kid))
    }

    /// Gets the best key usable with the algorithm requested
    pub fn get_key_for_alg<A: Into<jwa::Algorithm>>(&self, alg: A) -> Option<&Jwk> {
        get_key_impl(self.keys(), alg.into())
    }
}

fn get_key_impl(keys: &[Jwk], alg: jwa::Algorithm) -> Option<&Jwk> {
    let alg_usage = alg.to_usage();

    let best = keys.iter().fold(None, move |best, k| {
        let mut score = 0;

        if !k.is_compatible(alg) {
            return best;
        }

        if let Some(algorithm) = k.algorithm() {
            if algorithm == alg {
                score += 2;
            } else {
                return best;
            }
        }

        if let Some(key_usage) = k.usage() {
            if key_usage == alg_usage {
                score += 1;
            } else {
                return best;
            }
        }

        match best {
            Some((_, best_score)) if best_score < score => Some((k, score)),
            None => Some((k, score)),
            _ => best,
        }
    });

    best.map(|(b, _)| b)
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<Jwk>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct MaybeJwksVisitor;

    impl<'de> serde::de::Visitor<'de> for MaybeJwksVisitor {
        type Value = Vec<Jwk>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a list of JWK objects")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
            let mut index = 0_usize;

            while let Some(value) = seq.next_element()? {
                match value {
                    MaybeJwk::Jwk(jwk) => values.push(jwk),
                    MaybeJwk::Unknown(key) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            jwks.idx = index,
                            jwk.kid = ?key.kid,
                            "jwk.use" = ?key.r#use,
                            jwk.alg = ?key.alg,
                            "ignoring unknown JWK"
                        );
                        let _ = (index, key);
                    }
                }
                index += 1;
            }

            Ok(values)
        }
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeJwk {
        Jwk(Jwk),
        Unknown(JwkLike),
    }

    #[allow(dead_code)]
    #[derive(serde::Deserialize)]
    struct JwkLike {
        #[serde(default)]
        kid: Option<jwk::KeyId>,
        #[serde(rename = "use", default)]
        r#use: Option<String>,
        #[serde(default)]
        alg: Option<String>,
    }

    deserializer.deserialize_seq(MaybeJwksVisitor)
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    #[cfg(feature = "tracing")]
    use tracing_test::traced_test;

    use super::*;

    const JWKS_WITH_UNKNOWN_ALG: &str = r#"
        {
            "keys": [
                {
                    "kid": "1",
                    "use": "enc",
                    "alg": "RSA-OAEP"
                }
            ]
        }
    "#;

    const JWKS_WITH_NO_ALG: &str = r#"
        {
            "keys": [
                {
                    "kid": "1",
                    "use": "enc"
                }
            ]
        }
    "#;

    const JWKS_WITH_NOTHING: &str = r#"
        {
            "keys": [
                {}
            ]
        }
    "#;

    const JWKS_WITHOUT_KEYS: &str = r#"{}"#;

    #[test]
    #[cfg_attr(feature = "tracing", traced_test)]
    fn deserializes_jwks_with_unknown_alg() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(JWKS_WITH_UNKNOWN_ALG)?;
        assert!(jwks.keys.is_empty());
        Ok(())
    }

    #[test]
    #[cfg_attr(feature = "tracing", traced_test)]
    fn deserialize_jwks_with_no_alg() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(JWKS_WITH_NO_ALG)?;
        assert!(jwks.keys.is_empty());
        Ok(())
    }

    #[test]
    #[cfg_attr(feature = "tracing", traced_test)]
    fn deserialize_jwks_with_nothing() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(JWKS_WITH_NOTHING)?;
        assert!(jwks.keys.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_document_without_keys() {
        let result: Result<Jwks, _> = serde_json::from_str(JWKS_WITHOUT_KEYS);
        assert!(result.is_err());
    }

    #[cfg(feature = "hmac")]
    mod hmac {
        use super::*;

        const JWKS: &str = r#"
            {
                "keys": [
                    {
                        "kty": "oct",
                        "kid": "token-signing",
                        "use": "sig",
                        "alg": "HS256",
                        "k": "a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2V5a2U"
                    },
                    {
                        "kid": "unusable",
                        "use": "enc",
                        "alg": "RSA-OAEP"
                    }
                ]
            }
        "#;

        #[test]
        #[cfg_attr(feature = "tracing", traced_test)]
        fn decodes_mixed_jwks_keeping_usable_keys() -> Result<()> {
            let jwks: Jwks = serde_json::from_str(JWKS)?;
            assert_eq!(jwks.keys().len(), 1);

            let key = jwks
                .get_key_by_id(jwk::KeyIdRef::from_str("token-signing"))
                .expect("key should be present");
            assert_eq!(key.algorithm(), Some(jwa::Algorithm::HS256));

            assert!(jwks
                .get_key_by_id(jwk::KeyIdRef::from_str("unusable"))
                .is_none());

            Ok(())
        }

        #[test]
        fn locates_key_by_algorithm() -> Result<()> {
            let jwks: Jwks = serde_json::from_str(JWKS)?;
            assert!(jwks.get_key_for_alg(jwa::Algorithm::HS256).is_some());
            assert!(jwks.get_key_for_alg(jwa::Algorithm::HS384).is_none());
            Ok(())
        }
    }
}
