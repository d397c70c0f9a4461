use aliri_clock::{TestClock, UnixTime};
use atesto::{
    jwa,
    jwk::KeyId,
    jwt::{Issuer, TokenId},
    profile::TokenProfile,
    Jwk, JwtRef,
};
use atesto_oidc::{RemoteVerifier, RemoteVerifyError};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const KID: &str = "D44C4DD0CFD0A76F5748AD8F541B07A536895CCD";

/// A syntactically valid token for tests that never reach signature
/// verification.
const UNVERIFIED_TOKEN: &str = concat!(
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.",
    "eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.",
    "SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c"
);

struct Provider {
    server: MockServer,
    signing_key: Jwk,
}

impl Provider {
    /// Starts a mock provider serving a JWKS containing the public half
    /// of a freshly generated RSA key.
    async fn start() -> Self {
        let rsa = jwa::Rsa::generate().expect("RSA key generation");
        let signing_key = Jwk::from(rsa);

        let published = signing_key
            .clone()
            .public_only()
            .with_key_id(KeyId::from_static(KID))
            .with_algorithm(jwa::Algorithm::RS256);

        let server = Self::start_with_jwks(json!({
            "keys": [serde_json::to_value(&published).expect("JWK serialization")]
        }))
        .await;

        Self {
            server: server.server,
            signing_key,
        }
    }

    async fn start_with_jwks(jwks: serde_json::Value) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": server.uri(),
                "jwks_uri": format!("{}/.well-known/jwks", server.uri()),
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/.well-known/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
            .mount(&server)
            .await;

        Self {
            server,
            signing_key: Jwk::from(jwa::Rsa::generate().expect("RSA key generation")),
        }
    }

    fn issuer(&self) -> String {
        self.server.uri()
    }

    /// A profile that issues tokens the provider's JWKS can verify.
    fn profile(&self) -> TokenProfile {
        TokenProfile::new(
            jwa::Algorithm::RS256,
            self.signing_key.clone(),
            TokenId::from_static("id"),
            Issuer::new(self.issuer()),
        )
        .expect("profile should build")
    }
}

fn verifier() -> RemoteVerifier {
    RemoteVerifier::new().expect("client should build")
}

#[tokio::test]
async fn accepts_token_signed_by_published_key() {
    let provider = Provider::start().await;

    let token = provider
        .profile()
        .issuance()
        .with_key_id(KID)
        .issue("1", "user@example.net")
        .expect("issuance should succeed");

    let verdict = verifier()
        .verify(&token, &provider.issuer())
        .await
        .expect("verification should reach a verdict");

    assert!(verdict);
}

#[tokio::test]
async fn non_url_issuer_fails_before_any_request() {
    let provider = Provider::start().await;

    let err = verifier()
        .verify(JwtRef::from_str(UNVERIFIED_TOKEN), "non_url")
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidIssuerUrl { .. }));

    let requests = provider
        .server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn unreachable_discovery_document_is_an_error() {
    // A provider that serves nothing at all.
    let server = MockServer::start().await;

    let err = verifier()
        .verify(JwtRef::from_str(UNVERIFIED_TOKEN), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidToken(_)));
}

#[tokio::test]
async fn undecodable_discovery_document_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_string("certainly not json"))
        .mount(&server)
        .await;

    let err = verifier()
        .verify(JwtRef::from_str(UNVERIFIED_TOKEN), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidToken(_)));
}

#[tokio::test]
async fn discovery_document_without_jwks_uri_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": server.uri(),
        })))
        .mount(&server)
        .await;

    let err = verifier()
        .verify(JwtRef::from_str(UNVERIFIED_TOKEN), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidToken(_)));
}

#[tokio::test]
async fn failing_key_set_fetch_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": server.uri(),
            "jwks_uri": format!("{}/.well-known/jwks", server.uri()),
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/.well-known/jwks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = verifier()
        .verify(JwtRef::from_str(UNVERIFIED_TOKEN), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidToken(_)));
}

#[tokio::test]
async fn rotated_key_set_without_matching_kid_is_an_error() {
    let signing_key = Jwk::from(jwa::Rsa::generate().expect("RSA key generation"));

    // The provider publishes only a newer key: the token's signature
    // would verify, but no published key bears its kid.
    let provider = Provider::start_with_jwks(json!({
        "keys": [serde_json::to_value(
            &signing_key
                .clone()
                .public_only()
                .with_key_id(KeyId::from_static("a-newer-key"))
                .with_algorithm(jwa::Algorithm::RS256),
        )
        .expect("JWK serialization")]
    }))
    .await;

    let profile = TokenProfile::new(
        jwa::Algorithm::RS256,
        signing_key,
        TokenId::from_static("id"),
        Issuer::new(provider.issuer()),
    )
    .expect("profile should build");

    let token = profile
        .issuance()
        .with_key_id(KID)
        .issue("1", "user@example.net")
        .expect("issuance should succeed");

    let err = verifier()
        .verify(&token, &provider.issuer())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidToken(_)));
}

#[tokio::test]
async fn token_without_key_id_is_an_error() {
    let provider = Provider::start().await;

    let token = provider
        .profile()
        .issue("1", "user@example.net")
        .expect("issuance should succeed");

    let err = verifier()
        .verify(&token, &provider.issuer())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteVerifyError::InvalidToken(_)));
}

#[tokio::test]
async fn wrong_issuer_claim_is_rejected_not_an_error() {
    let provider = Provider::start().await;

    let elsewhere = TokenProfile::new(
        jwa::Algorithm::RS256,
        provider.signing_key.clone(),
        TokenId::from_static("id"),
        Issuer::from_static("https://elsewhere.example.com"),
    )
    .expect("profile should build");

    let token = elsewhere
        .issuance()
        .with_key_id(KID)
        .issue("1", "user@example.net")
        .expect("issuance should succeed");

    let verdict = verifier()
        .verify(&token, &provider.issuer())
        .await
        .expect("verification should reach a verdict");

    assert!(!verdict);
}

#[tokio::test]
async fn expired_token_is_rejected_not_an_error() {
    let provider = Provider::start().await;

    let past = TestClock::new(UnixTime(1_000));
    let token = provider
        .profile()
        .issuance()
        .with_key_id(KID)
        .issue_with_clock("1", "user@example.net", &past)
        .expect("issuance should succeed");

    let verdict = verifier()
        .verify(&token, &provider.issuer())
        .await
        .expect("verification should reach a verdict");

    assert!(!verdict);
}

#[tokio::test]
async fn tampered_signature_is_rejected_not_an_error() {
    let provider = Provider::start().await;

    let token = provider
        .profile()
        .issuance()
        .with_key_id(KID)
        .issue("1", "user@example.net")
        .expect("issuance should succeed");

    let dot = token.as_str().rfind('.').expect("token has a signature");
    let mut tampered = token.as_str()[..=dot].to_owned();
    let signature = &token.as_str()[dot + 1..];
    tampered.push(if signature.starts_with('A') { 'B' } else { 'A' });
    tampered.push_str(&signature[1..]);

    let verdict = verifier()
        .verify(JwtRef::from_str(&tampered), &provider.issuer())
        .await
        .expect("verification should reach a verdict");

    assert!(!verdict);
}
