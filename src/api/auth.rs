use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose};
use std::sync::Arc;
use tracing::warn;

pub const UNAUTHORIZED_BODY: &str = "Unauthorized.";
pub const LOGIN_CHALLENGE: &str = r#"Basic realm="Login Required""#;

pub trait CredentialVerifier: Send + Sync {
    fn is_valid(&self, username: &str, password: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pairs: Vec<(String, String)>,
}

impl StaticCredentials {
    pub fn new<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    pub fn defaults() -> Self {
        Self::new([
            ("admin", "admin"),
            ("joel", "coen"),
            ("ethan", "coen"),
            ("hudsucker", "proxy"),
        ])
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn is_valid(&self, username: &str, password: &str) -> bool {
        self.pairs
            .iter()
            .any(|(u, p)| u == username && p == password)
    }
}

/// `Methods(vec![])` guards nothing, which is not the same as `AllMethods`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    AllMethods,
    Methods(Vec<Method>),
}

impl AuthPolicy {
    pub fn only(methods: impl IntoIterator<Item = Method>) -> Self {
        AuthPolicy::Methods(methods.into_iter().collect())
    }

    pub fn applies_to(&self, method: &Method) -> bool {
        match self {
            AuthPolicy::AllMethods => true,
            AuthPolicy::Methods(methods) => methods.contains(method),
        }
    }
}

#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn CredentialVerifier>,
    policy: AuthPolicy,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, policy: AuthPolicy) -> Self {
        Self { verifier, policy }
    }
}

pub async fn basic_auth(
    State(gate): State<AuthGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !gate.policy.applies_to(req.method()) {
        return next.run(req).await;
    }

    if let Some((username, password)) = basic_credentials(req.headers()) {
        if gate.verifier.is_valid(&username, &password) {
            return next.run(req).await;
        }
    }

    warn!(
        method = %req.method(),
        path = %req.uri().path(),
        "rejected request without valid credentials"
    );
    unauthorized()
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, LOGIN_CHALLENGE)],
        UNAUTHORIZED_BODY,
    )
        .into_response()
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
