//! Bearer-token authentication for the `/api` routes.

use core::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::server::RouteError;
use crate::db::prelude::UserId;

/// Maps a bearer credential to the user it was issued for.
pub trait TokenVerifier: Send + Sync + fmt::Debug {
    fn verify(&self, token: &str) -> AuthResult<UserId>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id, as a string
    pub sub: String,
    pub exp: usize,
}

/// HS256 JWTs signed with a shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> AuthResult<UserId> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        data.claims
            .sub
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| AuthErr::InvalidSubject(data.claims.sub))
    }
}

/// The authenticated caller, inserted into request extensions by [`require_bearer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

pub async fn require_bearer(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, RouteError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthErr::MissingBearer)?
        .to_str()
        .map_err(|_| AuthErr::MissingBearer)?
        .strip_prefix("Bearer ")
        .ok_or(AuthErr::MissingBearer)?
        .trim();

    let id = verifier.verify(token)?;
    tracing::trace!(user_id = %id, "authenticated request");

    req.extensions_mut().insert(AuthUser { id });
    Ok(next.run(req).await)
}

pub type AuthResult<T> = core::result::Result<T, AuthErr>;

#[derive(Debug, Error)]
pub enum AuthErr {
    #[error("missing bearer credential")]
    MissingBearer,

    #[error("token subject '{0}' is not a user id")]
    InvalidSubject(String),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod test {
    use axum::body::{Body, to_bytes};
    use axum::routing::get;
    use axum::{Extension, Router, middleware};
    use chrono::Utc;
    use http::StatusCode;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    const SECRET: &str = "test-secret";

    fn token(sub: &str, expires_in: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (Utc::now().timestamp() + expires_in) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn app() -> Router {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(SECRET));
        Router::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthUser>| async move { user.id.to_string() }),
            )
            .layer(middleware::from_fn_with_state(verifier, require_bearer))
    }

    async fn call(auth: Option<String>) -> (StatusCode, String) {
        let mut req = http::Request::builder().uri("/whoami");
        if let Some(auth) = auth {
            req = req.header(AUTHORIZATION, auth);
        }

        let res = app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_verify_claims() {
        let verifier = JwtVerifier::new(SECRET);
        assert_eq!(verifier.verify(&token("42", 60, SECRET)).unwrap(), UserId(42));
        assert!(matches!(
            verifier.verify(&token("alice", 60, SECRET)),
            Err(AuthErr::InvalidSubject(_))
        ));
        assert!(matches!(
            verifier.verify(&token("42", -3600, SECRET)),
            Err(AuthErr::Jwt(_))
        ));
        assert!(verifier.verify(&token("42", 60, "other-secret")).is_err());
        assert!(verifier.verify("not.a.jwt").is_err());
    }

    #[tokio::test]
    async fn test_valid_bearer_reaches_handler() {
        let (status, body) = call(Some(format!("Bearer {}", token("7", 60, SECRET)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7");
    }

    #[tokio::test]
    async fn test_rejections_are_401_with_detail() {
        for auth in [
            None,
            Some(String::from("Basic dXNlcjpwYXNz")),
            Some(format!("Bearer {}", token("7", -3600, SECRET))),
            Some(String::from("Bearer garbage")),
        ] {
            let (status, body) = call(auth).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);

            let json: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["detail"], "Could not validate credentials");
        }
    }
}
