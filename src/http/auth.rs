use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};

use super::types::ApiResponse;
use crate::domain::task::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolves the caller's identity from request headers.
pub trait Authenticator: Send + Sync + 'static {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Trusts the identity header stamped by the upstream auth gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayHeader;

impl Authenticator for GatewayHeader {
    fn resolve(&self, headers: &HeaderMap) -> Option<UserId> {
        let value = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| UserId(value.to_string()))
    }
}

pub struct AuthUser(pub UserId);

pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(ApiResponse::failure("Authentication required"))).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<dyn Authenticator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Arc::<dyn Authenticator>::from_ref(state);
        auth.resolve(&parts.headers).map(AuthUser).ok_or(Unauthenticated)
    }
}
