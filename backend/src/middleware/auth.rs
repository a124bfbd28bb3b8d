//! Authentication middleware
//!
//! Single-tenant header authentication: every request carries an `X-User-Id`
//! header identifying the operator. The id matching the configured admin id
//! gets upload rights; everyone else is read-only.

use axum::{
    http::StatusCode,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, ErrorResponse};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user information extracted from the request headers
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub is_admin: bool,
}

/// Authentication middleware that reads the identity header.
/// The admin id is read from the environment so the middleware stays free
/// of state dependencies.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let user_id = match user_id {
        Some(id) => id.to_string(),
        None => {
            return unauthorized_response("Missing or empty X-User-Id header");
        }
    };

    let admin_id = std::env::var("ZIEL__AUTH__ADMIN_ID").unwrap_or_else(|_| "admin".to_string());

    let auth_user = AuthUser {
        is_admin: user_id == admin_id,
        user_id,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Guard for handlers that mutate the stored datasets
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User '{}' is not allowed to modify datasets",
            user.user_id
        )))
    }
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: crate::error::ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message_en: message.to_string(),
            message_id: "Tidak diizinkan".to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: crate::error::ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message_en: "Authentication required".to_string(),
                        message_id: "Harus masuk terlebih dahulu".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
