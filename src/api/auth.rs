use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::extract::JsonBody;
use super::{
    ApiError, AppState, AuthResponse, LoginRequest, MessageResponse, RegisterRequest,
    UserResponse,
};
use crate::domain::{Identity, Role};
use crate::services::{AuthError, Registration};

/// The raw bearer token of an authenticated request, kept for logout.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` into an [`Identity`].
///
/// The blacklist is checked before the signature, so a logged-out token is
/// rejected even while it is still cryptographically valid.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or(AuthError::MissingCredentials)?;

    let identity = state.auth_service().authenticate(&token).await?;
    let span = tracing::Span::current();
    span.record("user_id", identity.id.value());
    span.record("role", identity.role.as_str());

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Rejects authenticated requests whose identity does not carry `role`.
/// Must run after [`auth_middleware`].
pub async fn require_role(
    State(role): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(identity) = request.extensions().get::<Identity>() else {
        return Err(AuthError::MissingCredentials.into());
    };

    if identity.role != role {
        let message = match role {
            Role::Admin => "Admin access required",
            Role::User => "User access required",
        };
        return Err(ApiError::Forbidden(message.to_string()));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register/user
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    register(&state, payload, Role::User, "User registered successfully").await
}

/// POST /auth/register/admin
pub async fn register_admin(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    register(&state, payload, Role::Admin, "Admin registered successfully").await
}

async fn register(
    state: &AppState,
    payload: RegisterRequest,
    role: Role,
    message: &str,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let session = state
        .auth_service()
        .register(
            Registration {
                username: payload.username,
                password: payload.password,
                email: payload.email,
                profile_photo: payload.profile_photo,
            },
            role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: message.to_string(),
            token: session.token,
            user: session.user.into(),
        }),
    ))
}

/// POST /auth/login
/// Any role may sign in here.
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    login_as(&state, payload, None).await
}

/// POST /auth/login/user
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    login_as(&state, payload, Some(Role::User)).await
}

/// POST /auth/login/admin
pub async fn login_admin(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    login_as(&state, payload, Some(Role::Admin)).await
}

async fn login_as(
    state: &AppState,
    payload: LoginRequest,
    required_role: Option<Role>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = state
        .auth_service()
        .login(&payload.username, &payload.password, required_role)
        .await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token: session.token,
        user: session.user.into(),
    }))
}

/// GET /auth/profile, /user/profile, /admin/profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service().profile(identity.id).await?;
    Ok(Json(UserResponse { user }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service().logout(&token, identity.id).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(
            extract_bearer_token(&headers).as_deref(),
            Some("abc.def.ghi")
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
