use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts, Method},
};
use crate::state::AppState;
use crate::domain::models::auth::{Principal, Role};
use crate::domain::services::auth_service::AuthService;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

pub const ACCESS_COOKIE: &str = "access_token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Any signed-in caller. Cookie sessions must echo the CSRF token on
/// mutating requests; bearer tokens are exempt.
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let bearer = parts.headers.get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let (token, from_cookie) = match bearer {
            Some(token) => (token, false),
            None => {
                let cookies = parts.extensions.get::<Cookies>().ok_or(AppError::Internal)?;
                let token = cookies.get(ACCESS_COOKIE)
                    .ok_or(AppError::Unauthorized)?
                    .value()
                    .to_string();
                (token, true)
            }
        };

        let claims = app_state.auth_service.verify(&token)?;

        let method = &parts.method;
        if from_cookie && method != Method::GET && method != Method::HEAD && method != Method::OPTIONS {
            let csrf = parts.headers.get(CSRF_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(AppError::Forbidden("Missing CSRF token".into()))?;

            if csrf != claims.csrf {
                return Err(AppError::Forbidden("CSRF token mismatch".into()));
            }
        }

        let principal = AuthService::principal(&claims);

        Span::current().record("volunteer_id", principal.id.as_str());
        Span::current().record("role", principal.role.as_str());

        Ok(AuthUser(principal))
    }
}

/// A caller holding `role`, or failing that, 403.
async fn require_role<S>(parts: &mut Parts, state: &S, role: Role) -> Result<Principal, AppError>
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
    if principal.role != role {
        return Err(AppError::Forbidden(format!("{} access required", role.as_str())));
    }
    Ok(principal)
}

pub struct AdminUser(pub Principal);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin).await.map(AdminUser)
    }
}

pub struct VolunteerUser(pub Principal);

impl<S> FromRequestParts<S> for VolunteerUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Volunteer).await.map(VolunteerUser)
    }
}

pub struct YouthUser(pub Principal);

impl<S> FromRequestParts<S> for YouthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Youth).await.map(YouthUser)
    }
}
