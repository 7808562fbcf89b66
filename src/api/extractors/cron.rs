use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use crate::state::AppState;
use std::sync::Arc;

/// Guards the scheduled-sweep endpoint. When CRON_SECRET is set the request
/// must carry it as a bearer token; an unset secret leaves the endpoint open.
pub struct CronAuth;

impl<S> FromRequestParts<S> for CronAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let Some(secret) = app_state.config.cron_secret.as_deref() else {
            return Ok(CronAuth);
        };

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if token == Some(secret) {
            Ok(CronAuth)
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
