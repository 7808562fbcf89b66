use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::UpdateSettingsRequest;
use crate::domain::models::settings::CrmSettings;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state
        .settings_repo
        .get()
        .await?
        .unwrap_or_else(CrmSettings::disabled);
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut settings = state
        .settings_repo
        .get()
        .await?
        .unwrap_or_else(CrmSettings::disabled);

    if let Some(flag) = payload.use_ghl_calendar {
        settings.use_ghl_calendar = flag;
    }
    // An empty string clears a stored credential; absent fields are kept.
    if let Some(key) = payload.ghl_api_key {
        settings.ghl_api_key = if key.is_empty() { None } else { Some(key) };
    }
    if let Some(location) = payload.ghl_location_id {
        settings.ghl_location_id = if location.is_empty() { None } else { Some(location) };
    }
    if let Some(calendar) = payload.ghl_calendar_id {
        settings.ghl_calendar_id = if calendar.is_empty() { None } else { Some(calendar) };
    }
    settings.updated_at = Utc::now();

    let updated = state.settings_repo.upsert(&settings).await?;
    state.settings_cache.invalidate().await;
    info!("CRM settings updated (use_ghl_calendar = {})", updated.use_ghl_calendar);

    Ok(Json(updated))
}
