//! HTTP API: routing, handlers, and error-to-response mapping.
//!
//! One canonical handler per endpoint. Handlers stay thin: parameter
//! presence checks, a call into the store / upstream client / export
//! pipeline, and response shaping. Errors propagate as [`SkycastError`] and
//! are turned into structured JSON bodies here.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::export::{self, ExportFormat, ExportResult, ReportAssembler, ReportQuery};
use crate::models::{WeatherRecordDraft, WeatherRecordUpdate, WeatherSnapshot};
use crate::store::Store;
use crate::weather::{PlaceQuery, WeatherProvider};
use crate::{Result, SkycastError};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Persistence for locations, weather records, and search history
    pub store: Arc<Mutex<Store>>,
    /// Upstream weather data source
    pub provider: Arc<dyn WeatherProvider>,
}

impl AppState {
    /// Wrap a store and provider for sharing across handlers.
    pub fn new(store: Store, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            provider,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather/coordinates", get(weather_by_coordinates))
        .route("/weather/location", get(weather_by_location))
        .route("/weather/forecast", get(weather_forecast))
        .route("/weather/record", post(save_weather_record))
        .route(
            "/weather/records/{id}",
            get(weather_records_for_location)
                .put(update_weather_record)
                .delete(delete_weather_record),
        )
        .route("/locations", get(all_locations).post(create_location))
        .route(
            "/locations/{id}",
            get(location_by_id)
                .put(update_location)
                .delete(delete_location),
        )
        .route("/history", get(all_history).post(save_history))
        .route("/history/{id}", delete(delete_history))
        .route("/export", get(export_weather))
        .route("/export/history/pdf", get(export_history_report))
        .with_state(state)
}

impl IntoResponse for SkycastError {
    fn into_response(self) -> Response {
        let status = match &self {
            SkycastError::MissingFormat
            | SkycastError::MissingLocation
            | SkycastError::UnsupportedFormat { .. }
            | SkycastError::Validation { .. } => StatusCode::BAD_REQUEST,
            SkycastError::NotFound { .. } => StatusCode::NOT_FOUND,
            SkycastError::Conflict { .. } => StatusCode::CONFLICT,
            SkycastError::Config { .. }
            | SkycastError::Upstream { .. }
            | SkycastError::Render { .. }
            | SkycastError::Store { .. }
            | SkycastError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// === Weather lookup ===

#[derive(Debug, Deserialize)]
struct CoordinateParams {
    lat: Option<f64>,
    lon: Option<f64>,
}

async fn weather_by_coordinates(
    State(state): State<AppState>,
    Query(params): Query<CoordinateParams>,
) -> Result<Json<WeatherSnapshot>> {
    let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
        return Err(SkycastError::validation(
            "Latitude and longitude are required",
        ));
    };

    let snapshot = state
        .provider
        .current(&PlaceQuery::Coords { lat, lon })
        .await?;

    spawn_history_write(&state, snapshot.location.clone(), lat, lon);
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
struct NameParams {
    name: Option<String>,
}

async fn weather_by_location(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<WeatherSnapshot>> {
    let Some(name) = params.name.filter(|n| !n.is_empty()) else {
        return Err(SkycastError::validation("Location name is required"));
    };

    let snapshot = state.provider.current(&PlaceQuery::Name(name)).await?;

    spawn_history_write(
        &state,
        snapshot.location.clone(),
        snapshot.lat,
        snapshot.lon,
    );
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    lat: Option<f64>,
    lon: Option<f64>,
    name: Option<String>,
    days: Option<u8>,
}

async fn weather_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<Value>> {
    let place = if let (Some(lat), Some(lon)) = (params.lat, params.lon) {
        PlaceQuery::Coords { lat, lon }
    } else if let Some(name) = params.name.filter(|n| !n.is_empty()) {
        PlaceQuery::Name(name)
    } else {
        return Err(SkycastError::validation(
            "Either coordinates or location name is required",
        ));
    };

    let forecast = state
        .provider
        .forecast(&place, params.days.unwrap_or(5))
        .await?;
    Ok(Json(forecast))
}

/// Submit the history write as a detached task: best effort, never awaited
/// by the response, failures logged and swallowed.
fn spawn_history_write(state: &AppState, name: String, lat: f64, lon: f64) {
    let store = state.store.clone();
    tokio::spawn(async move {
        let store = store.lock().await;
        if let Err(e) = store.record_search(&name, lat, lon) {
            warn!("Failed to record search history for {name}: {e}");
        }
    });
}

// === Weather records ===

async fn save_weather_record(
    State(state): State<AppState>,
    Json(draft): Json<WeatherRecordDraft>,
) -> Result<impl IntoResponse> {
    let store = state.store.lock().await;
    let record = store.insert_weather_record(&draft)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn weather_records_for_location(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> Result<Json<Vec<crate::models::WeatherRecord>>> {
    let store = state.store.lock().await;
    Ok(Json(store.weather_records_for(location_id)?))
}

async fn update_weather_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<WeatherRecordUpdate>,
) -> Result<Json<crate::models::WeatherRecord>> {
    let store = state.store.lock().await;
    let record = store
        .update_weather_record(id, &update)?
        .ok_or_else(|| SkycastError::not_found("Weather record not found"))?;
    Ok(Json(record))
}

async fn delete_weather_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let store = state.store.lock().await;
    if !store.delete_weather_record(id)? {
        return Err(SkycastError::not_found("Weather record not found"));
    }
    Ok(Json(
        json!({ "message": "Weather record deleted successfully" }),
    ))
}

// === Locations ===

#[derive(Debug, Deserialize)]
struct LocationPayload {
    name: String,
    lat: f64,
    lon: f64,
}

async fn all_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::models::StoredLocation>>> {
    let store = state.store.lock().await;
    Ok(Json(store.all_locations()?))
}

async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<LocationPayload>,
) -> Result<impl IntoResponse> {
    let store = state.store.lock().await;
    let location = store.insert_location(&payload.name, payload.lat, payload.lon)?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn location_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<crate::models::StoredLocation>> {
    let store = state.store.lock().await;
    let location = store
        .find_location(id)?
        .ok_or_else(|| SkycastError::not_found("Location not found"))?;
    Ok(Json(location))
}

async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LocationPayload>,
) -> Result<Json<crate::models::StoredLocation>> {
    let store = state.store.lock().await;
    let location = store
        .update_location(id, &payload.name, payload.lat, payload.lon)?
        .ok_or_else(|| SkycastError::not_found("Location not found"))?;
    Ok(Json(location))
}

async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let store = state.store.lock().await;
    if !store.delete_location(id)? {
        return Err(SkycastError::not_found("Location not found"));
    }
    Ok(Json(json!({
        "message": "Location and associated weather records deleted successfully"
    })))
}

// === Search history ===

async fn all_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::models::SearchHistoryEntry>>> {
    let store = state.store.lock().await;
    Ok(Json(store.all_history()?))
}

async fn save_history(
    State(state): State<AppState>,
    Json(payload): Json<LocationPayload>,
) -> Result<impl IntoResponse> {
    let store = state.store.lock().await;
    let entry = store.record_search(&payload.name, payload.lat, payload.lon)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let store = state.store.lock().await;
    if !store.delete_history(id)? {
        return Err(SkycastError::not_found("Search record not found"));
    }
    Ok(Json(
        json!({ "message": "Search record deleted successfully" }),
    ))
}

// === Export ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportParams {
    format: Option<String>,
    location_id: Option<i64>,
    #[serde(alias = "locationName")]
    location: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// The export dispatcher: gate checks in order, then assembly, then the
/// chosen renderer, then headers + body in one shot.
async fn export_weather(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response> {
    let Some(keyword) = params.format.filter(|f| !f.is_empty()) else {
        return Err(SkycastError::MissingFormat);
    };

    let query = if let Some(id) = params.location_id {
        ReportQuery::LocationId(id)
    } else if let Some(name) = params.location.filter(|n| !n.is_empty()) {
        ReportQuery::LocationName(name)
    } else if let (Some(lat), Some(lon)) = (params.lat, params.lon) {
        ReportQuery::Coordinates { lat, lon }
    } else {
        return Err(SkycastError::MissingLocation);
    };

    let assembler = ReportAssembler::new(state.store.clone(), state.provider.clone());
    let report = assembler.assemble(&query).await?;

    let format = ExportFormat::parse(&keyword)?;
    let result = export::render(format, &report)?;

    Ok(export_response(result))
}

async fn export_history_report(State(state): State<AppState>) -> Result<Response> {
    let entries = {
        let store = state.store.lock().await;
        store.all_history()?
    };

    let result = export::pdf::render_history_report(&entries)?;
    Ok(export_response(result))
}

/// Turn an [`ExportResult`] into a response: content type always, attachment
/// disposition only for downloads.
fn export_response(result: ExportResult) -> Response {
    let mut response = result.body.into_response();

    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(result.content_type),
    );

    if let Some(filename) = result.filename {
        match header::HeaderValue::from_str(&format!("attachment; filename={filename}")) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(header::CONTENT_DISPOSITION, value);
            }
            Err(_) => warn!("Skipping unrepresentable attachment filename: {filename}"),
        }
    }

    response
}
