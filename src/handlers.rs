use crate::detect::{decoded_size_kb, strip_data_url};
use crate::errors::AppError;
use crate::models::{
    AnalyticsResponse, DetectRequest, DetectResponse, MonthlyPoint, NewScan, ScanQuery,
    ScanRecord, UserStats,
};
use crate::seed::notes_for;
use crate::state::AppState;
use crate::stats::date_key;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::Local;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    Html(render_index(&store.stats()))
}

pub async fn list_scans(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Json<Vec<ScanRecord>> {
    let store = state.store.lock().await;
    Json(store.filter(query.severity.as_deref(), query.q.as_deref()))
}

pub async fn recent_scans(State(state): State<AppState>) -> Json<Vec<ScanRecord>> {
    let store = state.store.lock().await;
    Json(store.recent(Local::now().date_naive()))
}

pub async fn delete_scan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = {
        let id = id.clone();
        state.with_store(move |store| store.remove(&id)).await?
    };
    if removed {
        info!("deleted scan {id}");
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn detect(
    State(state): State<AppState>,
    Json(payload): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, AppError> {
    let image = strip_data_url(&payload.image);
    if image.is_empty() {
        return Err(AppError::bad_request(
            "No image selected: upload an image before detecting",
        ));
    }
    let decoded_kb = decoded_size_kb(image)
        .ok_or_else(|| AppError::bad_request("image must be base64 encoded"))?;

    // The store stays unlocked while the classifier call is in flight.
    let detection = state.detector.detect(image).await?;

    let now = Local::now();
    let date = date_key(now.date_naive());
    let severity = detection.severity();

    let notes = payload.notes.filter(|notes| !notes.trim().is_empty());
    let scan = NewScan {
        image_name: payload
            .image_name
            .unwrap_or_else(|| format!("skin_scan_{date}.jpg")),
        time: now.format("%-I:%M %p").to_string(),
        date,
        conditions: detection.conditions,
        severity,
        confidence: detection.confidence,
        image_url: payload
            .image_url
            .unwrap_or_else(|| "/placeholder.svg".to_string()),
        image_size: payload.image_size.unwrap_or(decoded_kb),
        notes: String::new(),
    };

    let (record, stats) = state
        .with_store(move |store| {
            let notes = notes.unwrap_or_else(|| notes_for(severity, store.rng()));
            let record = store.append(NewScan { notes, ..scan })?;
            Ok((record, store.stats()))
        })
        .await?;
    info!(
        "recorded scan {} ({}, {} conditions)",
        record.id,
        record.severity.as_str(),
        record.conditions.len()
    );

    Ok(Json(DetectResponse {
        scan: record,
        stats,
    }))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<UserStats> {
    let store = state.store.lock().await;
    Json(store.stats())
}

pub async fn refresh_stats(State(state): State<AppState>) -> Result<Json<UserStats>, AppError> {
    let stats = state.with_store(|store| store.refresh_stats()).await?;
    Ok(Json(stats))
}

pub async fn monthly(State(state): State<AppState>) -> Json<Vec<MonthlyPoint>> {
    let store = state.store.lock().await;
    Json(store.monthly())
}

pub async fn analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let store = state.store.lock().await;
    Json(store.analytics())
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<Vec<ScanRecord>>, AppError> {
    let scans = state
        .with_store(|store| {
            store.reset()?;
            Ok(store.list())
        })
        .await?;
    info!("scan history reset");
    Ok(Json(scans))
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.store.lock().await;
    Json(store.preferences())
}

pub async fn put_preferences(
    State(state): State<AppState>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !value.is_object() {
        return Err(AppError::bad_request("preferences must be a JSON object"));
    }
    let stored = value.clone();
    state
        .with_store(move |store| store.set_preferences(&stored))
        .await?;
    Ok(Json(value))
}
