use crate::sse::event_stream;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use productmap_app::domain::{CancelOutcome, PlacementSnapshot, Product, ProductId, UpvoteResult};
use productmap_app::presentation::{LongPress, LongPressOutcome};
use productmap_app::AppContext;
use productmap_errors::AppError;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    title: String,
    #[serde(default)]
    description: String,
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/gestures/long-press", post(long_press))
        .route("/placement", get(placement))
        .route("/placement/confirm", post(confirm_placement))
        .route("/placement/cancel", post(cancel_placement))
        .route("/products/{city}", get(list_products))
        .route("/products/{city}/{id}", get(product_detail))
        .route("/products/{city}/{id}/upvote", post(upvote))
        .route("/events", get(event_stream))
        .with_state(ctx)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn long_press(
    State(ctx): State<AppContext>,
    Json(press): Json<LongPress>,
) -> Result<Json<LongPressOutcome>, AppError> {
    ctx.adapter.on_long_press(press).await.map(Json)
}

async fn placement(State(ctx): State<AppContext>) -> Json<PlacementSnapshot> {
    Json(ctx.placement.snapshot().await)
}

async fn confirm_placement(
    State(ctx): State<AppContext>,
    Json(form): Json<ConfirmForm>,
) -> Result<Json<Product>, AppError> {
    ctx.adapter
        .on_confirm_edit(&form.title, &form.description)
        .await
        .map(Json)
}

async fn cancel_placement(State(ctx): State<AppContext>) -> Result<Json<CancelOutcome>, AppError> {
    ctx.adapter.on_cancel_edit().await.map(Json)
}

async fn list_products(
    State(ctx): State<AppContext>,
    Path(city): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    ctx.catalog.refresh_city(&city).await.map(Json)
}

async fn product_detail(
    State(ctx): State<AppContext>,
    Path((city, id)): Path<(String, ProductId)>,
) -> Result<Json<Product>, AppError> {
    ctx.catalog.product(&id, &city).await.map(Json)
}

async fn upvote(
    State(ctx): State<AppContext>,
    Path((city, id)): Path<(String, ProductId)>,
) -> Result<Json<UpvoteResult>, AppError> {
    ctx.adapter.on_upvote_tap(id, &city).map(Json)
}
