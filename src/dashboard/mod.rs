use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::error::KitchenError;
use crate::node::SharedKitchen;
use crate::scheduler::{KitchenStats, OrderId, WorkerCount};

#[derive(Clone)]
pub struct DashboardState {
    pub kitchen: SharedKitchen,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub vip: bool,
}

#[derive(Debug, Serialize)]
struct CreateOrderResponse {
    order_id: OrderId,
}

#[derive(Debug, Deserialize)]
pub struct SetBotsRequest {
    pub count: i64,
}

#[derive(Debug, Serialize)]
struct CancelOrderResponse {
    order_id: OrderId,
    cancelled: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: &KitchenError) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Routes of the JSON dashboard, bound to `state`.
pub fn router(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/kitchen", get(snapshot_handler))
        .route("/api/orders", post(create_order_handler))
        .route("/api/orders/pending", get(pending_handler))
        .route("/api/orders/processing", get(processing_handler))
        .route("/api/orders/completed", get(completed_handler))
        .route("/api/orders/{id}", delete(cancel_order_handler))
        .route("/api/bots", put(set_bots_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve the dashboard on `listener` until `shutdown` fires.
pub async fn serve_dashboard(
    listener: tokio::net::TcpListener,
    state: DashboardState,
    shutdown: CancellationToken,
) {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(addr = %addr, "Starting dashboard server");
    }

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    {
        tracing::error!(error = %e, "Dashboard server failed");
    }
}

async fn snapshot_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.kitchen.read().await.snapshot())
}

async fn pending_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.kitchen.read().await.pending_orders())
}

async fn processing_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.kitchen.read().await.processing_orders())
}

async fn completed_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.kitchen.read().await.completed_orders())
}

async fn create_order_handler(
    State(state): State<DashboardState>,
    Json(payload): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    let order_id = state.kitchen.write().await.create_order(payload.vip);
    (StatusCode::CREATED, Json(CreateOrderResponse { order_id }))
}

async fn cancel_order_handler(
    State(state): State<DashboardState>,
    Path(id): Path<u64>,
) -> Response {
    let order_id = OrderId(id);
    match state.kitchen.write().await.cancel_order(order_id) {
        Ok(true) => Json(CancelOrderResponse {
            order_id,
            cancelled: true,
        })
        .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(CancelOrderResponse {
                order_id,
                cancelled: false,
            }),
        )
            .into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, &e),
    }
}

async fn set_bots_handler(
    State(state): State<DashboardState>,
    Json(payload): Json<SetBotsRequest>,
) -> Response {
    let WorkerCount(count) = match WorkerCount::try_from(payload.count) {
        Ok(count) => count,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let stats: KitchenStats = {
        let mut kitchen = state.kitchen.write().await;
        if let Err(e) = kitchen.set_worker_count(count) {
            return error_response(StatusCode::BAD_REQUEST, &e);
        }
        kitchen.stats()
    };
    Json(stats).into_response()
}
