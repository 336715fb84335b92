use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::reconcile::{Reconciler, RunReport};
use crate::service_layer::ServiceLayerClient;
use crate::store::StoreRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/v1/reconcile
///
/// Triggers one reconciliation run. Collaborators are built fresh per run so
/// the store pool lives exactly as long as the run that acquired it; a fatal
/// store failure comes back as `status: ERROR` in the report body, not as an
/// HTTP error.
pub async fn run_reconciliation(State(state): State<AppState>) -> AppResult<Json<RunReport>> {
    info!("reconciliation run requested");

    let store = StoreRepository::connect(&state.config)?;
    let gateway = ServiceLayerClient::new(&state.config)?;
    let reconciler = Reconciler::new(
        Arc::new(store),
        Arc::new(gateway),
        state.config.tenants.clone(),
    );

    Ok(Json(reconciler.run().await))
}
