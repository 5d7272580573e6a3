/**
 * API REST CLUSTER-CONTROL - Surface HTTP du kernel
 *
 * RÔLE : Deux routes seulement : /health pour l'état du cluster, /register
 * pour enregistrer un nouveau nœud par sa MAC. Les réponses de /register sont
 * des enveloppes JSON status_code + données ou message d'erreur.
 *
 * La registration verrouille le service complet : une requête à la fois sur
 * le pool et le ledger (discipline single-writer).
 */

use crate::errors::KernelError;
use crate::health::CheckRegistry;
use crate::registration::RegistrationService;
use crate::state::Shared;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registration: Shared<RegistrationService>,
    pub checks: Arc<CheckRegistry>,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    mac_address: String,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/register", post(register_node))
        .with_state(app_state)
}

// GET /health (verdict de chaque check nommé)
async fn get_health(State(app): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(app.checks.run_all())
}

// POST /register (enregistre un nœud par MAC, répond enveloppe JSON)
async fn register_node(
    State(app): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    println!("[http] registration request from {}", req.mac_address);

    // le guard est relâché avant tout await : pas de lock tenu en async
    let result = app.registration.lock().register(&req.mac_address);

    match result {
        Ok(reg) => (
            StatusCode::OK,
            Json(json!({
                "status_code": 200,
                "mac": reg.mac,
                "node": reg.node_name,
                "ip": reg.ip.to_string(),
            })),
        ),
        Err(e) => {
            eprintln!("[http] registration failed for {}: {}", req.mac_address, e);
            let code = error_status(&e);
            (
                code,
                Json(json!({
                    "status_code": code.as_u16(),
                    "message": e.to_string(),
                })),
            )
        }
    }
}

fn error_status(err: &KernelError) -> StatusCode {
    match err {
        KernelError::InvalidMac(_) => StatusCode::BAD_REQUEST,
        KernelError::PoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
