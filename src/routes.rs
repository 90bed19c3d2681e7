use std::{collections::HashMap, sync::Arc};

use axum::{body::Bytes, extract::State, Form, Json};
use serde_json::{json, Value};

use crate::{
    error::RelayError,
    features::{FeatureSchema, FeatureVector},
    relay::Relay,
    types::{RelayRequest, RelayResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

// Raw bytes rather than `Json<_>` so that a bad inbound body is answered
// with the relay's own failure shape instead of axum's rejection.
pub async fn predict_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, RelayError> {
    let prediction = state.relay.handle(&body).await?;
    Ok(Json(RelayResponse::success(prediction)))
}

/// Plain HTML form posts: every field arrives as a string and goes through
/// the same parsing as the form widgets before being relayed.
pub async fn form_handler(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<RelayResponse>, RelayError> {
    let features = FeatureVector::from_form(&fields);
    let data = serde_json::to_value(features).map_err(RelayError::Request)?;
    let prediction = state.relay.relay(&RelayRequest { data }).await?;
    Ok(Json(RelayResponse::success(prediction)))
}

pub async fn features_handler() -> Json<FeatureSchema> {
    Json(FeatureSchema::default())
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
