//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (contactos, campañas, workflow).

pub mod campaign_handler;
pub mod contact_handler;
pub mod workflow_handler;

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

use crate::error::CampaignError;

/// Validación -> 400, workflow parcial -> 207, proveedor -> 502.
pub fn status_for(e: &CampaignError) -> StatusCode {
    match e {
        CampaignError::Validation(_) => StatusCode::BAD_REQUEST,
        CampaignError::PartialWorkflow { .. } => StatusCode::MULTI_STATUS,
        CampaignError::Transport(_) | CampaignError::RemoteRejection { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub fn error_response(e: &CampaignError) -> HttpResponse {
    HttpResponse::build(status_for(e)).json(json!({
        "success": false,
        "error": e.to_string(),
        "retryable": e.is_retryable()
    }))
}
