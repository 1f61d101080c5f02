//! handlers/workflow_handler.rs

use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;

use crate::{
    handlers::status_for, models::workflow_model::WorkflowRequest,
    services::workflow_service::WorkflowService,
};

/// POST /api/workflow/execute
/// El estado del workflow va en el cuerpo. 200 salvo campañas fallidas (207).
pub async fn execute_workflow_endpoint(
    workflow_service: web::Data<WorkflowService>,
    body: web::Json<WorkflowRequest>,
) -> HttpResponse {
    let result = workflow_service.execute_workflow(body.into_inner()).await;
    let partial = result.partial_failure();
    let status = partial.as_ref().map(status_for).unwrap_or(StatusCode::OK);

    HttpResponse::build(status).json(json!({
        "success": result.is_success(),
        "partial_failure": partial.map(|e| e.to_string()),
        "workflow": result
    }))
}
