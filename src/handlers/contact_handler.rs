//! handlers/contact_handler.rs

use actix_web::{web, HttpResponse};

use crate::{
    handlers::error_response,
    models::contact_model::{ImportContactsRequest, ImportContactsResponse},
    services::workflow_service::WorkflowService,
};

/// POST /api/contacts/import
pub async fn import_contacts_endpoint(
    workflow_service: web::Data<WorkflowService>,
    body: web::Json<ImportContactsRequest>,
) -> HttpResponse {
    let req = body.into_inner();

    let source = match req.source.into_source() {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };

    match workflow_service
        .import_contacts(&req.list_name, req.folder_id, source)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(ImportContactsResponse {
            success: true,
            list_id: outcome.list.id,
            message: outcome.message,
        }),
        Err(e) => {
            log::error!("Import failed: {}", e);
            error_response(&e)
        }
    }
}
