//! handlers/campaign_handler.rs
//! Datos para los selects del dashboard + programación de una campaña.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::{
    handlers::error_response,
    models::campaign_model::{ScheduleCampaignRequest, ScheduleCampaignResponse},
    services::{
        brevo_client::CampaignApi,
        workflow_service::{lead_time_warning, WorkflowService},
    },
};

/// GET /api/templates
pub async fn list_templates_endpoint(api: web::Data<dyn CampaignApi>) -> HttpResponse {
    let templates = api.get_templates().await;
    HttpResponse::Ok().json(json!({ "templates": templates }))
}

/// GET /api/folders
pub async fn list_folders_endpoint(api: web::Data<dyn CampaignApi>) -> HttpResponse {
    let folders = api.get_folders().await;
    HttpResponse::Ok().json(json!({ "folders": folders }))
}

/// GET /api/senders
pub async fn list_senders_endpoint(api: web::Data<dyn CampaignApi>) -> HttpResponse {
    let senders = api.get_senders().await;
    HttpResponse::Ok().json(json!({ "senders": senders }))
}

/// POST /api/campaigns/schedule
pub async fn schedule_campaign_endpoint(
    workflow_service: web::Data<WorkflowService>,
    body: web::Json<ScheduleCampaignRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    let now = Utc::now();
    let warning = lead_time_warning(now, req.send_at);
    if let Some(w) = &warning {
        log::warn!("(schedule_campaign_endpoint) {}", w);
    }

    match workflow_service.schedule_campaign(req).await {
        Ok(campaign) => HttpResponse::Ok().json(ScheduleCampaignResponse {
            success: true,
            campaign,
            warning,
        }),
        Err(e) => {
            log::error!("Scheduling failed: {}", e);
            error_response(&e)
        }
    }
}
