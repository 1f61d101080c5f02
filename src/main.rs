use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::brevo_config::BrevoConfig;
use crate::logger::init_logger;
use crate::services::brevo_client::{BrevoClient, CampaignApi};
use crate::services::user_list_service::{UserListLookup, UserListService};
use crate::services::workflow_service::WorkflowService;

mod app;
mod config;
mod error;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = BrevoConfig::from_env()?;
    log::info!("Usando API de campañas en {}", config.api_url);

    // Un único cliente para todo el proceso, pasado explícitamente.
    let api: Arc<dyn CampaignApi> = Arc::new(BrevoClient::new(&config));
    let user_lists: Arc<dyn UserListLookup> =
        Arc::new(UserListService::new(config.user_list_url.clone()));
    if config.user_list_url.is_none() {
        log::warn!("USER_LIST_API_URL no definida: los imports por categoría fallarán");
    }

    let mut workflow_service =
        WorkflowService::new(api.clone(), user_lists, config.default_folder_id);
    match &config.upload_dir {
        Some(dir) => workflow_service = workflow_service.with_upload_dir(dir.clone()),
        None => log::info!("CSV_UPLOAD_DIR no definida: csv_path deshabilitado"),
    }

    log::info!(
        "Levantando servidor en {}:{}",
        config.server_host,
        config.server_port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(api.clone()))
            .app_data(web::Data::new(workflow_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
