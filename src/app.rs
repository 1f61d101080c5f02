//! app.rs
use crate::handlers::{campaign_handler, contact_handler, workflow_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route(
                "/templates",
                web::get().to(campaign_handler::list_templates_endpoint),
            )
            .route(
                "/folders",
                web::get().to(campaign_handler::list_folders_endpoint),
            )
            .route(
                "/senders",
                web::get().to(campaign_handler::list_senders_endpoint),
            )
            .service(web::scope("/contacts").route(
                "/import",
                web::post().to(contact_handler::import_contacts_endpoint),
            ))
            .service(web::scope("/campaigns").route(
                "/schedule",
                web::post().to(campaign_handler::schedule_campaign_endpoint),
            ))
            .service(web::scope("/workflow").route(
                "/execute",
                web::post().to(workflow_handler::execute_workflow_endpoint),
            )),
    );
}
