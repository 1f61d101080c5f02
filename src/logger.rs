//! logger.rs
//! Configuración del logger usando env_logger.

/// Filtro por defecto: nuestro crate en `info`, actix y reqwest sólo `warn`.
pub const DEFAULT_LOG_FILTER: &str = "campaign_automation=info,actix_web=warn,reqwest=warn";

pub fn init_logger() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&filter))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    log::debug!("(init_logger) filtro='{}'", filter);
}
