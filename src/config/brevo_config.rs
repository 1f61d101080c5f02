//! config/brevo_config.rs
//! Configuración del proceso leída de variables de entorno (.env vía dotenv).

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.brevo.com/v3";
pub const DEFAULT_FOLDER_ID: i64 = 1;

#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: String,
    pub api_url: String,
    /// Endpoint externo de "user retention" (lista de emails por categoría).
    pub user_list_url: Option<String>,
    pub default_folder_id: i64,
    /// Directorio de uploads temporales; `csv_path` sólo se acepta dentro de él.
    pub upload_dir: Option<PathBuf>,
    pub server_host: String,
    pub server_port: u16,
}

impl BrevoConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("BREVO_API_KEY")
            .map_err(|_| anyhow!("No se definió BREVO_API_KEY"))?;
        if api_key.trim().is_empty() {
            return Err(anyhow!("BREVO_API_KEY está vacía"));
        }

        let api_url = env::var("BREVO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let user_list_url = env::var("USER_LIST_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let default_folder_id = match env::var("DEFAULT_FOLDER_ID") {
            Ok(v) => v
                .parse::<i64>()
                .with_context(|| format!("DEFAULT_FOLDER_ID inválido: {}", v))?,
            Err(_) => DEFAULT_FOLDER_ID,
        };

        let upload_dir = env::var("CSV_UPLOAD_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = match env::var("SERVER_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("SERVER_PORT inválido: {}", v))?,
            Err(_) => 5022,
        };

        Ok(Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            user_list_url,
            default_folder_id,
            upload_dir,
            server_host,
            server_port,
        })
    }

    /// Config para tests: apunta a un servidor mock.
    #[cfg(test)]
    pub fn for_test(api_url: &str) -> Self {
        Self {
            api_key: "test-key".to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            user_list_url: None,
            default_folder_id: DEFAULT_FOLDER_ID,
            upload_dir: None,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
        }
    }
}
