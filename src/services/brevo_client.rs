//! services/brevo_client.rs
//! Cliente HTTP del proveedor de campañas (Brevo v3). Sólo mapea
//! request/response: nada de lógica de negocio ni reintentos.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::brevo_config::BrevoConfig,
    error::{CampaignError, CampaignResult},
    models::{
        campaign_model::{NewCampaign, SenderOption},
        contact_model::{Folder, ImportAck},
        template_model::Template,
    },
};

/// Operaciones remotas que usa el orquestador.
#[async_trait]
pub trait CampaignApi: Send + Sync {
    async fn create_list(&self, name: &str, folder_id: i64) -> CampaignResult<i64>;

    /// Siempre con `updateExistingContacts = true`.
    async fn import_contacts(&self, list_id: i64, file_body: &[u8]) -> CampaignResult<ImportAck>;

    /// Fail-soft: lista vacía si el proveedor falla.
    async fn get_templates(&self) -> Vec<Template>;

    /// Cualquier cosa distinta de un 200 con template activo es `false`,
    /// incluido un error de red.
    async fn template_exists(&self, template_id: i64) -> bool;

    async fn activate_template(&self, template_id: i64) -> CampaignResult<()>;

    async fn create_campaign(&self, campaign: &NewCampaign) -> CampaignResult<i64>;

    /// Fail-soft: carpeta "Default" (id 1).
    async fn get_folders(&self) -> Vec<Folder>;

    /// Fail-soft: sólo senders activos, vacío si falla.
    async fn get_senders(&self) -> Vec<SenderOption>;
}

#[derive(Deserialize)]
struct IdResponse {
    id: Option<i64>,
}

#[derive(Deserialize)]
struct ImportResponse {
    #[serde(rename = "processId")]
    process_id: Option<i64>,
}

#[derive(Deserialize)]
struct TemplatesResponse {
    #[serde(default)]
    templates: Vec<Template>,
}

#[derive(Deserialize)]
struct FoldersResponse {
    #[serde(default)]
    folders: Vec<Folder>,
}

#[derive(Deserialize)]
struct SendersResponse {
    #[serde(default)]
    senders: Vec<SenderOption>,
}

#[derive(Clone)]
pub struct BrevoClient {
    http_client: Client,
    api_url: String,
    api_key: String,
}

impl BrevoClient {
    pub fn new(config: &BrevoConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Accept", "application/json")
            .header("api-key", &self.api_key)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.http_client.get(format!("{}{}", self.api_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.http_client.post(format!("{}{}", self.api_url, path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.http_client.put(format!("{}{}", self.api_url, path)))
    }

    /// Convierte una respuesta no exitosa en `RemoteRejection` con el body crudo.
    async fn rejection(resp: Response) -> CampaignError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        CampaignError::RemoteRejection { status, body }
    }

    /// Lee el `id` de una respuesta exitosa.
    async fn read_id(resp: Response, what: &str) -> CampaignResult<i64> {
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        serde_json::from_str::<IdResponse>(&body)
            .ok()
            .and_then(|r| r.id)
            .ok_or_else(|| CampaignError::RemoteRejection {
                status,
                body: format!("No {} ID in response: {}", what, body),
            })
    }
}

#[async_trait]
impl CampaignApi for BrevoClient {
    async fn create_list(&self, name: &str, folder_id: i64) -> CampaignResult<i64> {
        log::info!("(create_list) Creando lista '{}' en folder={}", name, folder_id);
        let resp = self
            .post("/contacts/lists")
            .json(&json!({ "name": name, "folderId": folder_id }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = Self::rejection(resp).await;
            log::error!("(create_list) Falló la creación de lista: {}", err);
            return Err(err);
        }

        let list_id = Self::read_id(resp, "list").await?;
        log::info!("(create_list) Lista creada con ID={}", list_id);
        Ok(list_id)
    }

    async fn import_contacts(&self, list_id: i64, file_body: &[u8]) -> CampaignResult<ImportAck> {
        let file_body = std::str::from_utf8(file_body).map_err(|e| {
            CampaignError::validation(format!("Contact file is not valid UTF-8: {e}"))
        })?;
        log::info!(
            "(import_contacts) Importando {} bytes en lista ID={}",
            file_body.len(),
            list_id
        );

        let resp = self
            .post("/contacts/import")
            .json(&json!({
                "listIds": [list_id],
                "fileBody": file_body,
                "updateExistingContacts": true,
                "emailBlacklist": false
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = Self::rejection(resp).await;
            log::error!("(import_contacts) El proveedor rechazó el import: {}", err);
            return Err(err);
        }

        let body = resp.text().await?;
        let process_id = serde_json::from_str::<ImportResponse>(&body)
            .ok()
            .and_then(|r| r.process_id);
        log::info!("(import_contacts) Import aceptado, processId={:?}", process_id);
        Ok(ImportAck { process_id })
    }

    async fn get_templates(&self) -> Vec<Template> {
        let resp = match self.get("/smtp/templates").send().await {
            Ok(r) => r,
            Err(e) => {
                log::error!("(get_templates) Error consultando templates: {}", e);
                return vec![];
            }
        };

        if resp.status() != StatusCode::OK {
            log::error!(
                "(get_templates) Failed to fetch templates. Status code: {}",
                resp.status()
            );
            return vec![];
        }

        match resp.json::<TemplatesResponse>().await {
            Ok(data) => {
                log::info!(
                    "(get_templates) Successfully fetched {} templates",
                    data.templates.len()
                );
                data.templates
            }
            Err(e) => {
                log::error!("(get_templates) Respuesta ilegible: {}", e);
                vec![]
            }
        }
    }

    async fn template_exists(&self, template_id: i64) -> bool {
        let resp = match self
            .get(&format!("/smtp/templates/{}", template_id))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                log::error!(
                    "(template_exists) Error de red validando template {}: {}",
                    template_id,
                    e
                );
                return false;
            }
        };

        if resp.status() != StatusCode::OK {
            log::warn!(
                "(template_exists) Template {} respondió status={}",
                template_id,
                resp.status()
            );
            return false;
        }

        // Un 200 con isActive=false cuenta como "no disponible".
        let active = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("isActive").and_then(|a| a.as_bool()))
            .unwrap_or(true);
        if !active {
            log::info!("(template_exists) Template {} existe pero está inactivo", template_id);
        }
        active
    }

    async fn activate_template(&self, template_id: i64) -> CampaignResult<()> {
        log::info!("(activate_template) Activando template {}", template_id);
        let resp = self
            .put(&format!("/smtp/templates/{}", template_id))
            .json(&json!({ "isActive": true }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = Self::rejection(resp).await;
            log::error!(
                "(activate_template) Failed to activate template {}: {}",
                template_id,
                err
            );
            return Err(err);
        }
        Ok(())
    }

    async fn create_campaign(&self, campaign: &NewCampaign) -> CampaignResult<i64> {
        log::info!(
            "(create_campaign) Scheduling '{}' with Template ID={} para {}",
            campaign.name,
            campaign.template_id,
            campaign.scheduled_at
        );
        let resp = self
            .post("/emailCampaigns")
            .json(&campaign.to_payload())
            .send()
            .await?;

        if resp.status() != StatusCode::CREATED {
            let err = Self::rejection(resp).await;
            log::error!("(create_campaign) Failed to create campaign: {}", err);
            return Err(err);
        }

        let campaign_id = Self::read_id(resp, "campaign").await?;
        log::info!("(create_campaign) Campaña creada con ID={}", campaign_id);
        Ok(campaign_id)
    }

    async fn get_folders(&self) -> Vec<Folder> {
        let fallback = || vec![Folder::default_folder()];
        match self.get("/contacts/folders").send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                match resp.json::<FoldersResponse>().await {
                    Ok(data) if !data.folders.is_empty() => data.folders,
                    Ok(_) => fallback(),
                    Err(e) => {
                        log::error!("(get_folders) Respuesta ilegible: {}", e);
                        fallback()
                    }
                }
            }
            Ok(resp) => {
                log::warn!("(get_folders) status={}, usando folder Default", resp.status());
                fallback()
            }
            Err(e) => {
                log::error!("(get_folders) Error de red: {}", e);
                fallback()
            }
        }
    }

    async fn get_senders(&self) -> Vec<SenderOption> {
        match self.get("/senders").send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                match resp.json::<SendersResponse>().await {
                    Ok(data) => data.senders.into_iter().filter(|s| s.active).collect(),
                    Err(e) => {
                        log::error!("(get_senders) Respuesta ilegible: {}", e);
                        vec![]
                    }
                }
            }
            Ok(resp) => {
                log::warn!("(get_senders) status={}", resp.status());
                vec![]
            }
            Err(e) => {
                log::error!("(get_senders) Error de red: {}", e);
                vec![]
            }
        }
    }
}
