//! services/user_list_service.rs
//! Cliente del servicio externo de "user retention": devuelve los emails
//! asociados a una categoría.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{CampaignError, CampaignResult};

#[async_trait]
pub trait UserListLookup: Send + Sync {
    async fn fetch_emails(&self, category: &str) -> CampaignResult<Vec<String>>;
}

#[derive(Deserialize)]
struct EmailsResponse {
    #[serde(default)]
    emails: Vec<String>,
}

#[derive(Clone)]
pub struct UserListService {
    http_client: Client,
    base_url: Option<String>,
}

impl UserListService {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl UserListLookup for UserListService {
    async fn fetch_emails(&self, category: &str) -> CampaignResult<Vec<String>> {
        let base_url = self.base_url.as_ref().ok_or_else(|| {
            CampaignError::validation("USER_LIST_API_URL is not configured")
        })?;
        let url = format!("{}?category={}", base_url, urlencoding::encode(category));
        log::info!("(fetch_emails) Consultando usuarios de categoría '{}'", category);

        let resp = self.http_client.get(&url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            log::error!("(fetch_emails) status={} body='{}'", status, body);
            return Err(CampaignError::RemoteRejection { status, body });
        }

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let data = serde_json::from_str::<EmailsResponse>(&body).map_err(|e| {
            CampaignError::RemoteRejection {
                status,
                body: format!("Invalid user list response ({e}): {body}"),
            }
        })?;
        log::info!(
            "(fetch_emails) {} emails recibidos para '{}'",
            data.emails.len(),
            category
        );
        Ok(data.emails)
    }
}
