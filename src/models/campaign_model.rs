//! models/campaign_model.rs
//! Sender, payload de campaña y request/response de programación.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};

/// Remitente verificado. Se valida al construirse (nombre y email no vacíos).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSender")]
pub struct Sender {
    name: String,
    email: String,
}

#[derive(Deserialize)]
struct RawSender {
    name: String,
    email: String,
}

impl TryFrom<RawSender> for Sender {
    type Error = CampaignError;

    fn try_from(raw: RawSender) -> CampaignResult<Self> {
        Sender::new(raw.name, raw.email)
    }
}

impl Sender {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> CampaignResult<Self> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();
        if name.is_empty() || email.is_empty() {
            return Err(CampaignError::validation(
                "Sender name and email must be provided.",
            ));
        }
        if !email.contains('@') {
            return Err(CampaignError::validation(format!(
                "Invalid sender email: {}",
                email
            )));
        }
        Ok(Self { name, email })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Sender tal como lo lista GET /senders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderOption {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub active: bool,
}

/// Todo lo necesario para crear una campaña en el proveedor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCampaign {
    pub name: String,
    pub template_id: i64,
    pub list_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub sender: Sender,
}

impl NewCampaign {
    /// Cuerpo JSON para POST /emailCampaigns. El subject es el nombre de la campaña.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "templateId": self.template_id,
            "subject": self.name,
            "sender": {
                "name": self.sender.name(),
                "email": self.sender.email()
            },
            "recipients": {
                "listIds": [self.list_id]
            },
            "scheduledAt": self.scheduled_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        })
    }
}

/// Payload de POST /api/campaigns/schedule
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleCampaignRequest {
    pub campaign_name: String,
    pub template_id: i64,
    pub list_id: i64,
    pub send_at: DateTime<Utc>,
    pub sender: Option<Sender>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledCampaign {
    pub campaign_id: i64,
    pub scheduled_time: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleCampaignResponse {
    pub success: bool,
    #[serde(flatten)]
    pub campaign: ScheduledCampaign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
