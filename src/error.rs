//! error.rs
//! Taxonomía de errores del dominio (cliente remoto + orquestador).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampaignError {
    /// Fallo de red/conexión hablando con el proveedor. Nunca se reintenta solo.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// El proveedor respondió con un status no exitoso (o un cuerpo inservible).
    #[error("Remote service rejected the request ({status}): {body}")]
    RemoteRejection { status: u16, body: String },

    /// Precondición local incumplida (fecha pasada, sender vacío, template inactivo...)
    #[error("{0}")]
    Validation(String),

    /// Algunas campañas del cadence fallaron mientras otras se programaron.
    #[error("{failed} of {attempted} campaigns failed to schedule")]
    PartialWorkflow { failed: usize, attempted: usize },
}

impl CampaignError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CampaignError::Validation(msg.into())
    }

    /// Transporte caído, 429 o 5xx: vale la pena que el caller reintente.
    /// Rechazos 4xx y errores de validación son permanentes.
    pub fn is_retryable(&self) -> bool {
        match self {
            CampaignError::Transport(_) => true,
            CampaignError::RemoteRejection { status, .. } => *status == 429 || *status >= 500,
            CampaignError::Validation(_) | CampaignError::PartialWorkflow { .. } => false,
        }
    }
}

pub type CampaignResult<T> = Result<T, CampaignError>;
