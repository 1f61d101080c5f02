//! models/workflow_model.rs
//! Entrada y resultado del workflow completo (import + 3 campañas).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::CampaignError;
use crate::models::{campaign_model::Sender, contact_model::ContactSourceInput};

pub const WORKFLOW_SUCCESS: &str = "Complete workflow executed successfully";

/// Las tres campañas fijas del cadence, en orden de programación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceKind {
    TuesdayInvitation,
    FridayReminder,
    PostEventSurvey,
}

impl CadenceKind {
    pub const ALL: [CadenceKind; 3] = [
        CadenceKind::TuesdayInvitation,
        CadenceKind::FridayReminder,
        CadenceKind::PostEventSurvey,
    ];

    pub fn campaign_name(&self) -> &'static str {
        match self {
            CadenceKind::TuesdayInvitation => "Tuesday Invitation",
            CadenceKind::FridayReminder => "Friday Reminder",
            CadenceKind::PostEventSurvey => "Post-Event Survey",
        }
    }
}

/// Template elegido por el usuario para cada campaña.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct CadenceTemplates {
    pub tuesday: i64,
    pub friday: i64,
    pub post_event: i64,
}

impl CadenceTemplates {
    pub fn for_kind(&self, kind: CadenceKind) -> i64 {
        match kind {
            CadenceKind::TuesdayInvitation => self.tuesday,
            CadenceKind::FridayReminder => self.friday,
            CadenceKind::PostEventSurvey => self.post_event,
        }
    }
}

/// Una campaña del cadence ya con su fecha calculada.
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceCampaign {
    pub kind: CadenceKind,
    pub template_id: i64,
    pub send_at: DateTime<Utc>,
}

/// Payload de POST /api/workflow/execute
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRequest {
    pub list_name: String,
    pub folder_id: Option<i64>,
    #[serde(flatten)]
    pub source: ContactSourceInput,
    pub templates: CadenceTemplates,
    pub sender: Option<Sender>,
    pub event_end_date: NaiveDate,
}

/// Estado terminal del workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowStatus {
    Pending,
    Success,
    Failed(String),
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Pending => write!(f, "Workflow pending"),
            WorkflowStatus::Success => write!(f, "{}", WORKFLOW_SUCCESS),
            WorkflowStatus::Failed(msg) => write!(f, "Workflow failed: {}", msg),
        }
    }
}

impl Serialize for WorkflowStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reporte efímero de una corrida. Se devuelve al caller y se descarta.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub run_id: Uuid,
    pub task_understanding: String,
    pub steps: Vec<String>,
    /// Resultado del import (no cuenta como acción de programación).
    pub import_summary: Option<String>,
    /// Un mensaje por campaña intentada, en orden.
    pub actions_taken: Vec<String>,
    /// Nombres de las campañas cuya programación falló.
    pub failed_campaigns: Vec<String>,
    pub list_id: Option<i64>,
    pub result: WorkflowStatus,
}

impl WorkflowResult {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            task_understanding: "Execute complete email campaign workflow".to_string(),
            steps: vec![],
            import_summary: None,
            actions_taken: vec![],
            failed_campaigns: vec![],
            list_id: None,
            result: WorkflowStatus::Pending,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == WorkflowStatus::Success
    }

    /// Fallos por campaña: no afectan `result`, sólo se informan aparte.
    pub fn partial_failure(&self) -> Option<CampaignError> {
        if self.failed_campaigns.is_empty() {
            None
        } else {
            Some(CampaignError::PartialWorkflow {
                failed: self.failed_campaigns.len(),
                attempted: self.actions_taken.len(),
            })
        }
    }
}

impl Default for WorkflowResult {
    fn default() -> Self {
        Self::new()
    }
}
