//! services/workflow_service.rs
//! Orquestador: import -> fechas -> verificación de templates -> programación
//! de las 3 campañas del cadence.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    error::{CampaignError, CampaignResult},
    models::{
        campaign_model::{NewCampaign, ScheduleCampaignRequest, ScheduledCampaign, Sender},
        contact_model::{emails_to_csv, ContactList, ContactSource, ImportAck},
        workflow_model::{WorkflowRequest, WorkflowResult, WorkflowStatus},
    },
    services::{
        brevo_client::CampaignApi, schedule::CadenceSlots, user_list_service::UserListLookup,
    },
};

/// Antelación mínima recomendada al programar a mano.
pub const MIN_SCHEDULE_LEAD_MINUTES: i64 = 15;

/// Reloj inyectable; se consulta justo antes de cada programación.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub list: ContactList,
    pub ack: ImportAck,
    pub message: String,
}

#[derive(Clone)]
pub struct WorkflowService {
    api: Arc<dyn CampaignApi>,
    user_lists: Arc<dyn UserListLookup>,
    default_folder_id: i64,
    clock: Clock,
    /// Único directorio desde el que se aceptan CSV en disco.
    upload_dir: Option<PathBuf>,
}

impl WorkflowService {
    pub fn new(
        api: Arc<dyn CampaignApi>,
        user_lists: Arc<dyn UserListLookup>,
        default_folder_id: i64,
    ) -> Self {
        Self {
            api,
            user_lists,
            default_folder_id,
            clock: Arc::new(Utc::now),
            upload_dir: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Canonicaliza `path` y exige que quede dentro de `upload_dir`.
    async fn resolve_upload_path(&self, path: &Path) -> CampaignResult<PathBuf> {
        let root = self.upload_dir.as_ref().ok_or_else(|| {
            CampaignError::validation("CSV file uploads are disabled (CSV_UPLOAD_DIR not set)")
        })?;
        let root = tokio::fs::canonicalize(root).await.map_err(|e| {
            CampaignError::validation(format!("Invalid upload directory {}: {}", root.display(), e))
        })?;
        let full = tokio::fs::canonicalize(path).await.map_err(|e| {
            CampaignError::validation(format!(
                "Could not read contact file {}: {}",
                path.display(),
                e
            ))
        })?;
        if !full.starts_with(&root) {
            log::warn!(
                "(resolve_upload_path) Ruta fuera del directorio de uploads: {}",
                path.display()
            );
            return Err(CampaignError::validation(
                "Contact file must be inside the upload directory",
            ));
        }
        Ok(full)
    }

    /// Bytes listos para `fileBody`. Los emails se deduplican antes.
    async fn resolve_contacts(&self, source: ContactSource) -> CampaignResult<Vec<u8>> {
        match source {
            ContactSource::Csv(data) => non_empty_csv(data),
            ContactSource::CsvFile(path) => {
                let path = self.resolve_upload_path(&path).await?;
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    CampaignError::validation(format!(
                        "Could not read contact file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                non_empty_csv(data)
            }
            ContactSource::Emails(emails) => emails_to_csv(&emails),
            ContactSource::Category(category) => {
                let emails = self.user_lists.fetch_emails(&category).await?;
                emails_to_csv(&emails)
            }
        }
    }

    /// Crea la lista y le importa los contactos.
    pub async fn import_contacts(
        &self,
        list_name: &str,
        folder_id: Option<i64>,
        source: ContactSource,
    ) -> CampaignResult<ImportOutcome> {
        let list_name = list_name.trim();
        if list_name.is_empty() {
            return Err(CampaignError::validation("List name must not be empty"));
        }
        let folder_id = folder_id.unwrap_or(self.default_folder_id);

        // Primero resolvemos los contactos: así una fuente vacía no deja una lista huérfana.
        let file_body = self.resolve_contacts(source).await?;

        let list_id = self.api.create_list(list_name, folder_id).await?;
        let ack = self.api.import_contacts(list_id, &file_body).await?;

        Ok(ImportOutcome {
            list: ContactList {
                id: list_id,
                name: list_name.to_string(),
                folder_id,
            },
            ack,
            message: format!("Created list '{}' and imported contacts", list_name),
        })
    }

    /// Programa una campaña suelta. Las validaciones locales van antes de
    /// cualquier llamada remota.
    pub async fn schedule_campaign(
        &self,
        req: ScheduleCampaignRequest,
    ) -> CampaignResult<ScheduledCampaign> {
        if req.campaign_name.trim().is_empty() {
            return Err(CampaignError::validation("Campaign name must not be empty"));
        }
        self.schedule_one(
            req.campaign_name.trim(),
            req.template_id,
            req.list_id,
            req.send_at,
            req.sender.as_ref(),
        )
        .await
    }

    async fn schedule_one(
        &self,
        campaign_name: &str,
        template_id: i64,
        list_id: i64,
        send_at: DateTime<Utc>,
        sender: Option<&Sender>,
    ) -> CampaignResult<ScheduledCampaign> {
        let sender = sender
            .ok_or_else(|| CampaignError::validation("Sender name and email must be provided."))?;

        // "now" es el momento de programar, no el de inicio del workflow.
        if send_at <= self.now() {
            return Err(CampaignError::validation(
                "Scheduled date must be in the future.",
            ));
        }

        if !self.api.template_exists(template_id).await {
            return Err(CampaignError::validation(format!(
                "Template ID {} does not exist.",
                template_id
            )));
        }

        let campaign = NewCampaign {
            name: campaign_name.to_string(),
            template_id,
            list_id,
            scheduled_at: send_at,
            sender: sender.clone(),
        };
        let campaign_id = self.api.create_campaign(&campaign).await?;

        Ok(ScheduledCampaign {
            campaign_id,
            scheduled_time: send_at,
            message: format!("Campaign '{}' scheduled successfully", campaign_name),
        })
    }

    /// Corre el workflow completo. Nunca devuelve error: todo queda reflejado
    /// en el `WorkflowResult`.
    pub async fn execute_workflow(&self, req: WorkflowRequest) -> WorkflowResult {
        let mut results = WorkflowResult::new();
        log::info!(
            "(execute_workflow) Iniciando run_id={} lista='{}'",
            results.run_id,
            req.list_name
        );

        // 1) Import: si falla, se corta todo
        results.steps.push("Import contacts".to_string());
        let import = match req.source.into_source() {
            Ok(source) => {
                self.import_contacts(&req.list_name, req.folder_id, source)
                    .await
            }
            Err(e) => Err(e),
        };
        let list_id = match import {
            Ok(outcome) => {
                results.import_summary = Some(outcome.message);
                results.list_id = Some(outcome.list.id);
                outcome.list.id
            }
            Err(e) => {
                let msg = format!("Contact import failed: {}", e);
                results.import_summary = Some(msg.clone());
                return Self::finish(results, WorkflowStatus::Failed(msg));
            }
        };

        // 2) Fechas
        results.steps.push("Compute campaign dates".to_string());
        let slots = match CadenceSlots::compute(self.now(), req.event_end_date) {
            Ok(slots) => slots,
            Err(e) => {
                let msg = format!("Could not compute campaign dates: {}", e);
                return Self::finish(results, WorkflowStatus::Failed(msg));
            }
        };
        let campaigns = slots.campaigns(&req.templates);
        log::info!(
            "(execute_workflow) run_id={} fechas: tuesday={} friday={} post_event={}",
            results.run_id,
            slots.tuesday,
            slots.friday,
            slots.post_event
        );

        // 3) Templates activos antes de programar nada
        results.steps.push("Verify templates".to_string());
        let mut verified: HashSet<i64> = HashSet::new();
        for campaign in &campaigns {
            if verified.contains(&campaign.template_id) {
                continue;
            }
            if !self.api.template_exists(campaign.template_id).await {
                if let Err(e) = self.api.activate_template(campaign.template_id).await {
                    let msg = format!(
                        "Failed to activate template for {}: {}",
                        campaign.kind.campaign_name(),
                        e
                    );
                    return Self::finish(results, WorkflowStatus::Failed(msg));
                }
            }
            verified.insert(campaign.template_id);
        }

        // 4) Programar: un fallo no corta las demás campañas
        for campaign in &campaigns {
            let name = campaign.kind.campaign_name();
            results.steps.push(format!("Schedule {}", name));
            match self
                .schedule_one(
                    name,
                    campaign.template_id,
                    list_id,
                    campaign.send_at,
                    req.sender.as_ref(),
                )
                .await
            {
                Ok(scheduled) => results.actions_taken.push(scheduled.message),
                Err(e) => {
                    log::error!(
                        "(execute_workflow) run_id={} falló '{}': {}",
                        results.run_id,
                        name,
                        e
                    );
                    results
                        .actions_taken
                        .push(format!("Failed to schedule campaign '{}': {}", name, e));
                    results.failed_campaigns.push(name.to_string());
                }
            }
        }

        // 5) Agregado
        Self::finish(results, WorkflowStatus::Success)
    }

    fn finish(mut results: WorkflowResult, status: WorkflowStatus) -> WorkflowResult {
        results.result = status;
        match &results.result {
            WorkflowStatus::Success => log::info!(
                "(execute_workflow) run_id={} terminado, campañas fallidas={}",
                results.run_id,
                results.failed_campaigns.len()
            ),
            other => log::error!("(execute_workflow) run_id={} {}", results.run_id, other),
        }
        results
    }
}

fn non_empty_csv(data: Vec<u8>) -> CampaignResult<Vec<u8>> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CampaignError::validation("Contact file is empty"));
    }
    Ok(data)
}

/// Aviso (no bloqueante) si la campaña sale en menos de 15 minutos.
pub fn lead_time_warning(now: DateTime<Utc>, send_at: DateTime<Utc>) -> Option<String> {
    if send_at < now + Duration::minutes(MIN_SCHEDULE_LEAD_MINUTES) {
        Some(format!(
            "Please schedule the campaign at least {} minutes in the future. Current time: {}",
            MIN_SCHEDULE_LEAD_MINUTES,
            now.format("%Y-%m-%d %H:%M")
        ))
    } else {
        None
    }
}
