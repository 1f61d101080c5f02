//! tests/workflow_tests.rs
//! Pruebas del orquestador contra `FakeCampaignApi`.

#[cfg(test)]
mod tests {
    use actix_rt::test;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::error::CampaignError;
    use crate::models::{
        campaign_model::{ScheduleCampaignRequest, Sender},
        contact_model::{ContactSource, ContactSourceInput},
        workflow_model::{CadenceTemplates, WorkflowRequest, WorkflowStatus, WORKFLOW_SUCCESS},
    };
    use crate::services::workflow_service::{lead_time_warning, Clock, WorkflowService};
    use crate::tests::fake_api::{Call, FakeCampaignApi, FakeUserLists};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // Miércoles 2024-01-03 10:00
    fn wednesday() -> DateTime<Utc> {
        utc(2024, 1, 3, 10, 0)
    }

    fn sender() -> Sender {
        Sender::new("Events Team", "events@example.com").unwrap()
    }

    fn fixed(now: DateTime<Utc>) -> Clock {
        Arc::new(move || now)
    }

    fn service(api: Arc<FakeCampaignApi>) -> WorkflowService {
        WorkflowService::new(api, Arc::new(FakeUserLists::new(&[])), 1)
            .with_clock(fixed(wednesday()))
    }

    fn request() -> WorkflowRequest {
        WorkflowRequest {
            list_name: "Event Participants List".to_string(),
            folder_id: None,
            source: ContactSourceInput {
                emails: Some(vec!["a@example.com".to_string(), "b@example.com".to_string()]),
                ..Default::default()
            },
            templates: CadenceTemplates {
                tuesday: 1,
                friday: 2,
                post_event: 3,
            },
            sender: Some(sender()),
            event_end_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
        }
    }

    #[test]
    async fn test_full_workflow_success() {
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let result = service(api.clone())
            .execute_workflow(request())
            .await;

        assert_eq!(result.result, WorkflowStatus::Success);
        assert_eq!(result.result.to_string(), WORKFLOW_SUCCESS);
        assert_eq!(result.list_id, Some(42));
        assert_eq!(result.actions_taken.len(), 3);
        assert!(result.failed_campaigns.is_empty());
        assert!(result.partial_failure().is_none());
        assert_eq!(
            result.steps,
            vec![
                "Import contacts",
                "Compute campaign dates",
                "Verify templates",
                "Schedule Tuesday Invitation",
                "Schedule Friday Reminder",
                "Schedule Post-Event Survey",
            ]
        );

        let created = api.created_campaigns();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].name, "Tuesday Invitation");
        assert_eq!(created[0].scheduled_at, utc(2024, 1, 9, 9, 0));
        assert_eq!(created[1].name, "Friday Reminder");
        assert_eq!(created[1].scheduled_at, utc(2024, 1, 5, 9, 0));
        assert_eq!(created[2].name, "Post-Event Survey");
        assert_eq!(created[2].scheduled_at, utc(2024, 1, 14, 10, 0));
        assert!(created.iter().all(|c| c.list_id == 42));
        assert!(api.activations().is_empty());
    }

    #[test]
    async fn test_import_uses_created_list_id() {
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        service(api.clone())
            .execute_workflow(request())
            .await;

        let calls = api.calls();
        assert_eq!(
            calls[0],
            Call::CreateList {
                name: "Event Participants List".to_string(),
                folder_id: 1
            }
        );
        match &calls[1] {
            Call::ImportContacts { list_id, body } => {
                assert_eq!(*list_id, 42);
                assert_eq!(body, "EMAIL\na@example.com\nb@example.com\n");
            }
            other => panic!("se esperaba import, llegó {:?}", other),
        }
    }

    #[test]
    async fn test_import_failure_aborts_before_any_campaign() {
        let mut fake = FakeCampaignApi::new(&[1, 2, 3]);
        fake.fail_import = true;
        let api = Arc::new(fake);

        let result = service(api.clone())
            .execute_workflow(request())
            .await;

        assert!(!result.is_success());
        assert!(result.result.to_string().starts_with("Workflow failed: Contact import failed"));
        assert_eq!(result.steps, vec!["Import contacts"]);
        assert!(result.actions_taken.is_empty());
        assert!(api.created_campaigns().is_empty());
        assert!(!api
            .calls()
            .iter()
            .any(|c| matches!(c, Call::TemplateExists(_))));
    }

    #[test]
    async fn test_missing_contact_source_is_fatal() {
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let mut req = request();
        req.source = ContactSourceInput::default();

        let result = service(api.clone())
            .execute_workflow(req)
            .await;

        assert!(!result.is_success());
        assert!(api.calls().is_empty());
    }

    #[test]
    async fn test_inactive_template_is_activated_once_before_scheduling() {
        // El template 2 está inactivo y lo usan dos campañas.
        let api = Arc::new(FakeCampaignApi::new(&[1]));
        let mut req = request();
        req.templates = CadenceTemplates {
            tuesday: 1,
            friday: 2,
            post_event: 2,
        };

        let result = service(api.clone())
            .execute_workflow(req)
            .await;

        assert!(result.is_success());
        assert_eq!(api.activations(), vec![2]);

        let calls = api.calls();
        let activation = calls
            .iter()
            .position(|c| *c == Call::ActivateTemplate(2))
            .unwrap();
        let first_campaign = calls
            .iter()
            .position(|c| matches!(c, Call::CreateCampaign(_)))
            .unwrap();
        assert!(activation < first_campaign);
        assert_eq!(api.created_campaigns().len(), 3);
    }

    #[test]
    async fn test_activation_failure_aborts_whole_workflow() {
        let mut fake = FakeCampaignApi::new(&[1, 3]);
        fake.unactivatable.insert(2);
        let api = Arc::new(fake);

        let result = service(api.clone())
            .execute_workflow(request())
            .await;

        match &result.result {
            WorkflowStatus::Failed(msg) => {
                assert!(msg.contains("Failed to activate template for Friday Reminder"));
            }
            other => panic!("se esperaba fallo, llegó {:?}", other),
        }
        assert!(api.created_campaigns().is_empty());
        assert!(result.actions_taken.is_empty());
    }

    #[test]
    async fn test_one_campaign_failure_does_not_stop_the_others() {
        let mut fake = FakeCampaignApi::new(&[1, 2, 3]);
        fake.rejected_campaigns.insert("Friday Reminder".to_string());
        let api = Arc::new(fake);

        let result = service(api.clone())
            .execute_workflow(request())
            .await;

        // Fallo por campaña: no cambia el estado terminal
        assert!(result.is_success());
        assert_eq!(result.actions_taken.len(), 3);
        assert_eq!(api.created_campaigns().len(), 3);
        assert!(result.actions_taken[0].contains("Tuesday Invitation"));
        assert!(result.actions_taken[1].starts_with("Failed to schedule campaign 'Friday Reminder'"));
        assert!(result.actions_taken[2].contains("scheduled successfully"));
        assert_eq!(result.failed_campaigns, vec!["Friday Reminder"]);
        assert!(matches!(
            result.partial_failure(),
            Some(CampaignError::PartialWorkflow {
                failed: 1,
                attempted: 3
            })
        ));
    }

    #[test]
    async fn test_past_slot_is_rejected_without_remote_call() {
        // Evento ya terminado: el slot post-evento queda en el pasado.
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let mut req = request();
        req.event_end_date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();

        let result = service(api.clone())
            .execute_workflow(req)
            .await;

        assert!(result.is_success());
        assert_eq!(result.actions_taken.len(), 3);
        assert_eq!(
            result.actions_taken[2],
            "Failed to schedule campaign 'Post-Event Survey': Scheduled date must be in the future."
        );
        let created = api.created_campaigns();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|c| c.name != "Post-Event Survey"));
    }

    #[test]
    async fn test_missing_sender_fails_each_campaign_locally() {
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let mut req = request();
        req.sender = None;

        let result = service(api.clone())
            .execute_workflow(req)
            .await;

        assert_eq!(result.failed_campaigns.len(), 3);
        assert!(result
            .actions_taken
            .iter()
            .all(|a| a.ends_with("Sender name and email must be provided.")));
        assert!(api.created_campaigns().is_empty());
    }

    #[test]
    async fn test_schedule_campaign_in_past_makes_no_remote_call() {
        let api = Arc::new(FakeCampaignApi::new(&[1]));
        let now = wednesday();
        let req = ScheduleCampaignRequest {
            campaign_name: "My Campaign".to_string(),
            template_id: 1,
            list_id: 42,
            send_at: now,
            sender: Some(sender()),
        };

        let err = service(api.clone())
            .schedule_campaign(req)
            .await
            .unwrap_err();

        assert!(matches!(err, CampaignError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    async fn test_schedule_campaign_unknown_template() {
        let api = Arc::new(FakeCampaignApi::new(&[]));
        let req = ScheduleCampaignRequest {
            campaign_name: "My Campaign".to_string(),
            template_id: 9,
            list_id: 42,
            send_at: utc(2024, 1, 4, 9, 0),
            sender: Some(sender()),
        };

        let err = service(api.clone())
            .schedule_campaign(req)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Template ID 9 does not exist.");
        assert!(api.created_campaigns().is_empty());
    }

    #[test]
    async fn test_schedule_campaign_success() {
        let api = Arc::new(FakeCampaignApi::new(&[5]));
        let req = ScheduleCampaignRequest {
            campaign_name: "My Campaign".to_string(),
            template_id: 5,
            list_id: 42,
            send_at: utc(2024, 1, 4, 9, 0),
            sender: Some(sender()),
        };

        let scheduled = service(api.clone()).schedule_campaign(req).await.unwrap();

        assert_eq!(scheduled.campaign_id, 101);
        assert_eq!(scheduled.message, "Campaign 'My Campaign' scheduled successfully");
        let created = api.created_campaigns();
        assert_eq!(created[0].sender, sender());
        assert_eq!(created[0].list_id, 42);
    }

    #[test]
    async fn test_category_source_is_resolved_and_deduplicated() {
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let lists = Arc::new(FakeUserLists::new(&[
            "x@example.com",
            "X@Example.com ",
            "y@example.com",
        ]));
        let svc = WorkflowService::new(api.clone(), lists.clone(), 1);

        let outcome = svc
            .import_contacts(
                "Churned",
                Some(8),
                ContactSource::Category("churned users".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(outcome.list.id, 42);
        assert_eq!(outcome.list.folder_id, 8);
        assert_eq!(outcome.message, "Created list 'Churned' and imported contacts");
        assert_eq!(*lists.requested.lock().unwrap(), vec!["churned users"]);
        assert!(api.calls().contains(&Call::ImportContacts {
            list_id: 42,
            body: "EMAIL\nx@example.com\ny@example.com\n".to_string()
        }));
    }

    #[test]
    async fn test_empty_source_creates_no_list() {
        let api = Arc::new(FakeCampaignApi::new(&[]));
        let err = service(api.clone())
            .import_contacts("Empty", None, ContactSource::Emails(vec![" ".to_string()]))
            .await
            .unwrap_err();

        assert!(matches!(err, CampaignError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    async fn test_import_from_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "EMAIL,FIRSTNAME").unwrap();
        writeln!(file, "ana@example.com,Ana").unwrap();

        let api = Arc::new(FakeCampaignApi::new(&[]));
        let outcome = service(api.clone())
            .with_upload_dir(dir.path())
            .import_contacts("From file", None, ContactSource::CsvFile(path))
            .await
            .unwrap();

        assert_eq!(outcome.ack.process_id, Some(7));
        assert!(api.calls().contains(&Call::ImportContacts {
            list_id: 42,
            body: "EMAIL,FIRSTNAME\nana@example.com,Ana\n".to_string()
        }));
    }

    #[test]
    async fn test_missing_csv_file_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(FakeCampaignApi::new(&[]));
        let err = service(api.clone())
            .with_upload_dir(dir.path())
            .import_contacts(
                "Missing",
                None,
                ContactSource::CsvFile(dir.path().join("contacts.csv")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CampaignError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    async fn test_csv_file_outside_upload_dir_is_rejected() {
        let uploads = tempfile::tempdir().unwrap();
        let mut secret = tempfile::NamedTempFile::new().unwrap();
        writeln!(secret, "BREVO_API_KEY=xkeysib-123").unwrap();

        let api = Arc::new(FakeCampaignApi::new(&[]));
        let svc = service(api.clone()).with_upload_dir(uploads.path());

        let err = svc
            .import_contacts(
                "Outside",
                None,
                ContactSource::CsvFile(secret.path().to_path_buf()),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Contact file must be inside the upload directory"
        );

        // "../" tampoco escapa: se canonicaliza antes de comparar.
        let sneaky = uploads
            .path()
            .join("..")
            .join(secret.path().file_name().unwrap());
        let err = svc
            .import_contacts("Outside", None, ContactSource::CsvFile(sneaky))
            .await
            .unwrap_err();
        assert!(matches!(err, CampaignError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    async fn test_csv_file_without_upload_dir_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "EMAIL").unwrap();

        let api = Arc::new(FakeCampaignApi::new(&[]));
        let err = service(api.clone())
            .import_contacts(
                "No uploads",
                None,
                ContactSource::CsvFile(file.path().to_path_buf()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CampaignError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    async fn test_out_of_range_event_date_fails_workflow() {
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let mut req = request();
        req.event_end_date = NaiveDate::MAX;

        let result = service(api.clone()).execute_workflow(req).await;

        match &result.result {
            WorkflowStatus::Failed(msg) => {
                assert!(msg.starts_with("Could not compute campaign dates"));
            }
            other => panic!("se esperaba fallo, llegó {:?}", other),
        }
        assert_eq!(result.steps, vec!["Import contacts", "Compute campaign dates"]);
        assert!(result.actions_taken.is_empty());
        assert!(!api
            .calls()
            .iter()
            .any(|c| matches!(c, Call::TemplateExists(_) | Call::CreateCampaign(_))));
    }

    #[test]
    async fn test_future_check_uses_time_of_scheduling() {
        // Martes 08:59:59 al calcular fechas; 09:00:30 al programar.
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let clock: Clock = Arc::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Utc.with_ymd_and_hms(2024, 1, 2, 8, 59, 59).unwrap()
            } else {
                Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 30).unwrap()
            }
        });
        let api = Arc::new(FakeCampaignApi::new(&[1, 2, 3]));
        let svc = WorkflowService::new(api.clone(), Arc::new(FakeUserLists::new(&[])), 1)
            .with_clock(clock);

        let result = svc.execute_workflow(request()).await;

        assert!(result.is_success());
        assert_eq!(result.failed_campaigns, vec!["Tuesday Invitation"]);
        assert_eq!(
            result.actions_taken[0],
            "Failed to schedule campaign 'Tuesday Invitation': Scheduled date must be in the future."
        );
        let created = api.created_campaigns();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].scheduled_at, utc(2024, 1, 5, 9, 0));
        assert!(ticks.load(Ordering::SeqCst) >= 4);
    }

    #[test]
    async fn test_lead_time_warning() {
        let now = wednesday();
        assert!(lead_time_warning(now, utc(2024, 1, 3, 10, 5)).is_some());
        assert!(lead_time_warning(now, utc(2024, 1, 3, 10, 15)).is_none());
        assert!(lead_time_warning(now, utc(2024, 1, 4, 10, 0)).is_none());
    }
}
