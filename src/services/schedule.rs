//! services/schedule.rs
//! Cálculo determinista de las fechas del cadence a partir de "now".

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};

use crate::{
    error::{CampaignError, CampaignResult},
    models::workflow_model::{CadenceCampaign, CadenceKind, CadenceTemplates},
};

pub const WEEKLY_SEND_HOUR: u32 = 9;
pub const POST_EVENT_SEND_HOUR: u32 = 10;
pub const POST_EVENT_DELAY_DAYS: u64 = 2;

/// `(target - today + 7) % 7` con lunes = 0. Da 0 si hoy ya es el día buscado.
pub fn days_until(today: Weekday, target: Weekday) -> i64 {
    let today = today.num_days_from_monday() as i64;
    let target = target.num_days_from_monday() as i64;
    (target - today + 7) % 7
}

fn at_hour(date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    date.and_hms_opt(hour, 0, 0).map(|dt| dt.and_utc())
}

/// Próximo `target` (hoy incluido) a la hora indicada. No garantiza que quede
/// en el futuro: si hoy es `target` y ya pasó la hora, queda en el pasado.
/// `None` sólo si la fecha se sale del rango de chrono.
pub fn next_weekday_at(now: DateTime<Utc>, target: Weekday, hour: u32) -> Option<DateTime<Utc>> {
    let offset = days_until(now.weekday(), target) as u64;
    let date = now.date_naive().checked_add_days(Days::new(offset))?;
    at_hour(date, hour)
}

/// Fin del evento + 2 días a las 10:00. `None` si la fecha desborda.
pub fn post_event_slot(event_end: NaiveDate) -> Option<DateTime<Utc>> {
    let date = event_end.checked_add_days(Days::new(POST_EVENT_DELAY_DAYS))?;
    at_hour(date, POST_EVENT_SEND_HOUR)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceSlots {
    pub tuesday: DateTime<Utc>,
    pub friday: DateTime<Utc>,
    pub post_event: DateTime<Utc>,
}

impl CadenceSlots {
    /// La fecha de fin viene del request: cualquier desborde es un error de
    /// validación, nunca un panic.
    pub fn compute(now: DateTime<Utc>, event_end: NaiveDate) -> CampaignResult<Self> {
        let weekly = |target: Weekday| {
            next_weekday_at(now, target, WEEKLY_SEND_HOUR).ok_or_else(|| {
                CampaignError::validation(format!("Cannot compute next {:?} from {}", target, now))
            })
        };
        let post_event = post_event_slot(event_end).ok_or_else(|| {
            CampaignError::validation(format!("Event end date {} is out of range", event_end))
        })?;

        Ok(Self {
            tuesday: weekly(Weekday::Tue)?,
            friday: weekly(Weekday::Fri)?,
            post_event,
        })
    }

    pub fn for_kind(&self, kind: CadenceKind) -> DateTime<Utc> {
        match kind {
            CadenceKind::TuesdayInvitation => self.tuesday,
            CadenceKind::FridayReminder => self.friday,
            CadenceKind::PostEventSurvey => self.post_event,
        }
    }

    /// Campañas en orden fijo: Tuesday -> Friday -> Post-Event.
    pub fn campaigns(&self, templates: &CadenceTemplates) -> Vec<CadenceCampaign> {
        CadenceKind::ALL
            .iter()
            .map(|kind| CadenceCampaign {
                kind: *kind,
                template_id: templates.for_kind(*kind),
                send_at: self.for_kind(*kind),
            })
            .collect()
    }
}
