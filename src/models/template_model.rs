//! models/template_model.rs

use serde::{Deserialize, Serialize};

/// Template remoto (sólo lectura, salvo la activación).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: i64,
    pub name: String,
    #[serde(alias = "isActive", default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}
