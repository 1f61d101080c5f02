//! models/contact_model.rs
//! Listas de contactos, carpetas y fuentes de contactos para importar.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CampaignError, CampaignResult};

/// Carpeta remota donde se crean las listas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: i64,
    pub name: String,
}

impl Folder {
    /// Carpeta que se usa cuando el proveedor no responde.
    pub fn default_folder() -> Self {
        Folder {
            id: 1,
            name: "Default".to_string(),
        }
    }
}

/// Lista recién creada en el proveedor. Sólo vivimos con su id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactList {
    pub id: i64,
    pub name: String,
    pub folder_id: i64,
}

/// Acuse del import (el proveedor procesa el archivo en background).
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct ImportAck {
    pub process_id: Option<i64>,
}

/// De dónde salen los contactos a importar.
#[derive(Debug, Clone)]
pub enum ContactSource {
    /// Contenido CSV tal cual lo subió el usuario.
    Csv(Vec<u8>),
    /// Archivo temporal en disco con el CSV.
    CsvFile(PathBuf),
    /// Emails ya resueltos (p.e. devueltos por el servicio de retención).
    Emails(Vec<String>),
    /// Categoría a resolver contra el servicio de retención.
    Category(String),
}

/// Quita duplicados (trim + case-insensitive), conserva la primera aparición
/// y descarta entradas vacías.
pub fn dedupe_emails(emails: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    emails
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.to_lowercase()))
        .map(|e| e.to_string())
        .collect()
}

/// Arma el cuerpo CSV (columna EMAIL) que espera el endpoint de import.
pub fn emails_to_csv(emails: &[String]) -> CampaignResult<Vec<u8>> {
    let unique = dedupe_emails(emails);
    if unique.is_empty() {
        return Err(CampaignError::validation("No contacts to import"));
    }
    let mut body = String::from("EMAIL\n");
    body.push_str(&unique.join("\n"));
    body.push('\n');
    Ok(body.into_bytes())
}

/// Payload de POST /api/contacts/import (y parte del workflow).
/// Exactamente una de las fuentes debe venir informada.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSourceInput {
    /// CSV en base64
    #[serde(default)]
    pub csv_base64: Option<String>,
    /// CSV ya guardado en el directorio de uploads del servidor. Fuera de
    /// ese directorio se rechaza.
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub emails: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ContactSourceInput {
    pub fn into_source(self) -> CampaignResult<ContactSource> {
        let given = [
            self.csv_base64.is_some(),
            self.csv_path.is_some(),
            self.emails.is_some(),
            self.category.is_some(),
        ]
        .iter()
        .filter(|g| **g)
        .count();
        if given == 0 {
            return Err(CampaignError::validation(
                "One of csv_base64, csv_path, emails or category is required",
            ));
        }
        if given > 1 {
            return Err(CampaignError::validation(
                "Only one of csv_base64, csv_path, emails or category may be given",
            ));
        }

        if let Some(b64) = self.csv_base64 {
            let data = base64::decode(b64.trim())
                .map_err(|e| CampaignError::validation(format!("Invalid csv_base64: {e}")))?;
            return Ok(ContactSource::Csv(data));
        }
        if let Some(path) = self.csv_path {
            return Ok(ContactSource::CsvFile(path));
        }
        if let Some(emails) = self.emails {
            return Ok(ContactSource::Emails(emails));
        }
        match self.category.map(|c| c.trim().to_string()) {
            Some(category) if !category.is_empty() => Ok(ContactSource::Category(category)),
            _ => Err(CampaignError::validation("Category must not be empty")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportContactsRequest {
    pub list_name: String,
    pub folder_id: Option<i64>,
    #[serde(flatten)]
    pub source: ContactSourceInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportContactsResponse {
    pub success: bool,
    pub list_id: i64,
    pub message: String,
}
