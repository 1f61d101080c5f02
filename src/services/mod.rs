//! services/mod.rs
//! Módulo que agrupa los "servicios" o "capas de negocio" de la app.

pub mod brevo_client;
pub mod schedule;
pub mod user_list_service;
pub mod workflow_service;
