//! config/mod.rs
pub mod brevo_config;
