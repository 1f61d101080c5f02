//! tests/mod.rs
//! Pruebas del servicio. Se compilan sólo con `cargo test`.

mod workflow_tests;
