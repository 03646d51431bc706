// src/lib.rs

// Modelo de estado do funil de vendas (leads, etapas, conversas, métricas).
// Tudo em memória; o `main` só monta o estado com os dados de demonstração.

pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

pub use common::error::AppError;
pub use config::{AppConfig, AppState};
