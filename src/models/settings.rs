// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    conversation::ContactChannel,
    crm::{Currency, CustomField},
    metadata::Metadata,
    pipeline::PipelineStage,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
    Es,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    Connected,
    Disconnected,
    Error,
}

// ---
// Integração de canal (WhatsApp Business, Instagram, telefonia...)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel: ContactChannel,
    pub status: IntegrationStatus,
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub config: Metadata,
}

impl Integration {
    pub fn is_connected(&self) -> bool {
        self.status == IntegrationStatus::Connected
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    pub currency: Currency,
    pub timezone: String,   // Ex: "America/Sao_Paulo"
    pub language: Language,
    pub date_format: String, // Ex: "DD/MM/YYYY"
}

// ---
// Conta (o "tenant"). Uma por instância.
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub pipeline: Vec<PipelineStage>,
    pub custom_fields: Vec<CustomField>,
    pub integrations: Vec<Integration>,
    pub settings: AccountSettings,
}
