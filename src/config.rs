// src/config.rs

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};
use std::env;

use crate::{
    common::error::AppError,
    db::{seed, AccountRepository, LeadRepository},
    models::{crm::Currency, dashboard::DashboardSummary, settings::Language},
    services::{CrmService, DashboardService},
};

// Configuração lida do ambiente (.env opcional)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub account_name: Option<String>,
    pub currency: Currency,
    pub language: Language,
    pub timezone: String,
    pub utc_offset: FixedOffset,
    pub hot_lead_hours: i64,
    pub cold_lead_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            account_name: None,
            currency: Currency::Brl,
            language: Language::Pt,
            timezone: "America/Sao_Paulo".to_string(),
            // São Paulo não tem horário de verão desde 2019
            utc_offset: FixedOffset::west_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
            hot_lead_hours: 24,
            cold_lead_hours: 72,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Mesmo parse do `from_env`, mas com a fonte de variáveis injetada (útil nos testes).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let currency = match lookup("CRM_CURRENCY") {
            Some(raw) => parse_enum::<Currency>("CRM_CURRENCY", &raw.to_uppercase())?,
            None => defaults.currency,
        };
        let language = match lookup("CRM_LANGUAGE") {
            Some(raw) => parse_enum::<Language>("CRM_LANGUAGE", &raw.to_lowercase())?,
            None => defaults.language,
        };
        let utc_offset = match lookup("CRM_UTC_OFFSET") {
            Some(raw) => raw
                .trim()
                .parse::<FixedOffset>()
                .map_err(|e| AppError::Config(format!("CRM_UTC_OFFSET='{}': {}", raw, e)))?,
            None => defaults.utc_offset,
        };
        let hot_lead_hours = parse_hours(&lookup, "CRM_HOT_LEAD_HOURS", defaults.hot_lead_hours)?;
        let cold_lead_hours = parse_hours(&lookup, "CRM_COLD_LEAD_HOURS", defaults.cold_lead_hours)?;

        let config = Self {
            account_name: lookup("CRM_ACCOUNT_NAME").filter(|s| !s.trim().is_empty()),
            currency,
            language,
            timezone: lookup("CRM_TIMEZONE").unwrap_or(defaults.timezone),
            utc_offset,
            hot_lead_hours,
            cold_lead_hours,
        };
        config.lead_windows()?;
        Ok(config)
    }

    /// Janelas (quente, frio) já como duração.
    /// Quente precisa caber dentro do frio, senão um lead seria as duas coisas.
    pub fn lead_windows(&self) -> Result<(TimeDelta, TimeDelta), AppError> {
        let hot = hours_window("CRM_HOT_LEAD_HOURS", self.hot_lead_hours)?;
        let cold = hours_window("CRM_COLD_LEAD_HOURS", self.cold_lead_hours)?;
        if hot > cold {
            return Err(AppError::Config(format!(
                "CRM_HOT_LEAD_HOURS ({}) não pode passar de CRM_COLD_LEAD_HOURS ({})",
                self.hot_lead_hours, self.cold_lead_hours
            )));
        }
        Ok((hot, cold))
    }
}

fn hours_window(key: &str, hours: i64) -> Result<TimeDelta, AppError> {
    if hours <= 0 {
        return Err(AppError::Config(format!("{}={} deve ser positivo", key, hours)));
    }
    TimeDelta::try_hours(hours)
        .ok_or_else(|| AppError::Config(format!("{}={} fora do intervalo suportado", key, hours)))
}

fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|_| AppError::Config(format!("{}='{}' não é um valor aceito", key, raw)))
}

fn parse_hours<F>(lookup: &F, key: &str, default: i64) -> Result<i64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(hours) if hours > 0 => Ok(hours),
            _ => Err(AppError::Config(format!("{}='{}' deve ser um inteiro positivo", key, raw))),
        },
        None => Ok(default),
    }
}

// O estado da aplicação: criado explicitamente no `main` (ou no teste) e
// passado por referência. Não existe store global.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub crm_service: CrmService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Monta o estado a partir dos dados de demonstração.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        Ok(Self::with_seed(config, seed::demo(Utc::now()))?)
    }

    pub fn with_seed(config: AppConfig, seed: seed::SeedData) -> Result<Self, AppError> {
        let seed::SeedData {
            mut account,
            users,
            leads,
        } = seed;

        let (hot_window, cold_window) = config.lead_windows()?;

        if let Some(name) = &config.account_name {
            account.name = name.clone();
        }
        account.settings.currency = config.currency;
        account.settings.language = config.language;
        account.settings.timezone = config.timezone.clone();

        // --- Monta o gráfico de dependências ---
        let account_repo = AccountRepository::new(account, users)?;
        let lead_repo = LeadRepository::new(leads);
        let crm_service = CrmService::new(lead_repo, account_repo);
        let dashboard_service =
            DashboardService::new(hot_window, cold_window, config.utc_offset);

        tracing::info!(
            "✅ Estado montado: conta '{}', {} leads, {} etapas",
            crm_service.account().name,
            crm_service.lead_count(),
            crm_service.pipeline_stages().len()
        );

        Ok(Self {
            config,
            crm_service,
            dashboard_service,
        })
    }

    pub fn summary(&self, now: DateTime<Utc>) -> DashboardSummary {
        self.dashboard_service.summary(
            self.crm_service.list_leads(),
            self.crm_service.pipeline_stages(),
            self.crm_service.integrations(),
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.utc_offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CRM_CURRENCY", "usd"),
            ("CRM_LANGUAGE", "EN"),
            ("CRM_UTC_OFFSET", "+01:00"),
            ("CRM_HOT_LEAD_HOURS", "12"),
            ("CRM_ACCOUNT_NAME", "Loja Teste"),
        ]))
        .unwrap();

        assert_eq!(config.currency, Currency::Usd);
        assert_eq!(config.language, Language::En);
        assert_eq!(config.utc_offset.local_minus_utc(), 3600);
        assert_eq!(config.hot_lead_hours, 12);
        assert_eq!(config.cold_lead_hours, 72);
        assert_eq!(config.account_name.as_deref(), Some("Loja Teste"));
    }

    #[test]
    fn rejects_bad_values() {
        for pairs in [
            [("CRM_CURRENCY", "JPY")],
            [("CRM_UTC_OFFSET", "meio-dia")],
            [("CRM_COLD_LEAD_HOURS", "0")],
            [("CRM_HOT_LEAD_HOURS", "9000000000000")],
            [("CRM_HOT_LEAD_HOURS", "200")],
        ] {
            let result = AppConfig::from_lookup(lookup_from(&pairs));
            assert!(matches!(result, Err(AppError::Config(_))), "{pairs:?}");
        }
    }

    #[test]
    fn state_rejects_hour_windows_out_of_range_or_overlapping() {
        let huge = AppConfig {
            hot_lead_hours: 9_000_000_000_000,
            ..AppConfig::default()
        };
        let overlapping = AppConfig {
            hot_lead_hours: 200,
            ..AppConfig::default()
        };

        for config in [huge, overlapping] {
            let result = AppState::with_seed(config, seed::demo(Utc::now()));
            assert!(matches!(result, Err(AppError::Config(_))));
        }
    }

    #[test]
    fn equal_windows_keep_hot_and_cold_disjoint() {
        let config = AppConfig {
            hot_lead_hours: 72,
            cold_lead_hours: 72,
            ..AppConfig::default()
        };
        let state = AppState::with_seed(config, seed::demo(Utc::now())).unwrap();
        let now = Utc::now();
        let leads = state.crm_service.list_leads();

        assert!(leads.iter().all(|l| !(state.dashboard_service.is_hot(l, now)
            && state.dashboard_service.is_cold(l, now))));
    }

    #[test]
    fn state_applies_config_to_account() {
        let config = AppConfig {
            account_name: Some("Outra Conta".into()),
            currency: Currency::Eur,
            ..AppConfig::default()
        };
        let state = AppState::with_seed(config, seed::demo(Utc::now())).unwrap();

        assert_eq!(state.crm_service.account().name, "Outra Conta");
        assert_eq!(state.crm_service.account().settings.currency, Currency::Eur);
        assert_eq!(state.summary(Utc::now()).total_leads, 5);
    }
}
