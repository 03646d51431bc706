//src/main.rs

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use pipeline_crm::{AppConfig, AppState};

fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG manda; padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env()?;
    let state = AppState::new(config)?;

    let summary = state.summary(Utc::now());
    let currency = serde_json::to_value(state.crm_service.account().settings.currency)?;
    let currency = currency.as_str().unwrap_or_default();

    for stage in &summary.stages {
        tracing::info!(
            "📊 {:<14} {:>2} leads | {} {} | {}%",
            stage.name,
            stage.count,
            currency,
            stage.value,
            stage.percentage
        );
    }

    tracing::info!(
        "🚀 Funil: {} leads, valor total {}, conversão {}%, {} quentes, {} frios, {} follow-ups atrasados",
        summary.total_leads,
        summary.pipeline_value,
        summary.conversion_rate,
        summary.hot_leads,
        summary.cold_leads,
        summary.overdue_follow_ups
    );
    tracing::debug!("Resumo completo: {}", serde_json::to_string(&summary)?);

    Ok(())
}
