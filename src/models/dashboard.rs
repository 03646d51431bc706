// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

// Uma linha do "funil": quantos leads e quanto dinheiro em cada etapa
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageMetrics {
    pub stage_id: String,
    pub name: String,
    pub order: i32,
    pub count: usize,
    pub value: Decimal,
    pub percentage: Decimal, // % do total de leads (0 se não há leads)
}

// Os cards do topo do dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_leads: usize,
    pub won_leads: usize,
    pub lost_leads: usize,
    pub active_leads: usize,

    pub pipeline_value: Decimal,
    pub conversion_rate: Decimal,
    pub avg_deal_size: Decimal,

    pub hot_leads: usize,
    pub cold_leads: usize,
    pub follow_up_today: usize,
    pub overdue_follow_ups: usize,

    pub connected_integrations: usize,
    pub stages: Vec<StageMetrics>,
}
