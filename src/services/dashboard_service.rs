// src/services/dashboard_service.rs

// Métricas derivadas. Tudo puro: recebe a fatia de leads e recalcula do zero
// a cada chamada, sem cache.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, Utc};
use rust_decimal::Decimal;

use crate::models::{
    crm::Lead,
    dashboard::{DashboardSummary, StageMetrics},
    pipeline::PipelineStage,
    settings::Integration,
};

#[derive(Debug, Clone, Copy)]
pub struct DashboardService {
    hot_window: Duration,
    cold_after: Duration,
    // Fuso da conta, usado para achar o "hoje" dos follow-ups
    utc_offset: FixedOffset,
}

impl Default for DashboardService {
    fn default() -> Self {
        Self::new(Duration::hours(24), Duration::hours(72), Utc.fix())
    }
}

impl DashboardService {
    pub fn new(hot_window: Duration, cold_after: Duration, utc_offset: FixedOffset) -> Self {
        Self {
            hot_window,
            cold_after,
            utc_offset,
        }
    }

    // =========================================================================
    //  1. GANHOS / PERDIDOS
    // =========================================================================

    pub fn won_leads<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        leads.iter().filter(|l| l.stage.is_won()).collect()
    }

    /// % de leads ganhos sobre o total. 0 quando não há leads.
    pub fn conversion_rate(&self, leads: &[Lead]) -> Decimal {
        let won = self.won_leads(leads).len();
        percentage(won, leads.len())
    }

    /// Ticket médio dos ganhos. 0 quando não há ganhos.
    pub fn average_deal_size(&self, leads: &[Lead]) -> Decimal {
        let won = self.won_leads(leads);
        if won.is_empty() {
            return Decimal::ZERO;
        }
        let total: Decimal = won.iter().map(|l| l.value).sum();
        (total / Decimal::from(won.len())).round_dp(2)
    }

    // =========================================================================
    //  2. TEMPERATURA (pela última interação)
    // =========================================================================

    pub fn is_hot(&self, lead: &Lead, now: DateTime<Utc>) -> bool {
        match lead.last_interaction {
            Some(at) if !lead.stage.is_terminal() => now - at < self.hot_window,
            _ => false,
        }
    }

    pub fn is_cold(&self, lead: &Lead, now: DateTime<Utc>) -> bool {
        match lead.last_interaction {
            Some(at) if !lead.stage.is_terminal() => now - at > self.cold_after,
            _ => false,
        }
    }

    pub fn hot_leads<'a>(&self, leads: &'a [Lead], now: DateTime<Utc>) -> Vec<&'a Lead> {
        leads.iter().filter(|l| self.is_hot(l, now)).collect()
    }

    pub fn cold_leads<'a>(&self, leads: &'a [Lead], now: DateTime<Utc>) -> Vec<&'a Lead> {
        leads.iter().filter(|l| self.is_cold(l, now)).collect()
    }

    // =========================================================================
    //  3. FOLLOW-UPS
    // =========================================================================

    /// `[início de hoje, início de amanhã)` no fuso da conta, em UTC.
    pub fn day_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_date = now.with_timezone(&self.utc_offset).date_naive();
        let local_midnight = local_date.and_time(NaiveTime::MIN);
        let offset = Duration::seconds(i64::from(self.utc_offset.local_minus_utc()));

        let today_start =
            DateTime::<Utc>::from_naive_utc_and_offset(local_midnight - offset, Utc);
        (today_start, today_start + Duration::days(1))
    }

    pub fn follow_up_today<'a>(&self, leads: &'a [Lead], now: DateTime<Utc>) -> Vec<&'a Lead> {
        let (today, tomorrow) = self.day_bounds(now);
        leads
            .iter()
            .filter(|l| l.follow_up_date.is_some_and(|d| d >= today && d < tomorrow))
            .collect()
    }

    pub fn overdue_follow_ups<'a>(&self, leads: &'a [Lead], now: DateTime<Utc>) -> Vec<&'a Lead> {
        let (today, _) = self.day_bounds(now);
        leads
            .iter()
            .filter(|l| l.follow_up_date.is_some_and(|d| d < today))
            .collect()
    }

    // =========================================================================
    //  4. FUNIL POR ETAPA + RESUMO
    // =========================================================================

    pub fn stage_breakdown(&self, leads: &[Lead], stages: &[PipelineStage]) -> Vec<StageMetrics> {
        let total = leads.len();
        stages
            .iter()
            .map(|stage| {
                let (count, value) = leads
                    .iter()
                    .filter(|l| l.stage.id == stage.id)
                    .fold((0usize, Decimal::ZERO), |(c, v), l| (c + 1, v + l.value));

                StageMetrics {
                    stage_id: stage.id.clone(),
                    name: stage.name.clone(),
                    order: stage.order,
                    count,
                    value,
                    percentage: percentage(count, total),
                }
            })
            .collect()
    }

    pub fn summary(
        &self,
        leads: &[Lead],
        stages: &[PipelineStage],
        integrations: &[Integration],
        now: DateTime<Utc>,
    ) -> DashboardSummary {
        let won_leads = self.won_leads(leads).len();
        let lost_leads = leads.iter().filter(|l| l.stage.is_lost()).count();
        let active_leads = leads
            .iter()
            .filter(|l| !l.stage.is_terminal())
            .count();

        DashboardSummary {
            total_leads: leads.len(),
            won_leads,
            lost_leads,
            active_leads,
            pipeline_value: leads.iter().map(|l| l.value).sum(),
            conversion_rate: self.conversion_rate(leads),
            avg_deal_size: self.average_deal_size(leads),
            hot_leads: self.hot_leads(leads, now).len(),
            cold_leads: self.cold_leads(leads, now).len(),
            follow_up_today: self.follow_up_today(leads, now).len(),
            overdue_follow_ups: self.overdue_follow_ups(leads, now).len(),
            connected_integrations: integrations.iter().filter(|i| i.is_connected()).count(),
            stages: self.stage_breakdown(leads, stages),
        }
    }
}

// Divisão protegida: nada de NaN quando o total é zero
fn percentage(part: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use crate::models::crm::NewLead;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn lead(value: i64, stage: &PipelineStage, now: DateTime<Utc>) -> Lead {
        NewLead::new("Lead", "lead@teste.com", Decimal::from(value), &stage.id, Uuid::nil())
            .into_lead(Uuid::new_v4(), stage.clone(), now)
    }

    fn stages() -> Vec<PipelineStage> {
        vec![
            PipelineStage::new("new", "Novo Lead", "#1", 1),
            PipelineStage::new("proposal", "Proposta", "#2", 2),
            PipelineStage::new("won", "Ganho", "#3", 3).closed_won(),
            PipelineStage::new("lost", "Perdido", "#4", 4).closed_lost(),
        ]
    }

    #[test]
    fn empty_pipeline_reports_zero_instead_of_nan() {
        let svc = DashboardService::default();
        assert_eq!(svc.conversion_rate(&[]), Decimal::ZERO);
        assert_eq!(svc.average_deal_size(&[]), Decimal::ZERO);

        let breakdown = svc.stage_breakdown(&[], &stages());
        assert!(breakdown.iter().all(|s| s.percentage.is_zero() && s.count == 0));
    }

    #[test]
    fn conversion_and_average_deal_size() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let st = stages();
        let leads = vec![
            lead(1000, &st[0], now),
            lead(4000, &st[2], now),
            lead(6000, &st[2], now),
            lead(9000, &st[3], now),
        ];

        assert_eq!(svc.conversion_rate(&leads), Decimal::from(50));
        assert_eq!(svc.average_deal_size(&leads), Decimal::from(5000));
    }

    #[test]
    fn conversion_rate_rounds_to_two_places() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let st = stages();
        let leads = vec![lead(1, &st[0], now), lead(1, &st[1], now), lead(1, &st[2], now)];

        assert_eq!(svc.conversion_rate(&leads), Decimal::new(3333, 2));
    }

    #[test]
    fn flagged_stage_counts_as_won_even_without_legacy_id() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let closing = PipelineStage::new("closing", "Fechamento", "#5", 4).closed_won();

        assert_eq!(svc.conversion_rate(&[lead(100, &closing, now)]), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn hot_and_cold_by_recency() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let st = stages();

        let mut recent = lead(1, &st[0], now);
        recent.last_interaction = Some(now - Duration::hours(1));
        let mut stale = lead(1, &st[1], now);
        stale.last_interaction = Some(now - Duration::days(4));
        let mut middle = lead(1, &st[1], now);
        middle.last_interaction = Some(now - Duration::hours(48));
        let never = lead(1, &st[0], now);

        assert!(svc.is_hot(&recent, now) && !svc.is_cold(&recent, now));
        assert!(svc.is_cold(&stale, now) && !svc.is_hot(&stale, now));
        assert!(!svc.is_hot(&middle, now) && !svc.is_cold(&middle, now));
        assert!(!svc.is_hot(&never, now) && !svc.is_cold(&never, now));
    }

    #[test]
    fn terminal_stages_are_neither_hot_nor_cold() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let st = stages();

        for terminal in [&st[2], &st[3]] {
            let mut recent = lead(1, terminal, now);
            recent.last_interaction = Some(now - Duration::hours(1));
            let mut stale = lead(1, terminal, now);
            stale.last_interaction = Some(now - Duration::days(4));

            assert!(!svc.is_hot(&recent, now));
            assert!(!svc.is_cold(&stale, now));
        }
    }

    #[test]
    fn follow_ups_use_account_day_bounds() {
        // 02:00 UTC = 23:00 do dia anterior em São Paulo (-03:00)
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let svc = DashboardService::new(Duration::hours(24), Duration::hours(72), offset);
        let now = Utc.with_ymd_and_hms(2024, 6, 11, 2, 0, 0).unwrap();

        let (today, tomorrow) = svc.day_bounds(now);
        assert_eq!(today, Utc.with_ymd_and_hms(2024, 6, 10, 3, 0, 0).unwrap());
        assert_eq!(tomorrow, Utc.with_ymd_and_hms(2024, 6, 11, 3, 0, 0).unwrap());

        let st = stages();
        let mut due_tonight = lead(1, &st[0], now);
        due_tonight.follow_up_date = Some(now + Duration::minutes(30));
        let mut due_tomorrow = lead(1, &st[0], now);
        due_tomorrow.follow_up_date = Some(tomorrow);
        let mut overdue = lead(1, &st[0], now);
        overdue.follow_up_date = Some(today - Duration::seconds(1));
        let leads = vec![due_tonight, due_tomorrow, overdue];

        assert_eq!(svc.follow_up_today(&leads, now).len(), 1);
        assert_eq!(svc.overdue_follow_ups(&leads, now).len(), 1);
        assert_eq!(svc.overdue_follow_ups(&leads, now)[0].follow_up_date, Some(today - Duration::seconds(1)));
    }

    #[test]
    fn breakdown_shares_add_up() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let st = stages();
        let leads = vec![
            lead(15000, &st[0], now),
            lead(8500, &st[1], now),
            lead(25000, &st[1], now),
            lead(1000, &st[2], now),
        ];

        let breakdown = svc.stage_breakdown(&leads, &st);
        assert_eq!(breakdown[1].count, 2);
        assert_eq!(breakdown[1].value, Decimal::from(33500));
        assert_eq!(breakdown[1].percentage, Decimal::from(50));
        assert_eq!(breakdown[3].count, 0);

        let total: Decimal = breakdown.iter().map(|s| s.percentage).sum();
        assert_eq!(total, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn summary_over_demo_data() {
        let svc = DashboardService::default();
        let now = Utc::now();
        let data = seed::demo(now);

        let summary = svc.summary(&data.leads, &data.account.pipeline, &data.account.integrations, now);

        assert_eq!(summary.total_leads, 5);
        assert_eq!(summary.pipeline_value, Decimal::from(63500));
        // "closing" é a etapa de ganho do funil padrão
        assert_eq!(summary.won_leads, 1);
        assert_eq!(summary.conversion_rate, Decimal::from(20));
        assert_eq!(summary.avg_deal_size, Decimal::from(12000));
        assert_eq!(summary.active_leads, 4);
        assert_eq!(summary.cold_leads, 1);
        assert_eq!(summary.overdue_follow_ups, 2);
        assert_eq!(summary.connected_integrations, 2);
        assert_eq!(summary.stages.len(), 4);
    }
}
