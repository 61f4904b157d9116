// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::common::{Purchase, SessionId};
use crate::session::{Dashboard, Trend};

/// Fractional digits used for every decimal column of the report.
const REPORT_SCALE: i64 = 2;

/// One output csv row, flattened from a `Dashboard`.
#[derive(Serialize, Debug, PartialEq)]
pub struct ReportRow {
    pub session: SessionId,
    pub month: String,
    pub total_spend: String,
    pub total_impact: String,
    pub eco_score: u8,
    pub badge: &'static str,
    pub impact_level: &'static str,
    pub streak: u32,
    pub projected_impact: String,
    pub reduction: String,
    pub reduction_percent: String,
    pub reward: Option<&'static str>,
    pub previous_month_impact: String,
    pub trend: Option<String>,
    pub category_impacts: String,
    pub alternatives: String,
    pub tip: &'static str,
}

/// One row of the purchase history csv.
#[derive(Serialize, Debug, PartialEq)]
pub struct HistoryRow {
    pub session: SessionId,
    pub timestamp: String,
    pub month: String,
    pub category: String,
    pub brand: Option<String>,
    pub price: String,
    pub impact: String,
}

impl HistoryRow {
    pub fn new(session: SessionId, purchase: &Purchase) -> Self {
        Self {
            session,
            timestamp: purchase.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            month: purchase.month.to_string(),
            category: purchase.category.to_string(),
            brand: purchase.brand.clone(),
            price: format_decimal(&purchase.price),
            impact: format_decimal(&purchase.impact),
        }
    }
}

fn format_decimal(value: &BigDecimal) -> String {
    value.round(REPORT_SCALE).with_scale(REPORT_SCALE).to_string()
}

impl ReportRow {
    pub fn new(dashboard: &Dashboard, tip: &'static str) -> Self {
        let trend = dashboard.trend.as_ref().map(|trend| match trend {
            Trend::Lower(amount) => format!("lower by {}", format_decimal(amount)),
            Trend::Higher(amount) => format!("higher by {}", format_decimal(amount)),
        });
        let category_impacts = dashboard
            .category_impacts
            .iter()
            .map(|(category, impact)| format!("{}: {}", category, format_decimal(impact)))
            .collect::<Vec<_>>()
            .join("; ");
        let alternatives = dashboard
            .alternatives
            .iter()
            .flat_map(|(_, alternatives)| alternatives.iter().copied())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            session: dashboard.session,
            month: dashboard.month.to_string(),
            total_spend: format_decimal(&dashboard.total_spend),
            total_impact: format_decimal(&dashboard.total_impact),
            eco_score: dashboard.eco_score,
            badge: dashboard.badge,
            impact_level: dashboard.impact_level,
            streak: dashboard.streak,
            projected_impact: format_decimal(&dashboard.projected_impact),
            reduction: format_decimal(&dashboard.reduction),
            reduction_percent: format_decimal(&dashboard.reduction_percent),
            reward: dashboard.reward.map(|reward| reward.label()),
            previous_month_impact: format_decimal(&dashboard.previous_month_impact),
            trend,
            category_impacts,
            alternatives,
            tip,
        }
    }
}
