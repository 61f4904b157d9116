// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;
use log::debug;

use crate::common::{Category, MonthKey, Purchase, SessionId};
use crate::config::ImpactConfig;
use crate::impact::{
    assign_badge, calculate_impact, category_impact_summary, eco_score, impact_category,
    monthly_totals, projected_green_impact, reduction_percent, reward_tier, suggest_alternatives,
    RewardTier,
};

/// Direction of this month's impact compared with the previous month.
#[derive(Debug, Clone, PartialEq)]
pub enum Trend {
    Lower(BigDecimal),
    Higher(BigDecimal),
}

/// Everything shown for one session and month.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub session: SessionId,
    pub month: MonthKey,
    pub total_spend: BigDecimal,
    pub total_impact: BigDecimal,
    pub eco_score: u8,
    pub badge: &'static str,
    pub impact_level: &'static str,
    pub streak: u32,
    pub adoption_percentage: u8,
    pub projected_impact: BigDecimal,
    pub reduction: BigDecimal,
    pub reduction_percent: BigDecimal,
    pub reward: Option<RewardTier>,
    pub previous_month_impact: BigDecimal,
    pub trend: Option<Trend>,
    pub category_impacts: BTreeMap<Category, BigDecimal>,
    /// Greener alternatives for every category the session bought from.
    pub alternatives: Vec<(Category, &'static [&'static str])>,
    /// Every purchase of the session, newest first.
    pub history: Vec<Purchase>,
}

/// Holds the purchase log and streak of a single session.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session: SessionId,
    purchases: Vec<Purchase>,
    streak: u32,
}

impl SessionState {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    /// Purchases in the order they were recorded.
    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Appends a purchase priced with the current `config` and moves the streak: up one for a
    /// second-hand purchase, down one (not below zero) for anything else.
    pub fn record_purchase(
        &mut self,
        config: &ImpactConfig,
        category: Category,
        brand: Option<String>,
        price: BigDecimal,
        now: NaiveDateTime,
    ) -> &Purchase {
        let impact = calculate_impact(config, &category, &price);
        self.streak = if category == Category::SecondHand {
            self.streak + 1
        } else {
            self.streak.saturating_sub(1)
        };
        debug!(
            "Session {} recorded {} for {} (impact {}), streak now {}",
            self.session, category, price, impact, self.streak
        );
        self.purchases.push(Purchase {
            category,
            brand,
            price,
            impact,
            timestamp: now,
            month: MonthKey::of(&now),
        });
        &self.purchases[self.purchases.len() - 1]
    }

    /// Purchases newest first. Purchases with the same timestamp list the later-recorded one
    /// first.
    pub fn history(&self) -> Vec<&Purchase> {
        let mut history: Vec<&Purchase> = self.purchases.iter().rev().collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history
    }

    pub fn monthly_totals(&self, month: MonthKey) -> (BigDecimal, BigDecimal) {
        monthly_totals(&self.purchases, month)
    }

    pub fn category_impacts(&self) -> BTreeMap<Category, BigDecimal> {
        category_impact_summary(&self.purchases)
    }

    /// Builds the dashboard for `month` with `adoption_percentage` (0 to 100) of spend moved to
    /// greener alternatives.
    pub fn dashboard(
        &self,
        config: &ImpactConfig,
        month: MonthKey,
        adoption_percentage: u8,
    ) -> Dashboard {
        let (total_spend, total_impact) = self.monthly_totals(month);
        let (_, previous_month_impact) = self.monthly_totals(month.previous());

        let adoption_rate = BigDecimal::from(adoption_percentage) / BigDecimal::from(100);
        let projected_impact = projected_green_impact(config, &total_impact, &adoption_rate);
        let reduction = &total_impact - &projected_impact;
        let reduction_percent = reduction_percent(&total_impact, &projected_impact);

        let trend = if previous_month_impact > BigDecimal::zero() {
            let delta = &total_impact - &previous_month_impact;
            if delta < BigDecimal::zero() {
                Some(Trend::Lower(delta.abs().round(2)))
            } else {
                Some(Trend::Higher(delta.round(2)))
            }
        } else {
            None
        };

        let category_impacts = self.category_impacts();
        let alternatives = category_impacts
            .keys()
            .map(|category| (category.clone(), suggest_alternatives(category)))
            .filter(|(_, alternatives)| !alternatives.is_empty())
            .collect();

        Dashboard {
            session: self.session,
            month,
            eco_score: eco_score(config, &total_impact),
            badge: assign_badge(config, &total_impact),
            impact_level: impact_category(config, &total_impact),
            streak: self.streak,
            adoption_percentage,
            reward: reward_tier(config, &reduction_percent),
            history: self.history().into_iter().cloned().collect(),
            total_spend,
            total_impact,
            projected_impact,
            reduction,
            reduction_percent,
            previous_month_impact,
            trend,
            category_impacts,
            alternatives,
        }
    }
}
