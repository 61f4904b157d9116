// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use rand::Rng;

use crate::common::{Category, MonthKey, Purchase};
use crate::config::ImpactConfig;

/// Highest (and starting) eco score.
const MAX_ECO_SCORE: u8 = 100;

pub const ECO_TIPS: [&str; 4] = [
    "Buying second-hand can reduce emissions by more than 80%.",
    "Local products minimize transport-related CO₂.",
    "Repairing instead of replacing extends product life.",
    "Minimal packaging significantly reduces waste.",
];

/// Three-way classification of an aggregate impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImpactTier {
    Low,
    Medium,
    High,
}

impl ImpactTier {
    pub fn classify(config: &ImpactConfig, total_impact: &BigDecimal) -> Self {
        let thresholds = &config.tier_thresholds;
        if total_impact < &thresholds.low {
            ImpactTier::Low
        } else if total_impact < &thresholds.high {
            ImpactTier::Medium
        } else {
            ImpactTier::High
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            ImpactTier::Low => "Eco Saver",
            ImpactTier::Medium => "Conscious Shopper",
            ImpactTier::High => "High Impact Month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImpactTier::Low => "Low Impact",
            ImpactTier::Medium => "Medium Impact",
            ImpactTier::High => "High Impact",
        }
    }
}

/// Reward earned by the projected green transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTier {
    GreenChampion,
    EcoImprover,
    FirstGreenStep,
}

impl RewardTier {
    pub fn label(&self) -> &'static str {
        match self {
            RewardTier::GreenChampion => "Green Champion",
            RewardTier::EcoImprover => "Eco Improver",
            RewardTier::FirstGreenStep => "First Green Step",
        }
    }
}

pub fn calculate_impact(
    config: &ImpactConfig,
    category: &Category,
    price: &BigDecimal,
) -> BigDecimal {
    price * config.multiplier(category)
}

/// Sums `(price, impact)` over the purchases that fall in `month`.
pub fn monthly_totals<'a>(
    purchases: impl IntoIterator<Item = &'a Purchase>,
    month: MonthKey,
) -> (BigDecimal, BigDecimal) {
    purchases
        .into_iter()
        .filter(|purchase| purchase.month == month)
        .fold(
            (BigDecimal::zero(), BigDecimal::zero()),
            |(mut spend, mut impact), purchase| {
                spend += &purchase.price;
                impact += &purchase.impact;
                (spend, impact)
            },
        )
}

/// Rounds a non-negative value to a whole number, halves going to the even neighbour.
fn round_half_even(value: &BigDecimal) -> BigDecimal {
    let whole = value.with_scale(0);
    let fraction = value - &whole;
    let half = BigDecimal::new(5.into(), 1);
    let whole_is_odd = whole.to_u64().map_or(false, |whole| whole % 2 == 1);
    if fraction > half || (fraction == half && whole_is_odd) {
        whole + BigDecimal::from(1)
    } else {
        whole
    }
}

/// `clamp(round(100 - total_impact / divisor), 0, 100)`, halves rounding to even.
pub fn eco_score(config: &ImpactConfig, total_impact: &BigDecimal) -> u8 {
    let penalty = total_impact / &config.eco_score_divisor;
    let raw = BigDecimal::from(i64::from(MAX_ECO_SCORE)) - penalty;
    if raw <= BigDecimal::zero() {
        return 0;
    }
    round_half_even(&raw)
        .to_u8()
        .unwrap_or(MAX_ECO_SCORE)
        .min(MAX_ECO_SCORE)
}

pub fn assign_badge(config: &ImpactConfig, total_impact: &BigDecimal) -> &'static str {
    ImpactTier::classify(config, total_impact).badge()
}

pub fn impact_category(config: &ImpactConfig, total_impact: &BigDecimal) -> &'static str {
    ImpactTier::classify(config, total_impact).label()
}

/// Impact left after `adoption_rate` (0 to 1) of spend moves to greener alternatives,
/// rounded to 2 decimals.
pub fn projected_green_impact(
    config: &ImpactConfig,
    current_impact: &BigDecimal,
    adoption_rate: &BigDecimal,
) -> BigDecimal {
    let reduced = current_impact * adoption_rate * &config.reduction_factor;
    (current_impact - reduced).round(2)
}

/// Percent of `current_impact` removed by the projection. Zero when there is no impact.
pub fn reduction_percent(
    current_impact: &BigDecimal,
    projected_impact: &BigDecimal,
) -> BigDecimal {
    if current_impact <= &BigDecimal::zero() {
        return BigDecimal::zero();
    }
    (current_impact - projected_impact) / current_impact * BigDecimal::from(100)
}

pub fn reward_tier(config: &ImpactConfig, reduction_percent: &BigDecimal) -> Option<RewardTier> {
    let thresholds = &config.reward_thresholds;
    if reduction_percent >= &thresholds.champion {
        Some(RewardTier::GreenChampion)
    } else if reduction_percent >= &thresholds.improver {
        Some(RewardTier::EcoImprover)
    } else if reduction_percent > &BigDecimal::zero() {
        Some(RewardTier::FirstGreenStep)
    } else {
        None
    }
}

/// Total impact per category across every given purchase.
pub fn category_impact_summary<'a>(
    purchases: impl IntoIterator<Item = &'a Purchase>,
) -> BTreeMap<Category, BigDecimal> {
    let mut summary = BTreeMap::<Category, BigDecimal>::new();
    for purchase in purchases {
        *summary
            .entry(purchase.category.clone())
            .or_insert_with(BigDecimal::zero) += &purchase.impact;
    }
    summary
}

pub fn suggest_alternatives(category: &Category) -> &'static [&'static str] {
    match category {
        Category::Electronics => &["Refurbished devices", "Energy-efficient brands"],
        Category::Clothes => &["Organic cotton", "Second-hand clothing"],
        Category::Groceries => &["Local produce", "Minimal packaging brands"],
        Category::Footwear => &["Vegan leather", "Sustainable materials"],
        Category::SecondHand => &["Reuse stores", "Community swaps"],
        Category::Other(_) => &[],
    }
}

/// Picks one of `ECO_TIPS` uniformly with the caller's random source.
pub fn pick_tip<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    ECO_TIPS[rng.gen_range(0..ECO_TIPS.len())]
}
