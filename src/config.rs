// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::collections::HashMap;

use bigdecimal::BigDecimal;

use crate::common::Category;
use crate::{make_input_err, Error, ErrorKind};

/// Break points shared by the badge and impact-level classifiers.
/// Impact below `low` is the low tier, below `high` the medium tier, anything else high.
#[derive(Debug, Clone, PartialEq)]
pub struct TierThresholds {
    pub low: BigDecimal,
    pub high: BigDecimal,
}

/// Minimum reduction percent needed for each green transition reward.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardThresholds {
    pub champion: BigDecimal,
    pub improver: BigDecimal,
}

/// Every constant the engine computes with.
///
/// `Default` is the canonical table: Electronics 0.6, Clothes 0.3, Groceries 0.1, Footwear 0.4,
/// Second-hand 0.05, unknown categories 0.2, tiers at 500 / 1500 and a 35% green reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactConfig {
    pub multipliers: HashMap<Category, BigDecimal>,
    pub default_multiplier: BigDecimal,
    pub tier_thresholds: TierThresholds,
    /// Impact units that cost one point of eco score.
    pub eco_score_divisor: BigDecimal,
    pub reduction_factor: BigDecimal,
    pub reward_thresholds: RewardThresholds,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        let multipliers = HashMap::from([
            (Category::Electronics, BigDecimal::new(6.into(), 1)),
            (Category::Clothes, BigDecimal::new(3.into(), 1)),
            (Category::Groceries, BigDecimal::new(1.into(), 1)),
            (Category::Footwear, BigDecimal::new(4.into(), 1)),
            (Category::SecondHand, BigDecimal::new(5.into(), 2)),
        ]);
        Self {
            multipliers,
            default_multiplier: BigDecimal::new(2.into(), 1),
            tier_thresholds: TierThresholds {
                low: BigDecimal::from(500),
                high: BigDecimal::from(1500),
            },
            eco_score_divisor: BigDecimal::from(20),
            reduction_factor: BigDecimal::new(35.into(), 2),
            reward_thresholds: RewardThresholds {
                champion: BigDecimal::from(40),
                improver: BigDecimal::from(20),
            },
        }
    }
}

impl ImpactConfig {
    /// Multiplier for `category`, falling back to `default_multiplier` when the table has no
    /// entry for it.
    pub fn multiplier(&self, category: &Category) -> &BigDecimal {
        self.multipliers
            .get(category)
            .unwrap_or(&self.default_multiplier)
    }

    /// Checks the invariants the classifiers rely on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tier_thresholds.low > self.tier_thresholds.high {
            return Err(make_input_err!(
                "Low threshold ({}) must not exceed high threshold ({})",
                self.tier_thresholds.low,
                self.tier_thresholds.high
            ));
        }
        if self.eco_score_divisor <= BigDecimal::from(0) {
            return Err(make_input_err!(
                "Eco score divisor must be positive, got {}",
                self.eco_score_divisor
            ));
        }
        let reduction_factor = &self.reduction_factor;
        if reduction_factor < &BigDecimal::from(0) || reduction_factor > &BigDecimal::from(1) {
            return Err(make_input_err!(
                "Reduction factor must be within [0, 1], got {}",
                self.reduction_factor
            ));
        }
        let negative_multiplier = self
            .multipliers
            .iter()
            .find(|(_, multiplier)| **multiplier < BigDecimal::from(0));
        if let Some((category, multiplier)) = negative_multiplier {
            return Err(make_input_err!(
                "Multiplier for {} must not be negative, got {}",
                category,
                multiplier
            ));
        }
        if self.default_multiplier < BigDecimal::from(0) {
            return Err(make_input_err!(
                "Default multiplier must not be negative, got {}",
                self.default_multiplier
            ));
        }
        Ok(())
    }
}
