// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};

use crate::common::{Category, MonthKey, PurchaseEvent, SessionId};
use crate::config::ImpactConfig;
use crate::session_manager::SessionManager;
use crate::Error;

// Gives easier to read output for assert errors.
use pretty_assertions::assert_eq;

fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn event(session: SessionId, category: Category, price: &str, day: u32) -> PurchaseEvent {
    PurchaseEvent {
        session,
        category,
        brand: None,
        price: BigDecimal::from_str(price).unwrap(),
        timestamp: at(day),
    }
}

#[tokio::test]
async fn simple_purchase_test() -> Result<(), Error> {
    const NUM_WORKERS: usize = 5;
    let session_manager = SessionManager::new(NUM_WORKERS, ImpactConfig::default());

    session_manager
        .process_purchase(event(1, Category::Electronics, "1000", 2))
        .await?;

    let session_states = session_manager.collect_session_states().await?;

    assert_eq!(session_states.len(), 1);
    let state = &session_states[0];
    assert_eq!(state.session, 1);
    assert_eq!(state.purchases().len(), 1);
    assert_eq!(
        state.purchases()[0].impact,
        BigDecimal::from_str("600.0").unwrap()
    );
    Ok(())
}

#[tokio::test]
async fn purchases_keep_order_within_session_test() -> Result<(), Error> {
    const NUM_WORKERS: usize = 3;
    let session_manager = SessionManager::new(NUM_WORKERS, ImpactConfig::default());

    // Streaks only come out right if each session sees its purchases in order.
    for session in 1..=6 {
        session_manager
            .process_purchase(event(session, Category::SecondHand, "10", 1))
            .await?;
        session_manager
            .process_purchase(event(session, Category::SecondHand, "10", 2))
            .await?;
    }
    for session in (1..=6).filter(|session| session % 2 == 0) {
        session_manager
            .process_purchase(event(session, Category::Clothes, "10", 3))
            .await?;
    }

    let mut session_states = session_manager.collect_session_states().await?;

    // Ordering in the output is undefined, so we must sort here.
    session_states
        .make_contiguous()
        .sort_unstable_by(|a, b| a.session.cmp(&b.session));

    let streaks: Vec<(SessionId, u32)> = session_states
        .iter()
        .map(|state| (state.session, state.streak()))
        .collect();
    assert_eq!(
        streaks,
        vec![(1, 2), (2, 1), (3, 2), (4, 1), (5, 2), (6, 1)]
    );
    Ok(())
}

#[tokio::test]
async fn sessions_do_not_share_purchases_test() -> Result<(), Error> {
    const NUM_WORKERS: usize = 1;
    let session_manager = SessionManager::new(NUM_WORKERS, ImpactConfig::default());

    session_manager
        .process_purchase(event(1, Category::Electronics, "1000", 2))
        .await?;
    session_manager
        .process_purchase(event(2, Category::Groceries, "100", 3))
        .await?;
    session_manager
        .process_purchase(event(1, Category::SecondHand, "100", 5))
        .await?;

    let mut session_states = session_manager.collect_session_states().await?;
    session_states
        .make_contiguous()
        .sort_unstable_by(|a, b| a.session.cmp(&b.session));

    let config = ImpactConfig::default();
    let month = MonthKey::new(2026, 10)?;
    let totals: Vec<(BigDecimal, BigDecimal)> = session_states
        .iter()
        .map(|state| state.dashboard(&config, month, 0))
        .map(|dashboard| (dashboard.total_spend, dashboard.total_impact))
        .collect();
    assert_eq!(
        totals,
        vec![
            (BigDecimal::from(1100), BigDecimal::from(605)),
            (BigDecimal::from(100), BigDecimal::from(10)),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn workers_use_provided_config_test() -> Result<(), Error> {
    const NUM_WORKERS: usize = 2;
    let mut config = ImpactConfig::default();
    config.default_multiplier = BigDecimal::from(1);
    let session_manager = SessionManager::new(NUM_WORKERS, config);

    session_manager
        .process_purchase(event(9, Category::Other("Toys".to_string()), "40", 4))
        .await?;

    let session_states = session_manager.collect_session_states().await?;
    assert_eq!(
        session_states[0].purchases()[0].impact,
        BigDecimal::from(40)
    );
    Ok(())
}
