// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::collections::HashSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};

use crate::common::{Category, MonthKey, PurchaseEvent, PurchaseRecord};
use crate::{Error, ErrorKind};

// Gives easier to read output for assert errors.
use pretty_assertions::assert_eq;

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn month_key_round_trips_through_text_test() -> Result<(), Error> {
    let month = MonthKey::from_str("2026-03")?;
    assert_eq!(month, MonthKey::new(2026, 3)?);
    assert_eq!(month.to_string(), "2026-03");
    assert_eq!(MonthKey::of(&at(2026, 3, 31)), month);
    Ok(())
}

#[test]
fn month_key_rejects_malformed_input_test() {
    for input in ["2026", "2026-13", "2026-00", "twenty-ten", ""] {
        let err = MonthKey::from_str(input).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput, "input: {:?}", input);
    }
}

#[test]
fn previous_month_rolls_back_over_january_test() -> Result<(), Error> {
    assert_eq!(MonthKey::new(2026, 1)?.previous(), MonthKey::new(2025, 12)?);
    assert_eq!(MonthKey::new(2026, 10)?.previous(), MonthKey::new(2026, 9)?);
    Ok(())
}

#[test]
fn category_names_and_aliases_test() {
    assert_eq!(Category::from("Clothing".to_string()), Category::Clothes);
    assert_eq!(Category::from("clothes".to_string()), Category::Clothes);
    assert_eq!(Category::from(" Second-hand ".to_string()), Category::SecondHand);
    assert_eq!(
        Category::from("Gadgets".to_string()),
        Category::Other("Gadgets".to_string())
    );
    let names: Vec<String> = Category::KNOWN.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        names,
        vec!["Electronics", "Clothes", "Groceries", "Footwear", "Second-hand"]
    );
}

#[test]
fn other_categories_ignore_case_test() {
    let lower = Category::from("books".to_string());
    let upper = Category::from("Books".to_string());
    assert_eq!(lower, upper);
    assert_eq!(upper.to_string(), "Books");
    assert_ne!(lower, Category::from("Board games".to_string()));
    assert_ne!(lower, Category::Groceries);

    let mut seen = HashSet::new();
    seen.insert(lower);
    assert!(seen.contains(&upper));
    assert!(!seen.contains(&Category::from("Bookss".to_string())));

    let mut sorted = vec![
        Category::from("toys".to_string()),
        Category::from("Books".to_string()),
        Category::SecondHand,
        Category::Electronics,
    ];
    sorted.sort();
    let names: Vec<String> = sorted.iter().map(|c| c.to_string()).collect();
    assert_eq!(names, vec!["Electronics", "Second-hand", "Books", "toys"]);
}

#[test]
fn record_into_event_uses_now_for_missing_timestamp_test() -> Result<(), Error> {
    let now = at(2026, 10, 19);
    let record = PurchaseRecord {
        session: 4,
        category: Category::Groceries,
        brand: Some("  ".to_string()),
        price: BigDecimal::from(12),
        timestamp: None,
    };
    assert_eq!(
        record.into_event(now)?,
        PurchaseEvent {
            session: 4,
            category: Category::Groceries,
            brand: None,
            price: BigDecimal::from(12),
            timestamp: now,
        }
    );
    Ok(())
}

#[test]
fn record_into_event_rejects_negative_price_test() {
    let record = PurchaseRecord {
        session: 1,
        category: Category::Footwear,
        brand: Some("Stride".to_string()),
        price: BigDecimal::from(-10),
        timestamp: Some(at(2026, 10, 6)),
    };
    let err = record.into_event(at(2026, 10, 19)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[test]
fn record_into_event_accepts_zero_price_test() -> Result<(), Error> {
    let record = PurchaseRecord {
        session: 1,
        category: Category::SecondHand,
        brand: None,
        price: BigDecimal::from(0),
        timestamp: Some(at(2026, 10, 6)),
    };
    let event = record.into_event(at(2026, 10, 19))?;
    assert_eq!(event.timestamp, at(2026, 10, 6));
    assert_eq!(event.price, BigDecimal::from(0));
    Ok(())
}
