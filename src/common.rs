// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{make_input_err, Error, ErrorKind};

pub type SessionId = u32;

/// Product category of a purchase.
///
/// Names are matched ignoring ASCII case and "Clothing" is accepted as an alias of "Clothes".
/// Anything else is kept in `Other` with its original spelling for display, but compares,
/// hashes and orders ignoring ASCII case, so "Books" and "books" are the same category.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Electronics,
    Clothes,
    Groceries,
    Footwear,
    SecondHand,
    Other(String),
}

impl Category {
    /// Every category with its own multiplier, in display order.
    pub const KNOWN: [Category; 5] = [
        Category::Electronics,
        Category::Clothes,
        Category::Groceries,
        Category::Footwear,
        Category::SecondHand,
    ];

    fn rank(&self) -> u8 {
        match self {
            Category::Electronics => 0,
            Category::Clothes => 1,
            Category::Groceries => 2,
            Category::Footwear => 3,
            Category::SecondHand => 4,
            Category::Other(_) => 5,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothes => "Clothes",
            Category::Groceries => "Groceries",
            Category::Footwear => "Footwear",
            Category::SecondHand => "Second-hand",
            Category::Other(name) => name,
        }
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Category::Other(a), Category::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => self.rank() == other.rank(),
        }
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        if let Category::Other(name) = self {
            name.len().hash(state);
            for byte in name.bytes() {
                byte.to_ascii_lowercase().hash(state);
            }
        }
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Category::Other(a), Category::Other(b)) => a
                .bytes()
                .map(|byte| byte.to_ascii_lowercase())
                .cmp(b.bytes().map(|byte| byte.to_ascii_lowercase())),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "electronics" => Category::Electronics,
            "clothes" | "clothing" => Category::Clothes,
            "groceries" => Category::Groceries,
            "footwear" => Category::Footwear,
            "second-hand" | "secondhand" | "second hand" => Category::SecondHand,
            _ => Category::Other(name.trim().to_string()),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.name().to_string()
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A calendar month, written `YYYY-MM`. Used to bucket purchases for monthly totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(make_input_err!(
                "Month must be between 1 and 12, got {}",
                month
            ));
        }
        Ok(Self { year, month })
    }

    /// Month the given date or timestamp falls in.
    pub fn of(date: &impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| make_input_err!("Expected month as YYYY-MM, got '{}'", s))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| make_input_err!("Invalid year in '{}' : {}", s, e))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| make_input_err!("Invalid month in '{}' : {}", s, e))?;
        MonthKey::new(year, month)
    }
}

/// Holds a raw purchase (usually from a csv).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PurchaseRecord {
    pub session: SessionId,
    pub category: Category,
    pub brand: Option<String>,
    pub price: BigDecimal,
    pub timestamp: Option<NaiveDateTime>,
}

impl PurchaseRecord {
    /// Validates the record at the input boundary and resolves a missing timestamp to `now`.
    /// Negative prices are rejected here so the engine never sees them.
    pub fn into_event(self, now: NaiveDateTime) -> Result<PurchaseEvent, Error> {
        if self.price < BigDecimal::zero() {
            return Err(make_input_err!(
                "Price must not be negative ({}) : {:?}",
                self.price,
                self
            ));
        }
        let brand = self.brand.filter(|brand| !brand.trim().is_empty());
        Ok(PurchaseEvent {
            session: self.session,
            category: self.category,
            brand,
            price: self.price,
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}

/// A validated purchase on its way to the session that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseEvent {
    pub session: SessionId,
    pub category: Category,
    pub brand: Option<String>,
    pub price: BigDecimal,
    pub timestamp: NaiveDateTime,
}

/// One logged purchase. `impact` is fixed when the purchase is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub category: Category,
    pub brand: Option<String>,
    pub price: BigDecimal,
    pub impact: BigDecimal,
    pub timestamp: NaiveDateTime,
    pub month: MonthKey,
}
