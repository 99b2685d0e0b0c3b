//! VAT removal rules
//!
//! Finnish spot prices were published including VAT, with the rate changing
//! over time. The rules form an ordered table: the first rule whose condition
//! holds decides how the price is treated, and the last rule always matches.
//! The 10 % window is checked before the broader "before 2024-09-01" rule,
//! so the order of the table is significant.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Condition part of a VAT rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VatCondition {
    /// Price is below zero
    NegativePrice,
    /// Timestamp within `[start, end]`, both ends inclusive
    Between {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Timestamp strictly before the given instant
    Before(NaiveDateTime),
    /// Always matches
    Always,
}

impl VatCondition {
    /// Check whether the condition holds for one observation
    pub fn matches(&self, timestamp: NaiveDateTime, price: f64) -> bool {
        match *self {
            VatCondition::NegativePrice => price < 0.0,
            VatCondition::Between { start, end } => timestamp >= start && timestamp <= end,
            VatCondition::Before(limit) => timestamp < limit,
            VatCondition::Always => true,
        }
    }
}

/// What to do with the price once a rule matched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VatTreatment {
    /// No VAT was charged, keep the price as is
    Untaxed,
    /// Divide by `1 + rate`
    Divide(f64),
}

impl VatTreatment {
    pub fn apply(&self, price: f64) -> f64 {
        match *self {
            VatTreatment::Untaxed => price,
            VatTreatment::Divide(divisor) => price / divisor,
        }
    }
}

/// A single (condition, treatment) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatRule {
    /// Short label used in logs
    pub label: String,
    pub condition: VatCondition,
    pub treatment: VatTreatment,
}

/// Ordered rule table evaluated with first-match semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatRuleTable {
    rules: Vec<VatRule>,
    /// Used when no rule in `rules` matches
    fallback: VatTreatment,
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl Default for VatRuleTable {
    /// Finnish electricity VAT history
    fn default() -> Self {
        Self {
            rules: vec![
                VatRule {
                    label: "negative price".to_string(),
                    condition: VatCondition::NegativePrice,
                    treatment: VatTreatment::Untaxed,
                },
                VatRule {
                    label: "vat 10%".to_string(),
                    condition: VatCondition::Between {
                        start: midnight(2022, 12, 1),
                        end: midnight(2023, 4, 30),
                    },
                    treatment: VatTreatment::Divide(1.10),
                },
                VatRule {
                    label: "vat 24%".to_string(),
                    condition: VatCondition::Before(midnight(2024, 9, 1)),
                    treatment: VatTreatment::Divide(1.24),
                },
            ],
            fallback: VatTreatment::Divide(1.255),
        }
    }
}

impl VatRuleTable {
    /// Build a table from explicit rules and a fallback treatment
    pub fn new(rules: Vec<VatRule>, fallback: VatTreatment) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[VatRule] {
        &self.rules
    }

    /// Index of the rule that decides this observation, `None` for the fallback
    pub fn matching_rule(&self, timestamp: NaiveDateTime, price: f64) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.condition.matches(timestamp, price))
    }

    /// Treatment that applies to this observation
    pub fn treatment_for(&self, timestamp: NaiveDateTime, price: f64) -> VatTreatment {
        match self.matching_rule(timestamp, price) {
            Some(idx) => self.rules[idx].treatment,
            None => self.fallback,
        }
    }

    /// Remove VAT from a single price
    pub fn vat_free_price(&self, timestamp: NaiveDateTime, price: f64) -> f64 {
        self.treatment_for(timestamp, price).apply(price)
    }
}
