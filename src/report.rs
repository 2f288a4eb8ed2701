//! The Report data model: the fixed JSON schema the external model fills in.
//!
//! A [`Report`] is produced once per analysis run and never mutated; both
//! renderers take it by shared reference. Field defaults mirror what a
//! lenient reader of the schema expects:
//!
//! | Field | When missing or `null` |
//! |-------|------------------------|
//! | `transactions` | empty |
//! | `reconciliation` (or any of its numbers) | `0` |
//! | `red_flags` | empty |
//! | `summary` | `""` |
//!
//! Every [`Transaction`] must carry all six fields; a partial transaction is
//! a decode error, not a silently blank table cell.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// A monetary figure as the model sent it: integers stay integers.
///
/// Keeping the JSON number (instead of an `f64`) means the report shows
/// `2000` when the model said `2000` and `2000.5` when it said `2000.5`.
/// Any other decimal is shown in its shortest float form, so `2000.00`
/// renders as `2000.0` and `1e3` as `1000.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Number);

impl Amount {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount(Number::from(0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Amount {
    fn from(v: i64) -> Self {
        Amount(Number::from(v))
    }
}

impl From<f64> for Amount {
    /// Non-finite values have no JSON form and collapse to `0`.
    fn from(v: f64) -> Self {
        Number::from_f64(v).map(Amount).unwrap_or_default()
    }
}

/// Money flow relative to the statement holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            _ => Err(de::Error::unknown_variant(&s, &["in", "out"])),
        }
    }
}

/// One classified statement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub description: String,
    pub amount: Amount,
    pub direction: Direction,
    pub category: String,
    pub follow_up: String,
}

/// Declared vs. verified funding for the purchase.
///
/// The domain expects `shortfall = declared_contribution + mortgage_advance
/// − total_verified`; the figures are the model's and are not corrected here.
/// See [`Reconciliation::cross_check`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_verified: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub declared_contribution: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mortgage_advance: Amount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shortfall: Amount,
}

impl Reconciliation {
    /// The shortfall implied by the other three figures.
    pub fn expected_shortfall(&self) -> f64 {
        self.declared_contribution.as_f64() + self.mortgage_advance.as_f64()
            - self.total_verified.as_f64()
    }

    /// Compare the model's shortfall against the arithmetic of its own
    /// figures. Returns `None` when they agree within `tolerance`.
    pub fn cross_check(&self, tolerance: f64) -> Option<ReconciliationMismatch> {
        let expected = self.expected_shortfall();
        let reported = self.shortfall.as_f64();
        let difference = reported - expected;
        if difference.abs() > tolerance.abs() {
            Some(ReconciliationMismatch {
                expected,
                reported,
                difference,
            })
        } else {
            None
        }
    }
}

/// The model's shortfall disagrees with its own reconciliation figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationMismatch {
    pub expected: f64,
    pub reported: f64,
    pub difference: f64,
}

impl fmt::Display for ReconciliationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reported shortfall {:.2} does not match declared contribution + mortgage advance \
             - total verified = {:.2} (difference {:+.2})",
            self.reported, self.expected, self.difference
        )
    }
}

/// The structured result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "null_as_default")]
    pub transactions: Vec<Transaction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reconciliation: Reconciliation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub red_flags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
