// Lookback range literals such as "7d" or "-12h"
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl RangeUnit {
    fn suffix(self) -> char {
        match self {
            RangeUnit::Minutes => 'm',
            RangeUnit::Hours => 'h',
            RangeUnit::Days => 'd',
            RangeUnit::Weeks => 'w',
        }
    }
}

/// A positive span of time counted back from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lookback {
    pub amount: u32,
    pub unit: RangeUnit,
}

impl Lookback {
    pub fn new(amount: u32, unit: RangeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn days(amount: u32) -> Self {
        Self::new(amount, RangeUnit::Days)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for Lookback {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalysisError::InvalidRange(s.to_string());
        let literal = s.trim();
        let literal = literal.strip_prefix('-').unwrap_or(literal);

        let mut chars = literal.chars();
        let unit = match chars.next_back() {
            Some('m') => RangeUnit::Minutes,
            Some('h') => RangeUnit::Hours,
            Some('d') => RangeUnit::Days,
            Some('w') => RangeUnit::Weeks,
            _ => return Err(invalid()),
        };

        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let amount: u32 = digits.parse().map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }

        Ok(Self::new(amount, unit))
    }
}

impl Serialize for Lookback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Lookback {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(serde::de::Error::custom)
    }
}
