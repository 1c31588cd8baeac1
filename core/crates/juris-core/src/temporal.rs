//! Temporal scopes for theorems
//!
//! A scope is the interval during which a theorem is in force. An absent
//! end means the theorem is still in force and is treated as +∞ by every
//! containment check.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Calendar month key used by the store's temporal index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<DateTime<Utc>> for YearMonth {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }
}

impl YearMonth {
    /// Signed number of months from `other` to `self`
    pub fn months_since(&self, other: &YearMonth) -> i64 {
        (self.year as i64 - other.year as i64) * 12 + (self.month as i64 - other.month as i64)
    }
}

/// The interval during which a theorem is in force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalScope {
    pub start: DateTime<Utc>,
    /// `None` means still in force
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TemporalScope {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A scope with no end: in force from `start` onwards
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Whether the interval is well-formed (start ≤ end when end exists)
    pub fn is_valid(&self) -> bool {
        match self.end {
            Some(end) => self.start <= end,
            None => true,
        }
    }

    /// Whether `instant` falls inside the scope, treating no end as +∞
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if instant < self.start {
            return false;
        }
        match self.end {
            Some(end) => instant <= end,
            None => true,
        }
    }

    /// Midpoint of a bounded scope; the start for an open-ended one
    pub fn midpoint(&self) -> DateTime<Utc> {
        match self.end {
            Some(end) => {
                let half = (end - self.start) / 2;
                self.start + half
            }
            None => self.start,
        }
    }

    /// Absolute month distance between the scope's midpoint and `instant`
    pub fn month_delta(&self, instant: DateTime<Utc>) -> i64 {
        let a = YearMonth::from(self.midpoint());
        let b = YearMonth::from(instant);
        a.months_since(&b).abs()
    }

    /// Temporal proximity score in (0, 1]: `exp(-Δmonths / 60)`
    pub fn proximity(&self, instant: DateTime<Utc>) -> f64 {
        (-(self.month_delta(instant) as f64) / 60.0).exp()
    }

    /// Every calendar month a bounded scope covers; a single month for an
    /// open-ended scope (open scopes are tracked separately by the index)
    pub fn months_covered(&self) -> Vec<YearMonth> {
        let start = YearMonth::from(self.start);
        let end = match self.end {
            Some(end) => YearMonth::from(end),
            None => return vec![start],
        };

        let mut months = Vec::new();
        let mut current = start;
        loop {
            months.push(current);
            if current >= end {
                break;
            }
            current = if current.month == 12 {
                YearMonth {
                    year: current.year + 1,
                    month: 1,
                }
            } else {
                YearMonth {
                    year: current.year,
                    month: current.month + 1,
                }
            };
        }
        months
    }

    /// Stable textual form used in theorem id derivation and logging
    pub fn canonical_string(&self) -> String {
        match self.end {
            Some(end) => format!("{}..{}", self.start.to_rfc3339(), end.to_rfc3339()),
            None => format!("{}..open", self.start.to_rfc3339()),
        }
    }
}
