//! Static time-shift reference data.
//!
//! The set is fixed for the life of the process, so it is built once on first
//! use and served from a key to record lookup.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveTime;
use serde::Serialize;
use utoipa::ToSchema;

/// A named window of the working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeShift {
    pub name: &'static str,
    pub label: &'static str,
    #[schema(value_type = String, example = "08:00:00")]
    pub starts_at: NaiveTime,
    #[schema(value_type = String, example = "13:00:00")]
    pub ends_at: NaiveTime,
}

static SHIFTS: OnceLock<BTreeMap<&'static str, TimeShift>> = OnceLock::new();

fn shift(name: &'static str, label: &'static str, start: u32, end: u32) -> TimeShift {
    TimeShift {
        name,
        label,
        starts_at: NaiveTime::from_hms_opt(start, 0, 0).unwrap_or(NaiveTime::MIN),
        ends_at: NaiveTime::from_hms_opt(end, 0, 0).unwrap_or(NaiveTime::MIN),
    }
}

fn shifts() -> &'static BTreeMap<&'static str, TimeShift> {
    SHIFTS.get_or_init(|| {
        [
            shift("morning", "Morning", 8, 13),
            shift("afternoon", "Afternoon", 13, 18),
        ]
        .into_iter()
        .map(|s| (s.name, s))
        .collect()
    })
}

impl TimeShift {
    /// Look up a shift by its token.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static TimeShift> {
        shifts().get(name)
    }

    /// Every known shift, ordered by start time.
    #[must_use]
    pub fn all() -> Vec<&'static TimeShift> {
        let mut all: Vec<_> = shifts().values().collect();
        all.sort_by_key(|s| s.starts_at);
        all
    }
}
