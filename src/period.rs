use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::errors::AppError;

/// Inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Half-open UTC window `[from, until)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.until
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::InvalidDateRange(format!(
                "End date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build an optional range from query bounds. Both bounds or neither.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Option<Self>, AppError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(AppError::ValidationError(
                "startDate and endDate must be provided together".to_string(),
            )),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// UTC window covering every instant whose local day falls in the range.
    pub fn utc_window(&self, offset: &FixedOffset) -> TimeWindow {
        TimeWindow {
            from: local_midnight(self.start, offset),
            until: self
                .end
                .succ_opt()
                .map(|next| local_midnight(next, offset))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Calendar months touched by the range, in order.
    pub fn months(&self) -> Vec<MonthKey> {
        let last = MonthKey::from_date(self.end);
        let mut current = MonthKey::from_date(self.start);
        let mut months = Vec::new();
        while current <= last {
            months.push(current);
            current = current.next();
        }
        months
    }

    pub fn month_count(&self) -> i64 {
        let first = MonthKey::from_date(self.start);
        let last = MonthKey::from_date(self.end);
        (last.year as i64 - first.year as i64) * 12 + last.month as i64 - first.month as i64 + 1
    }
}

fn local_midnight(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Local calendar day of a UTC instant.
pub fn local_date(at: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    at.with_timezone(offset).date_naive()
}

/// A calendar month. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Sortable key, e.g. `2024-03`.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Display label, e.g. `Mar 2024`.
    pub fn label(&self) -> String {
        let name = MONTH_ABBREVIATIONS
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{name} {}", self.year)
    }
}
