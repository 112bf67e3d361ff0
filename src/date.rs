use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// "YYYY-MM" month key of the dump corpus files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8, // 1..=12
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Self {
        assert!((1..=12).contains(&month), "Month must be 1..=12");
        Self { year, month }
    }

    pub fn next(self) -> Option<Self> {
        match self.month {
            12 if self.year == u16::MAX => None,
            12 => Some(Self { year: self.year + 1, month: 1 }),
            m => Some(Self { year: self.year, month: m + 1 }),
        }
    }

    pub fn from_epoch(ts: i64) -> Self {
        let dt = utc(ts);
        Self { year: dt.year().clamp(0, u16::MAX as i32) as u16, month: dt.month() as u8 }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s.split_once('-').ok_or("expected YYYY-MM")?;
        let year: u16 = y.parse().map_err(|_| "invalid year")?;
        let month: u8 = m.parse().map_err(|_| "invalid month")?;
        if !(1..=12).contains(&month) {
            return Err("month must be 01..12".into());
        }
        Ok(Self { year, month })
    }
}

/// Inclusive iteration from `start` to `end`; empty when `start > end`.
pub fn iter_year_months(start: YearMonth, end: YearMonth) -> impl Iterator<Item = YearMonth> {
    let mut curr = if start <= end { Some(start) } else { None };
    std::iter::from_fn(move || {
        let ret = curr?;
        curr = ret.next().filter(|n| *n <= end);
        Some(ret)
    })
}

// Out-of-range timestamps clamp to the epoch.
fn utc(ts: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(ts).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub fn rfc3339(ts: i64) -> String {
    utc(ts).format(&Rfc3339).unwrap_or_default()
}

/// Hour of day (0..=23, UTC).
pub fn hour_of_day(ts: i64) -> u8 {
    utc(ts).hour()
}

/// Day of week with Monday = 0 .. Sunday = 6 (UTC).
pub fn day_of_week(ts: i64) -> u8 {
    utc(ts).weekday().number_days_from_monday()
}
