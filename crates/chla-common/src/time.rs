//! CF-convention time decoding.
//!
//! NetCDF time coordinates store offsets such as `"days since 2020-01-01"`
//! together with a `calendar` attribute. Offsets are counted in whole days of
//! the file's calendar, so the decoded year, month and day are the calendar's
//! own. They are returned as chrono timestamps; a day the Gregorian month does
//! not have (30 February in `360_day`) clamps to the month's last day.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use thiserror::Error;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Julian day number of 1582-10-15, the first Gregorian day of `standard`.
const GREGORIAN_REFORM_JDN: i64 = 2_299_161;

const MONTH_DAYS_365: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_DAYS_366: [i64; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_DAYS_360: [i64; 12] = [30; 12];

#[derive(Debug, Error, PartialEq)]
pub enum TimeParseError {
    #[error("Invalid time units '{0}'. Expected '<unit> since <reference>'")]
    InvalidUnits(String),

    #[error("Unsupported time step '{0}'")]
    UnsupportedStep(String),

    #[error("Invalid reference time: {0}")]
    InvalidFormat(String),

    #[error("Unsupported calendar '{0}'")]
    UnsupportedCalendar(String),

    #[error("Time value {0} cannot be represented")]
    OutOfRange(f64),
}

/// CF calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// `standard` / `gregorian`: Julian before 1582-10-15, Gregorian after.
    Standard,
    ProlepticGregorian,
    Julian,
    /// `noleap` / `365_day`
    NoLeap,
    /// `all_leap` / `366_day`
    AllLeap,
    /// Twelve 30-day months
    Day360,
}

impl Calendar {
    pub fn parse(name: &str) -> Result<Self, TimeParseError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Calendar::Standard),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "julian" => Ok(Calendar::Julian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            _ => Err(TimeParseError::UnsupportedCalendar(name.to_string())),
        }
    }

    /// Day count of a calendar date. Counts are only comparable within one calendar.
    fn days_from_date(self, year: i64, month: u32, day: u32) -> i64 {
        let (m, d) = (month as i64, day as i64);
        match self {
            Calendar::ProlepticGregorian => gregorian_jdn(year, m, d),
            Calendar::Julian => julian_jdn(year, m, d),
            Calendar::Standard => {
                let jdn = gregorian_jdn(year, m, d);
                if jdn >= GREGORIAN_REFORM_JDN {
                    jdn
                } else {
                    julian_jdn(year, m, d)
                }
            }
            Calendar::NoLeap => fixed_year_days(&MONTH_DAYS_365, year, m, d),
            Calendar::AllLeap => fixed_year_days(&MONTH_DAYS_366, year, m, d),
            Calendar::Day360 => fixed_year_days(&MONTH_DAYS_360, year, m, d),
        }
    }

    /// Inverse of [`Calendar::days_from_date`].
    fn date_from_days(self, days: i64) -> (i64, u32, u32) {
        match self {
            Calendar::ProlepticGregorian => gregorian_from_jdn(days),
            Calendar::Julian => julian_from_jdn(days),
            Calendar::Standard if days >= GREGORIAN_REFORM_JDN => gregorian_from_jdn(days),
            Calendar::Standard => julian_from_jdn(days),
            Calendar::NoLeap => fixed_year_date(&MONTH_DAYS_365, days),
            Calendar::AllLeap => fixed_year_date(&MONTH_DAYS_366, days),
            Calendar::Day360 => fixed_year_date(&MONTH_DAYS_360, days),
        }
    }
}

/// Parsed `"<unit> since <reference>"` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    /// Length of one unit step in seconds
    pub step_seconds: f64,
    /// Reference instant (UTC)
    pub reference: NaiveDateTime,
}

impl CfTimeUnits {
    pub fn parse(units: &str) -> Result<Self, TimeParseError> {
        let trimmed = units.trim();
        let lower = trimmed.to_ascii_lowercase();
        let split = lower
            .find(" since ")
            .ok_or_else(|| TimeParseError::InvalidUnits(units.to_string()))?;

        let step = lower[..split].trim();
        let reference = trimmed[split + " since ".len()..].trim();

        Ok(Self {
            step_seconds: step_seconds(step)?,
            reference: parse_reference(reference)?,
        })
    }

    /// Convert one stored offset into a timestamp in `calendar`.
    pub fn decode(&self, value: f64, calendar: Calendar) -> Result<DateTime<Utc>, TimeParseError> {
        let out_of_range = || TimeParseError::OutOfRange(value);

        let offset = (value * self.step_seconds * 1000.0).round();
        // i64::MAX as f64 rounds up to 2^63, which does not fit.
        if !offset.is_finite() || offset.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }

        let reference = &self.reference;
        let reference_days = calendar.days_from_date(
            reference.year() as i64,
            reference.month(),
            reference.day(),
        );
        let reference_ms = reference.num_seconds_from_midnight() as i64 * 1000
            + (reference.nanosecond() / 1_000_000) as i64;

        let total = reference_days
            .checked_mul(MILLIS_PER_DAY)
            .and_then(|ms| ms.checked_add(reference_ms))
            .and_then(|ms| ms.checked_add(offset as i64))
            .ok_or_else(out_of_range)?;

        let (year, month, day) = calendar.date_from_days(total.div_euclid(MILLIS_PER_DAY));
        let ms_of_day = total.rem_euclid(MILLIS_PER_DAY);

        let year = i32::try_from(year).map_err(|_| out_of_range())?;
        let date = NaiveDate::from_ymd_opt(year, month, day.min(gregorian_month_len(year, month)))
            .ok_or_else(out_of_range)?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(
            (ms_of_day / 1000) as u32,
            (ms_of_day % 1000) as u32 * 1_000_000,
        )
        .ok_or_else(out_of_range)?;

        Ok(Utc.from_utc_datetime(&date.and_time(time)))
    }
}

/// Decode a CF time coordinate (`num2date`).
pub fn decode_cf_times(
    values: &[f64],
    units: &str,
    calendar: &str,
) -> Result<Vec<DateTime<Utc>>, TimeParseError> {
    let calendar = Calendar::parse(calendar)?;
    let units = CfTimeUnits::parse(units)?;

    values.iter().map(|&v| units.decode(v, calendar)).collect()
}

// ============================================================================
// Day counting
// ============================================================================

fn gregorian_jdn(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}

fn julian_jdn(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - 32083
}

fn gregorian_from_jdn(jdn: i64) -> (i64, u32, u32) {
    let a = jdn + 32044;
    let b = (4 * a + 3).div_euclid(146_097);
    let c = a - (146_097 * b).div_euclid(4);
    month_day_from(c, 100 * b)
}

fn julian_from_jdn(jdn: i64) -> (i64, u32, u32) {
    month_day_from(jdn + 32082, 0)
}

// Shared tail of the Richards inverse for both calendars.
fn month_day_from(c: i64, century_years: i64) -> (i64, u32, u32) {
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);
    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = century_years + d - 4800 + m.div_euclid(10);
    (year, month as u32, day as u32)
}

fn fixed_year_days(months: &[i64; 12], year: i64, month: i64, day: i64) -> i64 {
    let year_len: i64 = months.iter().sum();
    let before: i64 = months.iter().take((month - 1).clamp(0, 11) as usize).sum();
    year * year_len + before + day - 1
}

fn fixed_year_date(months: &[i64; 12], days: i64) -> (i64, u32, u32) {
    let year_len: i64 = months.iter().sum();
    let year = days.div_euclid(year_len);
    let mut rest = days.rem_euclid(year_len);
    for (i, &len) in months.iter().enumerate() {
        if rest < len {
            return (year, i as u32 + 1, rest as u32 + 1);
        }
        rest -= len;
    }
    (year, 12, months[11] as u32)
}

fn gregorian_month_len(year: i32, month: u32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// ============================================================================
// Unit strings
// ============================================================================

fn step_seconds(step: &str) -> Result<f64, TimeParseError> {
    let seconds = match step {
        "days" | "day" | "d" => 86_400.0,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
        "minutes" | "minute" | "mins" | "min" => 60.0,
        "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
        "milliseconds" | "millisecond" | "msecs" | "msec" | "ms" => 1e-3,
        "microseconds" | "microsecond" | "usecs" | "usec" | "us" => 1e-6,
        _ => return Err(TimeParseError::UnsupportedStep(step.to_string())),
    };
    Ok(seconds)
}

fn parse_reference(s: &str) -> Result<NaiveDateTime, TimeParseError> {
    let mut text = s.trim().to_string();
    let bytes = text.as_bytes();
    if let Some(t) = (1..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i] == b'T' && bytes[i - 1].is_ascii_digit() && bytes[i + 1].is_ascii_digit()
    }) {
        text.replace_range(t..t + 1, " ");
    }
    for suffix in [" UTC", "UTC", " GMT", "Z"] {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.trim_end().to_string();
            break;
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(&text, fmt) {
            return Ok(dt.naive_utc());
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Ok(ndt);
        }
    }

    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))
}
