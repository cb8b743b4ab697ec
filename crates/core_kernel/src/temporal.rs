//! Calendar-date handling for provider data
//!
//! The insurance provider reports quotation expiry as a bare calendar date
//! (`YYYY-MM-DD`). A quotation stays valid for the whole of that day, so the
//! date is normalized to its last second (23:59:59) in the provider's
//! timezone, which is UTC unless configured otherwise.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Wire format of provider calendar dates
pub const PROVIDER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timezone wrapper for provider calendar dates
///
/// Wraps chrono_tz::Tz with custom serialization support so it can be read
/// straight from configuration (`"UTC"`, `"America/Sao_Paulo"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the IANA name of the timezone
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Gets the last whole second of the day (23:59:59) in this timezone as UTC
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::NonexistentLocalTime` if 23:59:59 does not
    /// exist on that date in this timezone. When a DST change makes the
    /// local time ambiguous, the later instant is used.
    pub fn end_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        let local = date
            .and_hms_opt(23, 59, 59)
            .ok_or(TemporalError::NonexistentLocalTime {
                date,
                timezone: self.name(),
            })?;

        local
            .and_local_timezone(self.0)
            .latest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or(TemporalError::NonexistentLocalTime {
                date,
                timezone: self.name(),
            })
    }

    /// Parses a provider date string and normalizes it to the end of that day
    ///
    /// # Arguments
    ///
    /// * `input` - Date in `YYYY-MM-DD` format
    ///
    /// # Errors
    ///
    /// A malformed date is a hard error; no default expiry is substituted.
    pub fn parse_end_of_day(&self, input: &str) -> Result<DateTime<Utc>, TemporalError> {
        let date = parse_provider_date(input)?;
        self.end_of_day(date)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Parses a `YYYY-MM-DD` provider date
pub fn parse_provider_date(input: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(input, PROVIDER_DATE_FORMAT).map_err(|e| {
        TemporalError::InvalidDate {
            input: input.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("parsing time {input:?}: {reason}")]
    InvalidDate {
        input: String,
        reason: String,
    },

    #[error("23:59:59 does not exist on {date} in {timezone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        timezone: &'static str,
    },
}
