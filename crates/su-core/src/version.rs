//! Migration version identifiers.
//!
//! A version is the 14-digit UTC timestamp (`YYYYMMDDHHMMSS`) that prefixes
//! every migration file. Fixed width means string order and numeric order
//! agree, so versions compare as plain strings.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// `chrono` format string producing a 14-digit version.
pub const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of digits in a migration version.
pub const VERSION_LEN: usize = 14;

/// A 14-digit migration timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MigrationVersion(String);

impl MigrationVersion {
    /// Parse a version, rejecting anything that is not exactly 14 ASCII digits.
    pub fn parse(value: &str) -> CoreResult<Self> {
        if is_version(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(CoreError::InvalidVersion {
                version: value.to_string(),
            })
        }
    }

    /// Version for the given instant.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format(VERSION_FORMAT).to_string())
    }

    /// Version for the current UTC time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// The version `seconds` later.
    ///
    /// Fails when this version is not a real calendar instant, which
    /// [`parse`](Self::parse) does not check.
    pub fn later_by(&self, seconds: i64) -> CoreResult<Self> {
        let at = NaiveDateTime::parse_from_str(&self.0, VERSION_FORMAT).map_err(|_| {
            CoreError::InvalidVersion {
                version: self.0.clone(),
            }
        })?;
        Ok(Self::from_datetime((at + Duration::seconds(seconds)).and_utc()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MigrationVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for MigrationVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_version(value: &str) -> bool {
    value.len() == VERSION_LEN && value.bytes().all(|b| b.is_ascii_digit())
}
