//! Partial dates as they appear in upstream sources.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::ModelError;

/// A year, a year and month, or a full calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal {
    Year(i32),
    YearMonth(i32, u32),
    Date(NaiveDate),
}

impl Temporal {
    pub fn year(&self) -> i32 {
        match self {
            Temporal::Year(year) | Temporal::YearMonth(year, _) => *year,
            Temporal::Date(date) => date.year(),
        }
    }

    /// Parse ISO forms (`2021`, `2021-05`, `2021-05-03`, optionally followed by
    /// a time part) and the German `03.05.2021` form.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let value = raw.trim();
        let invalid = || ModelError::InvalidTemporal(raw.to_string());
        if value.is_empty() {
            return Err(invalid());
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%d.%m.%Y") {
            return Ok(Temporal::Date(date));
        }
        let date_part = value.split(['T', ' ']).next().unwrap_or(value);
        let parts: Vec<&str> = date_part.split('-').collect();
        match parts.as_slice() {
            [year] if year.len() == 4 => year.parse().map(Temporal::Year).map_err(|_| invalid()),
            [year, month] if year.len() == 4 => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                if !(1..=12).contains(&month) {
                    return Err(invalid());
                }
                Ok(Temporal::YearMonth(year, month))
            }
            [_, _, _] => NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Temporal::Date)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for Temporal {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Temporal::parse(s)
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Year(year) => write!(f, "{year:04}"),
            Temporal::YearMonth(year, month) => write!(f, "{year:04}-{month:02}"),
            Temporal::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl serde::Serialize for Temporal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Temporal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Temporal::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_dates() {
        assert_eq!(Temporal::parse("2021").unwrap(), Temporal::Year(2021));
        assert_eq!(Temporal::parse("2021-05").unwrap(), Temporal::YearMonth(2021, 5));
        assert_eq!(
            Temporal::parse("2021-05-03T10:00:00").unwrap(),
            Temporal::Date(NaiveDate::from_ymd_opt(2021, 5, 3).unwrap())
        );
        assert_eq!(
            Temporal::parse("03.05.2021").unwrap(),
            Temporal::Date(NaiveDate::from_ymd_opt(2021, 5, 3).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Temporal::parse("").is_err());
        assert!(Temporal::parse("2021-13").is_err());
        assert!(Temporal::parse("spring 2021").is_err());
        assert!(Temporal::parse("21").is_err());
    }

    #[test]
    fn displays_iso() {
        assert_eq!(Temporal::YearMonth(2021, 5).to_string(), "2021-05");
        assert_eq!(Temporal::parse("2021-5-3").unwrap().to_string(), "2021-05-03");
        assert_eq!(Temporal::parse("1999").unwrap().year(), 1999);
    }
}
