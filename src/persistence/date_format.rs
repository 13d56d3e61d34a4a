//! "yyyy-MM-dd HH:mm:ss" timestamps of the model file

use crate::error::{RepositoryError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| RepositoryError::InvalidDate {
        value: value.to_string(),
    })
}

/// serde `with` helpers for optional timestamps
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Option<NaiveDateTime>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&format(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) if !value.trim().is_empty() => parse(&value).map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_and_parse() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(format(&date), "2024-03-09 07:05:00");
        assert_eq!(parse("2024-03-09 07:05:00").unwrap(), date);
    }

    #[test]
    fn test_invalid_date() {
        let err = parse("09/03/2024").unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidDate { ref value } if value == "09/03/2024"));
    }
}
