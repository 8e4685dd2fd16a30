//! Validation helpers used when building commands

use super::types::{Error, Result};
use std::fmt;

/// Functional validation utilities
pub struct Validate;

impl Validate {
    /// Validate that a string is not empty
    pub fn not_empty(value: &str, field_name: &str) -> Result<()> {
        if value.trim().is_empty() {
            Err(Error::Configuration {
                message: format!("{field_name} cannot be empty"),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value was provided
    pub fn present<T>(value: Option<T>, field_name: &str) -> Result<T> {
        value.ok_or_else(|| Error::Configuration {
            message: format!("{field_name} must be set before build()"),
        })
    }

    /// Validate that a number is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<T>
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(Error::Configuration {
                message: format!("{field_name} value {value} is not in range [{min}, {max}]"),
            })
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_rejects_blank_values() {
        assert!(Validate::not_empty("Test", "group key").is_ok());

        let err = Validate::not_empty("  ", "group key").unwrap_err();
        assert!(err.to_string().contains("group key cannot be empty"));
    }

    #[test]
    fn test_present_reports_missing_field() {
        assert_eq!(Validate::present(Some(3), "work closure").unwrap(), 3);

        let err = Validate::present::<u8>(None, "work closure").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("work closure must be set"));
    }

    #[test]
    fn test_in_range_bounds_are_inclusive() {
        assert_eq!(Validate::in_range(0, 0, 100, "pct").unwrap(), 0);
        assert_eq!(Validate::in_range(100, 0, 100, "pct").unwrap(), 100);
        assert!(Validate::in_range(101, 0, 100, "pct").is_err());
    }
}
