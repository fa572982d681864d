// Settings validation

use crate::{ConfigError, Result};

/// Types that can check their own invariants after loading.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    /// Key and cookie templates carry exactly one `%s` for the entity name.
    pub fn single_placeholder(template: &str, field: &str) -> Result<()> {
        match template.matches("%s").count() {
            1 => Ok(()),
            n => Err(ConfigError::ValidationError(format!(
                "{} must contain exactly one %s placeholder, found {}",
                field, n
            ))),
        }
    }
}
