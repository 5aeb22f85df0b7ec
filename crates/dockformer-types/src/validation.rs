//! Input validation for logical container names

use crate::error::{Result, TypesError};
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("name pattern is valid"));

/// Validates logical names against the runtime's container naming rules
pub struct ContainerNameValidator {
    max_length: usize,
    pattern: &'static Regex,
}

impl Default for ContainerNameValidator {
    fn default() -> Self {
        Self {
            max_length: 128,
            pattern: &NAME_PATTERN,
        }
    }
}

impl ContainerNameValidator {
    pub fn validate(&self, name: &str) -> Result<()> {
        if name.len() > self.max_length {
            return Err(TypesError::InvalidName {
                name: name.to_owned(),
                reason: format!("must be at most {} characters long", self.max_length),
            });
        }

        if !self.pattern.is_match(name) {
            return Err(TypesError::InvalidName {
                name: name.to_owned(),
                reason: "must start with a letter or digit and contain only letters, digits, '_', '.' and '-'"
                    .to_owned(),
            });
        }

        Ok(())
    }
}
