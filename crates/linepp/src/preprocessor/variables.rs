//! Variable table

use std::collections::HashMap;

use crate::common::{PreprocessError, PreprocessResult};

/// Whether `name` is a legal variable name: letters, digits, `-`, `.` and `_`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// Case-sensitive mapping of variable names to values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable; values are stored through `to_string`,
    /// so booleans become `true`/`false`
    pub fn set(&mut self, name: &str, value: impl ToString) -> PreprocessResult<()> {
        if !is_valid_name(name) {
            return Err(PreprocessError::invalid_argument(format!(
                "invalid variable name `{name}`"
            )));
        }
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<HashMap<String, String>> for VariableTable {
    type Error = PreprocessError;

    fn try_from(values: HashMap<String, String>) -> PreprocessResult<Self> {
        if let Some(name) = values.keys().find(|name| !is_valid_name(name)) {
            return Err(PreprocessError::invalid_argument(format!(
                "invalid variable name `{name}`"
            )));
        }
        Ok(Self { values })
    }
}
