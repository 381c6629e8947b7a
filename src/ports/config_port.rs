//! Configuration access port trait.

use crate::domain::error::TraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// All keys present in `section`, sorted. Empty when the section is absent.
    fn keys(&self, section: &str) -> Vec<String>;

    /// `default` when the key is absent; `ConfigInvalid` when it is present
    /// but not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TraderError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| TraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got '{raw}'"),
            }),
        }
    }

    /// Integer counterpart of [`ConfigPort::get_double`].
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TraderError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| TraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected an integer, got '{raw}'"),
            }),
        }
    }

    /// Comma-separated list value, trimmed, empty items dropped.
    fn get_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        self.get_string(section, key).map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }
}
