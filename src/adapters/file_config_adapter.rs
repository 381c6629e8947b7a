//! INI file configuration adapter.
//!
//! Keys are stored case-sensitively; per-pair sections are normalised to
//! upper case by `parse_pair_map`.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new_cs();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new_cs();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(section)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::TraderError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[trading]
pairs = BTCUSDT, ETHUSDT ,DOTUSDT
bar_limit = 500

[risk]
max_daily_loss = -0.05

[allocations]
BTCUSDT = 0.3
ETHUSDT = 0.25
DOTUSDT = 0.15
"#;

    #[test]
    fn keys_preserve_case() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.keys("allocations"),
            vec!["BTCUSDT", "DOTUSDT", "ETHUSDT"]
        );
        assert_eq!(adapter.get_double("allocations", "BTCUSDT", 0.0).unwrap(), 0.3);
    }

    #[test]
    fn keys_of_missing_section_is_empty() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(adapter.keys("volatility_multipliers").is_empty());
    }

    #[test]
    fn get_list_trims_items() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_list("trading", "pairs"),
            Some(vec![
                "BTCUSDT".to_string(),
                "ETHUSDT".to_string(),
                "DOTUSDT".to_string()
            ])
        );
        assert_eq!(adapter.get_list("trading", "missing"), None);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("trading", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_and_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("trading", "bar_limit", 0).unwrap(), 500);
        assert_eq!(adapter.get_int("trading", "missing", 42).unwrap(), 42);
    }

    #[test]
    fn get_double_negative_value() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("risk", "max_daily_loss", 0.0).unwrap(), -0.05);
    }

    #[test]
    fn get_double_rejects_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[paper]\nbalance = not_a_number\n").unwrap();
        assert!(matches!(
            adapter.get_double("paper", "balance", 99.9),
            Err(TraderError::ConfigInvalid { ref key, .. }) if key == "balance"
        ));
        assert_eq!(adapter.get_double("paper", "missing", 99.9).unwrap(), 99.9);
    }

    #[test]
    fn get_int_rejects_fractional() {
        let adapter = FileConfigAdapter::from_string("[trading]\nbar_limit = 2.5\n").unwrap();
        assert!(adapter.get_int("trading", "bar_limit", 500).is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[trading]\ndata_dir = /var/lib/ladderbot\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("trading", "data_dir"),
            Some("/var/lib/ladderbot".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/path/config.ini").is_err());
    }
}
