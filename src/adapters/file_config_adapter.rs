//! INI file configuration adapter.

use crate::domain::error::NavError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::debug;

/// Section and key names are case-sensitive, so `[auth]` usernames keep their case.
#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, NavError> {
        let path = path.as_ref();
        let mut config = Ini::new_cs();
        config.load(path).map_err(|reason| NavError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        debug!(file = %path.display(), "config loaded");
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

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
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
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[analytics]
seed = 42

[market]
min_nav = 50
max_nav = 5000

[portfolio]
file = holdings.csv
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("portfolio", "file"),
            Some("holdings.csv".to_string())
        );
        assert_eq!(adapter.get_int("analytics", "seed", 0), 42);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[market]\nmin_nav = 50\n").unwrap();
        assert_eq!(adapter.get_string("market", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[market]\nbackfill_min = abc\n").unwrap();
        assert_eq!(adapter.get_int("market", "backfill_min", 10), 10);
        assert_eq!(adapter.get_int("market", "backfill_max", 20), 20);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter = FileConfigAdapter::from_string("[market]\nrefresh_step = 0.05\n").unwrap();
        assert_eq!(adapter.get_double("market", "refresh_step", 0.0), 0.05);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[market]\nmin_nav = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("market", "min_nav", 50.0), 50.0);
    }

    #[test]
    fn keys_keep_their_case() {
        let adapter = FileConfigAdapter::from_string("[auth]\nAlice = x\nbob = y\n").unwrap();
        assert_eq!(adapter.keys("auth"), vec!["Alice", "bob"]);
        assert_eq!(adapter.get_string("auth", "Alice"), Some("x".to_string()));
        assert_eq!(adapter.get_string("auth", "alice"), None);
    }

    #[test]
    fn keys_lists_section_entries() {
        let content = "[auth]\nbob = x\nalice = y\n";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.keys("auth"), vec!["alice", "bob"]);
        assert!(adapter.keys("missing").is_empty());
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let content = "[auth]\nadmin = $argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA\n";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("auth", "admin"),
            Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string())
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[portfolio]\nfile = /data/holdings.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("portfolio", "file"),
            Some("/data/holdings.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/navwatch.ini");
        match result {
            Err(NavError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/navwatch.ini")
            }
            _ => panic!("expected ConfigParse error"),
        }
    }
}
