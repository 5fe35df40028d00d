//! INI file configuration adapter.

use crate::domain::error::QuantdashError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuantdashError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| QuantdashError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, QuantdashError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| QuantdashError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, QuantdashError> {
        self.config.getint(section, key).map_err(|_| {
            QuantdashError::config_invalid(section, key, format!("{key} must be an integer"))
        })
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, QuantdashError> {
        match self.config.getfloat(section, key) {
            Ok(Some(value)) if !value.is_finite() => Err(QuantdashError::config_invalid(
                section,
                key,
                format!("{key} must be a finite number"),
            )),
            Ok(value) => Ok(value),
            Err(_) => Err(QuantdashError::config_invalid(
                section,
                key,
                format!("{key} must be a number"),
            )),
        }
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
    fn from_string_parses_all_sections() {
        let content = r#"
[backtest]
initial_cash = 100000.0
risk_free_rate = 0.02
symbols = SPY,QQQ

[strategy]
name = ma_crossover
fast_period = 10

[report]
output = report.json
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_cash").unwrap(), Some(100000.0));
        assert_eq!(adapter.get_double("backtest", "risk_free_rate").unwrap(), Some(0.02));
        assert_eq!(
            adapter.get_string("backtest", "symbols"),
            Some("SPY,QQQ".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "name"),
            Some("ma_crossover".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "fast_period").unwrap(), Some(10));
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("report.json".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_cash = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn missing_numbers_are_none() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nname = x\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "missing").unwrap(), None);
        assert_eq!(adapter.get_double("strategy", "missing").unwrap(), None);
        assert_eq!(adapter.get_double("missing_section", "key").unwrap(), None);
    }

    #[test]
    fn non_numeric_int_is_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nfast_period = five\nslow_period = 2.5\n")
                .unwrap();
        let err = adapter.get_int("strategy", "fast_period").unwrap_err();
        assert!(matches!(
            err,
            QuantdashError::ConfigInvalid { section, key, .. } if section == "strategy" && key == "fast_period"
        ));
        assert!(adapter.get_int("strategy", "slow_period").is_err());
    }

    #[test]
    fn non_numeric_double_is_invalid() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nrisk_free_rate = 5%\ninitial_cash = not_a_number\n",
        )
        .unwrap();
        let err = adapter.get_double("backtest", "risk_free_rate").unwrap_err();
        assert!(matches!(
            err,
            QuantdashError::ConfigInvalid { section, key, .. } if section == "backtest" && key == "risk_free_rate"
        ));
        assert!(adapter.get_double("backtest", "initial_cash").is_err());
    }

    #[test]
    fn non_finite_double_is_invalid() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nstd_dev = inf\noversold = NaN\n")
            .unwrap();
        assert!(adapter.get_double("strategy", "std_dev").is_err());
        assert!(adapter.get_double("strategy", "oversold").is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\noutput = /tmp/out.json\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("/tmp/out.json".to_string())
        );
    }

    #[test]
    fn from_file_missing_file_is_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(QuantdashError::ConfigParse { file, .. }) if file == "/nonexistent/path/config.ini"
        ));
    }
}
