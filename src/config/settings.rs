use crate::domain::ports::ConfigProvider;
use crate::utils::error::{InetdError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_INETD_CONF: &str = "/etc/inetd.conf";
pub const DEFAULT_SERVICES_FILE: &str = "/etc/services";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// 守護程式設定；優先順序：預設值 < 設定檔 < 命令列
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inetd: InetdSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InetdSettings {
    pub file: String,
    pub services_file: String,
    pub no_internal: bool,
    pub bind_address: String,
}

impl Default for InetdSettings {
    fn default() -> Self {
        Self {
            file: DEFAULT_INETD_CONF.to_string(),
            services_file: DEFAULT_SERVICES_FILE.to_string(),
            no_internal: false,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub verbose: bool,
    pub json: bool,
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InetdError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InetdError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INETD_CONF})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| InetdError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("inetd.file", &self.inetd.file)?;
        validation::validate_path("inetd.services_file", &self.inetd.services_file)?;
        validation::validate_non_empty_string("inetd.bind_address", &self.inetd.bind_address)?;
        validation::validate_ip_addr("inetd.bind_address", &self.inetd.bind_address)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn inetd_conf_path(&self) -> &str {
        &self.inetd.file
    }

    fn services_path(&self) -> &str {
        &self.inetd.services_file
    }

    fn internal_services_enabled(&self) -> bool {
        !self.inetd.no_internal
    }

    fn bind_address(&self) -> &str {
        &self.inetd.bind_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.inetd_conf_path(), "/etc/inetd.conf");
        assert_eq!(settings.services_path(), "/etc/services");
        assert!(settings.internal_services_enabled());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
[inetd]
no_internal = true
"#,
        )
        .unwrap();

        assert!(!settings.internal_services_enabled());
        assert_eq!(settings.inetd.file, DEFAULT_INETD_CONF);
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SMALL_INETD_TEST_CONF", "/srv/inetd.conf");

        let settings = Settings::from_toml_str(
            r#"
[inetd]
file = "${SMALL_INETD_TEST_CONF}"
"#,
        )
        .unwrap();
        assert_eq!(settings.inetd.file, "/srv/inetd.conf");

        std::env::remove_var("SMALL_INETD_TEST_CONF");
    }

    #[test]
    fn test_invalid_bind_address() {
        let settings = Settings::from_toml_str(
            r#"
[inetd]
bind_address = "not-an-ip"
"#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Settings::from_toml_str("[inetd\nfile = 1"),
            Err(InetdError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nverbose = true\njson = true\n")
            .unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert!(settings.logging.verbose);
        assert!(settings.logging.json);
    }
}
