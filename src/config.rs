use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub intake: IntakeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单次上传请求体上限 (字节)
    pub max_request_bytes: usize,
}

/// 批量导入流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub batch_size: usize,
    /// 单文件大小上限 (字节)
    pub max_file_size: u64,
    /// 批次间暂停，0 表示不暂停
    pub batch_pause_ms: u64,
    pub file_timeout_ms: Option<u64>,
    pub simulate_latency: bool,
    pub pdf_success_rate: f64,
    pub spreadsheet_success_rate: f64,
}

pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_request_bytes: 64 * 1024 * 1024,
            },
            intake: IntakeConfig::default(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            batch_pause_ms: 50,
            file_timeout_ms: None,
            simulate_latency: true,
            pdf_success_rate: 0.8,
            spreadsheet_success_rate: 0.9,
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置 (前缀 INTAKE，层级分隔符 __)
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(
                config::Environment::with_prefix("INTAKE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intake.batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "intake.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        for (key, rate) in [
            ("intake.pdf_success_rate", self.intake.pdf_success_rate),
            ("intake.spreadsheet_success_rate", self.intake.spreadsheet_success_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("{} is outside [0, 1]", rate),
                });
            }
        }
        Ok(())
    }
}

impl IntakeConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn file_timeout(&self) -> Option<Duration> {
        self.file_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_limits() {
        let config = AppConfig::default();
        assert_eq!(config.intake.batch_size, 3);
        assert_eq!(config.intake.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.intake.batch_pause(), Duration::from_millis(50));
        assert_eq!(config.intake.file_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_size_and_bad_rates() {
        let mut config = AppConfig::default();
        config.intake.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "intake.batch_size", .. })
        ));

        let mut config = AppConfig::default();
        config.intake.pdf_success_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "intake.pdf_success_rate", .. })
        ));
    }
}
