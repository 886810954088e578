//! # Config 模块
//!
//! 运行时配置。
//!
//! 宿主可以把它嵌入自己的配置文件（见 `host-cli` 的 `config.json`），
//! 也可以单独加载。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

/// 运行时配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// 目标帧率（每秒帧数）
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// 创建后是否处于暂停状态
    #[serde(default)]
    pub start_paused: bool,
}

fn default_frame_rate() -> f32 {
    60.0
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            start_paused: false,
        }
    }
}

impl RuntimeConfig {
    /// 从文件加载
    ///
    /// 文件不存在时返回默认配置并打印警告；读取或解析失败返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        info!(path = %path.display(), "配置文件加载成功");
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "frame_rate".to_string(),
                message: format!("必须为正数，实际为 {}", self.frame_rate),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.frame_rate, 60.0);
        assert!(!config.start_paused);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());

        let config: RuntimeConfig = serde_json::from_str(r#"{"frame_rate": 30}"#).unwrap();
        assert_eq!(config.frame_rate, 30.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = RuntimeConfig::default();
        config.frame_rate = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "frame_rate"
        ));

        config.frame_rate = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = RuntimeConfig::load("definitely/not/here/runtime.json").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }
}
