//! # Config 模块
//!
//! 宿主配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (demos/config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sra_runtime::RuntimeConfig;

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 运行时配置（帧率等）
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// 场景描述文件
    #[serde(default = "default_scene_path")]
    pub scene_path: PathBuf,

    /// 资源根目录，精灵 key 相对于此目录
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    /// 最多运行的帧数
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    /// 日志级别（trace / debug / info / warn / error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 是否把每帧的绘制指令打印到 stdout
    #[serde(default)]
    pub print_draw_calls: bool,
}

// 默认值函数
fn default_scene_path() -> PathBuf {
    PathBuf::from("demos/scenes/demo.json")
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("demos/assets")
}

fn default_ticks() -> u32 {
    180
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            scene_path: default_scene_path(),
            assets_root: default_assets_root(),
            ticks: default_ticks(),
            log_level: default_log_level(),
            print_draw_calls: false,
        }
    }
}

impl HostConfig {
    /// 读取配置文件
    ///
    /// 文件不存在时返回 `Ok(None)`，由调用方决定是否使用默认配置；
    /// 读取或解析失败返回错误。
    pub fn read(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
        Ok(Some(config))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> anyhow::Result<()> {
        self.runtime.validate()?;
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow::anyhow!("未知的日志级别: {}", self.log_level))?;
        Ok(())
    }
}
