//! # Error 模块
//!
//! 定义 sra-runtime 中使用的错误类型。

use std::path::PathBuf;

use thiserror::Error;

/// 参数错误
///
/// 目前只在构造 [`TimingFunction`](crate::TimingFunction) 时产生，
/// 原样返回给调用方，不做任何恢复。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// 控制点数量不是 4
    #[error("TimingFunction 需要 4 个控制值，实际为 {count} 个")]
    WrongArity { count: usize },

    /// 控制值为 NaN 或无穷大
    #[error("TimingFunction 第 {index} 个控制值不是有限数: {value}")]
    NonFinite { index: usize, value: f32 },

    /// x 控制点超出 [0, 1]
    #[error("TimingFunction 的 x{which} 必须位于 [0, 1] 区间，实际为 {value}")]
    ControlPointOutOfRange { which: u8, value: f32 },
}

/// 场景描述错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescError {
    /// JSON 解析失败
    #[error("场景描述解析失败: {message}")]
    Parse { message: String },

    /// 未知的缓动预设名
    #[error("未知的缓动函数 '{name}'")]
    UnknownTiming { name: String },

    /// 缓动函数参数无效
    #[error("缓动函数参数无效: {0}")]
    Timing(#[from] ArgumentError),

    /// rate 必须为正数
    #[error("动作的 rate 必须大于 0，实际为 {rate}")]
    InvalidRate { rate: f32 },

    /// 帧动画没有任何帧
    #[error("sprite 动作至少需要一帧")]
    EmptyFrames,
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件格式错误
    #[error("配置文件 {path:?} 格式错误: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 配置值无效
    #[error("配置项 '{field}' 无效: {message}")]
    Invalid { field: String, message: String },
}

/// sra-runtime 统一错误类型
#[derive(Error, Debug)]
pub enum SraError {
    /// 参数错误
    #[error("参数错误: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// 场景描述错误
    #[error("场景描述错误: {0}")]
    Desc(#[from] DescError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 读取文件失败
    #[error("读取文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result 类型别名
pub type SraResult<T> = Result<T, SraError>;
