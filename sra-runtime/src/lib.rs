//! # SRA Runtime
//!
//! 轻量 2D 场景 / 动画运行时的核心库。
//!
//! ## 架构概述
//!
//! `sra-runtime` 是纯逻辑核心，不依赖任何 IO 或图形 API。
//! 宿主（Host）负责计时和实际绘制：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── tick(&mut dyn RenderContext) ►│ 计算 delta
//!   │                                   │ ActionManager::advance
//!   │                                   │ Scheduler::advance
//!   │◄─── save/translate/fill_rect/... ─│ 栈顶场景 visit
//!   │◄─── TickStatus ───────────────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`Controller`]：每帧调度中心，持有场景栈、动作管理器、回调表
//! - [`EntityRef`]：场景树节点句柄
//! - [`Action`]：随时间修改实体属性的动作
//! - [`TimingFunction`]：缓动曲线
//! - [`RenderContext`]：绘制层接口
//!
//! ## 使用示例
//!
//! ```ignore
//! use sra_runtime::{Controller, Entity, EntityRef, LeafAction, RecordingContext, Vector2};
//!
//! let mut controller = Controller::default();
//! let scene = EntityRef::new(Entity::new());
//! controller.push_scene(scene.clone());
//! controller.run_action(&scene, LeafAction::move_to(1.0, Vector2::new(100.0, 0.0)));
//!
//! let mut ctx = RecordingContext::new();
//! while controller.run_loop().is_running() {
//!     controller.tick(&mut ctx);
//!     // sleep(tick_interval)
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`geometry`] / [`color`]：几何与颜色
//! - [`timing`]：缓动函数
//! - [`action`]：动作与动作管理器
//! - [`entity`]：实体树、遍历与绘制接口
//! - [`dispatch`]：每帧回调与运行循环状态
//! - [`controller`]：控制器
//! - [`desc`]：JSON 场景描述
//! - [`config`] / [`error`]：配置与错误类型

pub mod action;
pub mod color;
pub mod config;
pub mod controller;
pub mod desc;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod timing;

// 重导出核心类型
pub use action::{
    Action, ActionId, ActionManager, ActivityFlags, Goal, Group, LeafAction, Repeat, RepeatCount,
    ScalarChannel, Sequence, VectorChannel,
};
pub use color::Color;
pub use config::RuntimeConfig;
pub use controller::{Controller, StopReason, TickStatus};
pub use desc::{ActionDesc, ActionKindDesc, EntityDesc, LoadedScene, SceneDesc, TimingDesc};
pub use dispatch::{RunLoop, Scheduler, tick_interval_for};
pub use entity::{
    ContentMode, DrawCall, DrawHook, Entity, EntityRef, RecordingContext, RenderContext, Sprite,
};
pub use error::{ArgumentError, ConfigError, DescError, SraError, SraResult};
pub use geometry::{Rect, Size, Vector2, degrees_to_radians, radians_to_degrees};
pub use timing::TimingFunction;
