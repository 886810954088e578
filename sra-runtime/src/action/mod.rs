//! # Action 模块
//!
//! 随时间修改实体属性的动作系统。
//!
//! ## 生命周期
//!
//! ```text
//! 构造（未绑定） ──begin(target)──► 活跃 ──step(delta)...──► 结束
//!                                  │  ▲
//!                           pause  │  │ resume
//!                                  ▼  │
//!                                  暂停
//! ```
//!
//! - `end(false)`：下一次 `step` 跳到终值后结束
//! - `end(true)`：立即结束，属性停在当前值
//!
//! 结束的动作由 [`ActionManager`] 移除，不会被重用。
//!
//! ## 组成
//!
//! - [`LeafAction`]：移动 / 旋转 / 缩放 / 淡入淡出 / 帧动画 / 延时
//! - [`Sequence`] / [`Group`] / [`Repeat`]：组合动作

mod composite;
mod leaf;
mod manager;
mod timeline;

pub use composite::{Group, Repeat, RepeatCount, Sequence};
pub use leaf::{Goal, LeafAction, ScalarChannel, VectorChannel};
pub use manager::{ActionId, ActionManager};
pub use timeline::{ActivityFlags, Progress, Timeline};

use crate::entity::EntityRef;

/// 动作
#[derive(Debug, Clone)]
pub enum Action {
    Leaf(LeafAction),
    Sequence(Sequence),
    Group(Group),
    Repeat(Repeat),
}

impl Action {
    pub fn sequence(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::Sequence(Sequence::new(actions))
    }

    pub fn group(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::Group(Group::new(actions))
    }

    /// 额外重复 `repeats` 次（负数无限）
    pub fn repeat(inner: impl Into<Action>, repeats: i32) -> Self {
        Self::Repeat(Repeat::new(inner.into(), repeats))
    }

    pub fn repeat_forever(inner: impl Into<Action>) -> Self {
        Self::repeat(inner, -1)
    }

    /// 绑定目标并开始
    pub fn begin(&mut self, target: &EntityRef) {
        match self {
            Self::Leaf(a) => a.begin(target),
            Self::Sequence(a) => a.begin(target),
            Self::Group(a) => a.begin(target),
            Self::Repeat(a) => a.begin(target),
        }
    }

    /// 推进 `delta` 秒；未激活时不做任何事
    pub fn step(&mut self, delta: f32) {
        match self {
            Self::Leaf(a) => a.step(delta),
            Self::Sequence(a) => a.step(delta),
            Self::Group(a) => a.step(delta),
            Self::Repeat(a) => a.step(delta),
        }
    }

    pub fn has_finished(&self) -> bool {
        match self {
            Self::Leaf(a) => a.has_finished(),
            Self::Sequence(a) => a.has_finished(),
            Self::Group(a) => a.has_finished(),
            Self::Repeat(a) => a.has_finished(),
        }
    }

    pub fn end(&mut self, interrupt: bool) {
        match self {
            Self::Leaf(a) => a.end(interrupt),
            Self::Sequence(a) => a.end(interrupt),
            Self::Group(a) => a.end(interrupt),
            Self::Repeat(a) => a.end(interrupt),
        }
    }

    pub fn pause(&mut self) {
        match self {
            Self::Leaf(a) => a.pause(),
            Self::Sequence(a) => a.pause(),
            Self::Group(a) => a.pause(),
            Self::Repeat(a) => a.pause(),
        }
    }

    pub fn resume(&mut self) {
        match self {
            Self::Leaf(a) => a.resume(),
            Self::Sequence(a) => a.resume(),
            Self::Group(a) => a.resume(),
            Self::Repeat(a) => a.resume(),
        }
    }

    pub fn flags(&self) -> ActivityFlags {
        match self {
            Self::Leaf(a) => a.flags(),
            Self::Sequence(a) => a.flags(),
            Self::Group(a) => a.flags(),
            Self::Repeat(a) => a.flags(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.flags().active
    }

    /// `begin` 之前为 `None`
    pub fn target(&self) -> Option<&EntityRef> {
        match self {
            Self::Leaf(a) => a.target(),
            Self::Sequence(a) => a.target(),
            Self::Group(a) => a.target(),
            Self::Repeat(a) => a.target(),
        }
    }

    /// 用于日志
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Leaf(a) => a.name(),
            Self::Sequence(_) => "sequence",
            Self::Group(_) => "group",
            Self::Repeat(_) => "repeat",
        }
    }
}

impl From<LeafAction> for Action {
    fn from(action: LeafAction) -> Self {
        Self::Leaf(action)
    }
}

impl From<Sequence> for Action {
    fn from(action: Sequence) -> Self {
        Self::Sequence(action)
    }
}

impl From<Group> for Action {
    fn from(action: Group) -> Self {
        Self::Group(action)
    }
}

impl From<Repeat> for Action {
    fn from(action: Repeat) -> Self {
        Self::Repeat(action)
    }
}
