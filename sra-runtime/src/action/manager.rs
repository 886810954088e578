//! # Manager 模块
//!
//! 持有所有正在运行的顶层动作，每帧统一推进并回收已结束的动作。

use std::fmt;

use tracing::{trace, warn};

use super::Action;
use crate::entity::EntityRef;

/// 动作句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u64);

impl ActionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// 动作管理器
///
/// 动作按添加顺序推进。
pub struct ActionManager {
    actions: Vec<(ActionId, Action)>,
    next_id: u64,
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionManager")
            .field("actions", &self.actions.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl ActionManager {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            next_id: 1,
        }
    }

    fn next_action_id(&mut self) -> ActionId {
        let id = ActionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// 开始动作并交给管理器
    ///
    /// 没有目标时忽略，返回 `None`。
    pub fn add_action(
        &mut self,
        action: impl Into<Action>,
        target: Option<&EntityRef>,
    ) -> Option<ActionId> {
        let action = action.into();
        let Some(target) = target else {
            warn!(kind = action.kind_name(), "忽略没有目标的动作");
            return None;
        };
        Some(self.start_action(action, target))
    }

    /// 目标确定时的 [`add_action`](Self::add_action)
    pub fn start_action(&mut self, action: impl Into<Action>, target: &EntityRef) -> ActionId {
        let mut action = action.into();
        action.begin(target);
        let id = self.next_action_id();
        trace!(id = %id, kind = action.kind_name(), "add action");
        self.actions.push((id, action));
        id
    }

    /// 按句柄移除；未知句柄返回 `false`
    pub fn remove_action(&mut self, id: ActionId) -> bool {
        let before = self.actions.len();
        self.actions.retain(|(existing, _)| *existing != id);
        self.actions.len() != before
    }

    /// 推进所有动作，并在同一趟中移除已结束的
    pub fn advance(&mut self, delta: f32) {
        self.actions.retain_mut(|(id, action)| {
            action.step(delta);
            let finished = action.has_finished();
            if finished {
                trace!(id = %id, kind = action.kind_name(), "action finished");
            }
            !finished
        });
    }

    pub fn pause_action(&mut self, id: ActionId) -> bool {
        self.with_action(id, Action::pause)
    }

    pub fn resume_action(&mut self, id: ActionId) -> bool {
        self.with_action(id, Action::resume)
    }

    /// `interrupt = false` 时在下一次 `advance` 落到终值
    pub fn end_action(&mut self, id: ActionId, interrupt: bool) -> bool {
        self.with_action(id, |action| action.end(interrupt))
    }

    fn with_action(&mut self, id: ActionId, f: impl FnOnce(&mut Action)) -> bool {
        match self.action_mut(id) {
            Some(action) => {
                f(action);
                true
            }
            None => false,
        }
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, action)| action)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.actions
            .iter_mut()
            .find(|(existing, _)| *existing == id)
            .map(|(_, action)| action)
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.action(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 所有句柄（添加顺序）
    pub fn ids(&self) -> Vec<ActionId> {
        self.actions.iter().map(|(id, _)| *id).collect()
    }

    /// 移除针对某实体的所有动作，返回移除数量
    pub fn remove_actions_for(&mut self, target: &EntityRef) -> usize {
        let before = self.actions.len();
        self.actions
            .retain(|(_, action)| !action.target().is_some_and(|t| t.ptr_eq(target)));
        before - self.actions.len()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
