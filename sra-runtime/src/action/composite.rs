//! # Composite 模块
//!
//! 组合动作：顺序（Sequence）、并行（Group）、重复（Repeat）。
//!
//! 组合动作拥有子动作，自身只维护活跃标记；`pause` 只影响自身，
//! 子动作的进度随之冻结。优雅结束（`end(false)`）在下一次 `step` 时
//! 同步跑完所有剩余子动作，保证每个子动作的终值都被写入一次。

use tracing::trace;

use super::Action;
use super::timeline::ActivityFlags;
use crate::entity::EntityRef;

/// 把已开始的动作直接落到终值
fn land(action: &mut Action) {
    action.end(false);
    action.step(0.0);
}

/// 开始并立即落到终值
fn complete(action: &mut Action, target: &EntityRef) {
    action.begin(target);
    land(action);
}

/// 顺序执行
///
/// 同一时刻只有一个子动作在运行；前一个结束的那一帧开始下一个（但不推进它）。
#[derive(Debug, Clone)]
pub struct Sequence {
    actions: Vec<Action>,
    index: usize,
    target: Option<EntityRef>,
    flags: ActivityFlags,
}

impl Sequence {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            index: 0,
            target: None,
            flags: ActivityFlags::default(),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// 当前运行的子动作下标（全部完成后等于长度）
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn target(&self) -> Option<&EntityRef> {
        self.target.as_ref()
    }

    pub fn flags(&self) -> ActivityFlags {
        self.flags
    }

    pub fn begin(&mut self, target: &EntityRef) {
        self.target = Some(target.clone());
        self.flags.begin();
        self.index = 0;

        match self.actions.first_mut() {
            Some(first) => first.begin(target),
            None => self.flags.finish(),
        }
        trace!(len = self.actions.len(), "sequence begin");
    }

    pub fn step(&mut self, delta: f32) {
        if !self.flags.active {
            return;
        }
        let Some(target) = self.target.clone() else {
            return;
        };

        if self.flags.jump_to_end {
            self.land_remaining(&target);
            return;
        }

        let Some(current) = self.actions.get_mut(self.index) else {
            self.flags.finish();
            return;
        };
        current.step(delta);
        if !current.has_finished() {
            return;
        }

        self.index += 1;
        match self.actions.get_mut(self.index) {
            Some(next) => next.begin(&target),
            None => self.flags.finish(),
        }
    }

    fn land_remaining(&mut self, target: &EntityRef) {
        if let Some(current) = self.actions.get_mut(self.index) {
            land(current);
            self.index += 1;
        }
        for action in self.actions.iter_mut().skip(self.index) {
            complete(action, target);
        }
        self.index = self.actions.len();
        self.flags.finish();
    }

    pub fn has_finished(&self) -> bool {
        self.flags.finished || self.index >= self.actions.len()
    }

    pub fn end(&mut self, interrupt: bool) {
        if interrupt && let Some(current) = self.actions.get_mut(self.index) {
            current.end(true);
        }
        self.flags.end(interrupt);
    }

    pub fn pause(&mut self) {
        self.flags.pause();
    }

    pub fn resume(&mut self) {
        self.flags.resume();
    }
}

/// 并行执行
///
/// 所有子动作同时开始，按注册顺序推进；全部结束后 Group 结束。
#[derive(Debug, Clone)]
pub struct Group {
    actions: Vec<Action>,
    /// 仍在运行的子动作下标（保持注册顺序）
    running: Vec<usize>,
    target: Option<EntityRef>,
    flags: ActivityFlags,
}

impl Group {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            running: Vec::new(),
            target: None,
            flags: ActivityFlags::default(),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn target(&self) -> Option<&EntityRef> {
        self.target.as_ref()
    }

    pub fn flags(&self) -> ActivityFlags {
        self.flags
    }

    pub fn begin(&mut self, target: &EntityRef) {
        self.target = Some(target.clone());
        self.flags.begin();

        for action in &mut self.actions {
            action.begin(target);
        }
        self.running = (0..self.actions.len()).collect();
        if self.running.is_empty() {
            self.flags.finish();
        }
        trace!(len = self.actions.len(), "group begin");
    }

    pub fn step(&mut self, delta: f32) {
        if !self.flags.active {
            return;
        }

        let actions = &mut self.actions;
        if self.flags.jump_to_end {
            for &i in &self.running {
                land(&mut actions[i]);
            }
            self.running.clear();
        } else {
            self.running.retain(|&i| {
                let action = &mut actions[i];
                action.step(delta);
                !action.has_finished()
            });
        }

        if self.running.is_empty() {
            self.flags.finish();
        }
    }

    pub fn has_finished(&self) -> bool {
        self.flags.finished || self.running.is_empty()
    }

    pub fn end(&mut self, interrupt: bool) {
        if interrupt {
            for &i in &self.running {
                self.actions[i].end(true);
            }
        }
        self.flags.end(interrupt);
    }

    pub fn pause(&mut self) {
        self.flags.pause();
    }

    pub fn resume(&mut self) {
        self.flags.resume();
    }
}

/// 剩余播放次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    Times(u32),
    Forever,
}

impl RepeatCount {
    /// 额外重复 `repeats` 次；负数表示无限
    pub fn from_repeats(repeats: i32) -> Self {
        if repeats < 0 {
            Self::Forever
        } else {
            Self::Times(repeats.unsigned_abs() + 1)
        }
    }
}

/// 重复执行
#[derive(Debug, Clone)]
pub struct Repeat {
    inner: Box<Action>,
    repeats: i32,
    remaining: RepeatCount,
    target: Option<EntityRef>,
    flags: ActivityFlags,
}

impl Repeat {
    /// `repeats` 为额外重复次数：`0` 播放一次，`2` 播放三次，负数无限
    pub fn new(inner: Action, repeats: i32) -> Self {
        Self {
            inner: Box::new(inner),
            repeats,
            remaining: RepeatCount::from_repeats(repeats),
            target: None,
            flags: ActivityFlags::default(),
        }
    }

    pub fn inner(&self) -> &Action {
        &self.inner
    }

    pub fn remaining(&self) -> RepeatCount {
        self.remaining
    }

    pub fn target(&self) -> Option<&EntityRef> {
        self.target.as_ref()
    }

    pub fn flags(&self) -> ActivityFlags {
        self.flags
    }

    pub fn begin(&mut self, target: &EntityRef) {
        self.target = Some(target.clone());
        self.flags.begin();
        self.remaining = RepeatCount::from_repeats(self.repeats);
        self.inner.begin(target);
        trace!(repeats = self.repeats, "repeat begin");
    }

    pub fn step(&mut self, delta: f32) {
        if !self.flags.active {
            return;
        }
        let Some(target) = self.target.clone() else {
            return;
        };

        if self.flags.jump_to_end {
            land(&mut self.inner);
            if let RepeatCount::Times(left) = self.remaining {
                for _ in 1..left {
                    complete(&mut self.inner, &target);
                }
            }
            self.remaining = RepeatCount::Times(0);
            self.flags.finish();
            return;
        }

        self.inner.step(delta);
        if !self.inner.has_finished() {
            return;
        }

        match self.remaining {
            RepeatCount::Forever => self.inner.begin(&target),
            RepeatCount::Times(left) => {
                let left = left.saturating_sub(1);
                self.remaining = RepeatCount::Times(left);
                if left > 0 {
                    self.inner.begin(&target);
                } else {
                    self.flags.finish();
                }
            }
        }
    }

    pub fn has_finished(&self) -> bool {
        self.flags.finished
    }

    pub fn end(&mut self, interrupt: bool) {
        if interrupt {
            self.inner.end(true);
        }
        self.flags.end(interrupt);
    }

    pub fn pause(&mut self) {
        self.flags.pause();
    }

    pub fn resume(&mut self) {
        self.flags.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::LeafAction;
    use crate::entity::Entity;
    use crate::geometry::Vector2;

    fn target() -> EntityRef {
        EntityRef::new(Entity::new())
    }

    fn origin(entity: &EntityRef) -> Vector2 {
        entity.borrow().rect.origin
    }

    #[test]
    fn test_sequence_runs_in_order() {
        let entity = target();
        let mut seq = Sequence::new([
            LeafAction::move_to(1.0, Vector2::new(10.0, 0.0)).into(),
            LeafAction::move_to(1.0, Vector2::new(10.0, 10.0)).into(),
            LeafAction::move_to(1.0, Vector2::new(0.0, 10.0)).into(),
        ]);
        seq.begin(&entity);

        seq.step(1.0);
        assert_eq!(origin(&entity), Vector2::new(10.0, 0.0));
        assert_eq!(seq.current_index(), 1);
        seq.step(0.5);
        assert_eq!(origin(&entity), Vector2::new(10.0, 5.0));
        seq.step(0.5);
        seq.step(1.0);
        assert_eq!(origin(&entity), Vector2::new(0.0, 10.0));
        assert!(seq.has_finished());
    }

    #[test]
    fn test_empty_composites_finish_on_begin() {
        let entity = target();
        let mut seq = Sequence::new([]);
        seq.begin(&entity);
        assert!(seq.has_finished());

        let mut group = Group::new([]);
        group.begin(&entity);
        assert!(group.has_finished());
    }

    #[test]
    fn test_sequence_graceful_end_lands_every_action() {
        let entity = target();
        let mut seq = Sequence::new([
            LeafAction::move_by(1.0, Vector2::new(1.0, 0.0)).into(),
            LeafAction::move_by(1.0, Vector2::new(0.0, 2.0)).into(),
            LeafAction::fade_to(1.0, 0.0).into(),
        ]);
        seq.begin(&entity);
        seq.step(0.5);
        seq.end(false);
        seq.step(0.0);

        assert!(seq.has_finished());
        assert_eq!(origin(&entity), Vector2::new(1.0, 2.0));
        assert_eq!(entity.borrow().opacity, 0.0);
    }

    #[test]
    fn test_group_runs_in_parallel() {
        let entity = target();
        let mut group = Group::new([
            LeafAction::move_to(1.0, Vector2::new(10.0, 0.0)).into(),
            LeafAction::fade_to(2.0, 0.0).into(),
            LeafAction::delay(3.0).into(),
        ]);
        group.begin(&entity);
        assert_eq!(group.running_count(), 3);

        group.step(1.0);
        assert_eq!(group.running_count(), 2);
        assert_eq!(entity.borrow().opacity, 0.5);
        group.step(1.0);
        assert_eq!(group.running_count(), 1);
        assert!(!group.has_finished());
        group.step(1.0);
        assert!(group.has_finished());
    }

    #[test]
    fn test_group_graceful_end() {
        let entity = target();
        let mut group = Group::new([
            LeafAction::move_to(1.0, Vector2::new(10.0, 0.0)).into(),
            LeafAction::fade_to(2.0, 0.0).into(),
        ]);
        group.begin(&entity);
        group.step(0.5);
        group.end(false);
        group.step(0.0);

        assert!(group.has_finished());
        assert_eq!(origin(&entity), Vector2::new(10.0, 0.0));
        assert_eq!(entity.borrow().opacity, 0.0);
    }

    #[test]
    fn test_group_adjacent_members_finish_in_same_step() {
        let entity = target();
        let mut group = Group::new([
            LeafAction::delay(0.0).into(),
            LeafAction::delay(0.0).into(),
            LeafAction::move_by(1.0, Vector2::new(4.0, 0.0)).into(),
        ]);
        group.begin(&entity);

        group.step(0.5);
        assert_eq!(group.running_count(), 1);
        // 后面的成员既没有被跳过，也没有被推进两次
        assert_eq!(origin(&entity), Vector2::new(2.0, 0.0));

        group.step(0.5);
        assert!(group.has_finished());
        assert_eq!(origin(&entity), Vector2::new(4.0, 0.0));
    }

    #[test]
    fn test_repeat_plays_one_plus_count_times() {
        let entity = target();
        let mut repeat = Repeat::new(LeafAction::move_by(1.0, Vector2::new(1.0, 0.0)).into(), 2);
        repeat.begin(&entity);

        for _ in 0..2 {
            repeat.step(1.0);
            assert!(!repeat.has_finished());
        }
        repeat.step(1.0);
        assert!(repeat.has_finished());
        assert_eq!(origin(&entity), Vector2::new(3.0, 0.0));
    }

    #[test]
    fn test_repeat_graceful_end_completes_remaining_cycles() {
        let entity = target();
        let mut repeat = Repeat::new(LeafAction::move_by(1.0, Vector2::new(1.0, 0.0)).into(), 3);
        repeat.begin(&entity);
        repeat.step(1.0);
        repeat.step(0.5);
        repeat.end(false);
        repeat.step(0.0);

        assert!(repeat.has_finished());
        assert_eq!(repeat.remaining(), RepeatCount::Times(0));
        assert_eq!(origin(&entity), Vector2::new(4.0, 0.0));
    }

    #[test]
    fn test_forever_repeat_needs_explicit_end() {
        let entity = target();
        let mut repeat = Repeat::new(LeafAction::delay(0.5).into(), -1);
        repeat.begin(&entity);
        for _ in 0..100 {
            repeat.step(0.5);
        }
        assert!(!repeat.has_finished());

        repeat.end(false);
        repeat.step(0.0);
        assert!(repeat.has_finished());
    }

    #[test]
    fn test_repeat_begin_resets_count() {
        let entity = target();
        let mut repeat = Repeat::new(LeafAction::delay(1.0).into(), 1);
        repeat.begin(&entity);
        repeat.step(1.0);
        assert_eq!(repeat.remaining(), RepeatCount::Times(1));

        repeat.begin(&entity);
        assert_eq!(repeat.remaining(), RepeatCount::Times(2));
    }

    #[test]
    fn test_paused_composite_freezes_children() {
        let entity = target();
        let mut seq = Sequence::new([LeafAction::fade_to(2.0, 0.0).into()]);
        seq.begin(&entity);
        seq.step(1.0);
        seq.pause();
        seq.step(1.0);
        assert_eq!(entity.borrow().opacity, 0.5);

        seq.resume();
        seq.step(1.0);
        assert_eq!(entity.borrow().opacity, 0.0);
        assert!(seq.has_finished());
    }

    #[test]
    fn test_interrupt_abandons_children() {
        let entity = target();
        let mut group = Group::new([LeafAction::fade_to(2.0, 0.0).into()]);
        group.begin(&entity);
        group.step(1.0);
        group.end(true);
        group.step(1.0);

        assert!(group.has_finished());
        assert_eq!(entity.borrow().opacity, 0.5);
        assert!(group.actions()[0].has_finished());
    }
}
