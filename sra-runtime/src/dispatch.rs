//! # Dispatch 模块
//!
//! 每帧回调（[`Scheduler`]）与固定帧率运行循环的状态（[`RunLoop`]）。
//!
//! 运行循环只记录帧间隔和运行标记，真正的计时（sleep / 系统定时器）由宿主实现。

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::entity::EntityRef;

/// 每帧回调：`(target, delta)`
pub type TickCallback = Box<dyn FnMut(&EntityRef, f32)>;

/// 每帧回调表
///
/// 回调按注册顺序调用。同一实体可以注册多个回调。
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<(EntityRef, TickCallback)>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, target: &EntityRef, callback: impl FnMut(&EntityRef, f32) + 'static) {
        self.entries.push((target.clone(), Box::new(callback)));
    }

    /// 移除该实体的第一个回调；没有时返回 `false`
    pub fn unschedule(&mut self, target: &EntityRef) -> bool {
        match self.entries.iter().position(|(t, _)| t.ptr_eq(target)) {
            Some(index) => {
                drop(self.entries.remove(index));
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, target: &EntityRef) -> bool {
        self.entries.iter().any(|(t, _)| t.ptr_eq(target))
    }

    pub fn advance(&mut self, delta: f32) {
        for (target, callback) in &mut self.entries {
            callback(target, delta);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// 帧率对应的帧间隔；非正或非有限帧率没有间隔
pub fn tick_interval_for(fps: f32) -> Option<Duration> {
    if fps.is_finite() && fps > 0.0 {
        Duration::try_from_secs_f64(1.0 / f64::from(fps)).ok()
    } else {
        None
    }
}

/// 运行循环状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLoop {
    tick_interval: Option<Duration>,
    running: bool,
}

impl RunLoop {
    pub fn new(tick_interval: Option<Duration>) -> Self {
        Self {
            tick_interval,
            running: false,
        }
    }

    pub fn with_frame_rate(fps: f32) -> Self {
        Self::new(tick_interval_for(fps))
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 开始运行；没有有效帧间隔时拒绝并返回 `false`
    pub fn start(&mut self) -> bool {
        match self.tick_interval {
            Some(interval) if !interval.is_zero() => {
                if !self.running {
                    debug!(interval_ms = interval.as_secs_f64() * 1000.0, "run loop start");
                }
                self.running = true;
                true
            }
            _ => {
                warn!("帧间隔无效，运行循环未启动");
                self.running = false;
                false
            }
        }
    }

    /// 停止；原本在运行时返回 `true`
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        if was_running {
            debug!("run loop stop");
        }
        was_running
    }

    /// 修改帧间隔；运行中则以新间隔重新开始
    pub fn set_tick_interval(&mut self, tick_interval: Option<Duration>) {
        self.tick_interval = tick_interval;
        if self.stop() {
            self.start();
        }
    }

    /// 按帧率修改帧间隔
    pub fn set_tick_rate(&mut self, fps: f32) {
        self.set_tick_interval(tick_interval_for(fps));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::entity::Entity;

    #[test]
    fn test_scheduler_calls_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = EntityRef::new(Entity::new());
        a.borrow_mut().tag = 1;
        let b = EntityRef::new(Entity::new());
        b.borrow_mut().tag = 2;

        let mut scheduler = Scheduler::new();
        for target in [&b, &a] {
            let log = Rc::clone(&log);
            scheduler.schedule(target, move |t, delta| {
                log.borrow_mut().push((t.borrow().tag, delta));
            });
        }

        scheduler.advance(0.5);
        assert_eq!(*log.borrow(), vec![(2, 0.5), (1, 0.5)]);
    }

    #[test]
    fn test_unschedule_removes_first_match() {
        let a = EntityRef::new(Entity::new());
        let b = EntityRef::new(Entity::new());
        let mut scheduler = Scheduler::new();
        scheduler.schedule(&a, |_, _| {});
        scheduler.schedule(&a, |_, _| {});

        assert!(!scheduler.unschedule(&b));
        assert!(scheduler.unschedule(&a));
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.is_scheduled(&a));
        assert!(scheduler.unschedule(&a));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_callback_can_mutate_target() {
        let a = EntityRef::new(Entity::new());
        let mut scheduler = Scheduler::new();
        scheduler.schedule(&a, |t, delta| t.borrow_mut().rotation += delta);
        scheduler.advance(0.25);
        scheduler.advance(0.25);
        assert_eq!(a.borrow().rotation, 0.5);
    }

    #[test]
    fn test_run_loop_refuses_invalid_interval() {
        let mut run_loop = RunLoop::with_frame_rate(0.0);
        assert!(!run_loop.start());
        assert!(!run_loop.is_running());

        let mut run_loop = RunLoop::with_frame_rate(-5.0);
        assert!(!run_loop.start());
    }

    #[test]
    fn test_run_loop_start_stop() {
        let mut run_loop = RunLoop::with_frame_rate(50.0);
        let interval = run_loop.tick_interval().unwrap();
        assert!((interval.as_secs_f64() - 0.02).abs() < 1e-6);
        assert!(run_loop.start());
        assert!(run_loop.is_running());
        assert!(run_loop.stop());
        assert!(!run_loop.stop());
    }

    #[test]
    fn test_set_tick_interval_restarts_when_running() {
        let mut run_loop = RunLoop::with_frame_rate(30.0);
        run_loop.start();
        run_loop.set_tick_interval(tick_interval_for(60.0));
        assert!(run_loop.is_running());

        run_loop.set_tick_interval(None);
        assert!(!run_loop.is_running());

        let mut idle = RunLoop::with_frame_rate(30.0);
        idle.set_tick_interval(tick_interval_for(60.0));
        assert!(!idle.is_running());
    }

    #[test]
    fn test_set_tick_rate_rejects_zero_fps() {
        let mut run_loop = RunLoop::with_frame_rate(60.0);
        assert!(run_loop.start());
        run_loop.set_tick_rate(0.0);
        assert!(!run_loop.is_running());
        assert_eq!(run_loop.tick_interval(), None);

        run_loop.set_tick_rate(50.0);
        assert!(run_loop.start());
    }
}
