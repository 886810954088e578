//! # Controller 模块
//!
//! 每帧的调度中心。
//!
//! ## 每帧流程
//!
//! ```text
//! tick(ctx)
//!   ├─ 没有场景 / 已暂停 → 停止运行循环，重置时间戳
//!   ├─ 计算 delta（首帧为 0）
//!   ├─ ActionManager::advance(delta)
//!   ├─ Scheduler::advance(delta)
//!   └─ 栈顶场景 visit(ctx)
//! ```
//!
//! 控制器显式构造，由应用持有，不存在全局实例。

use std::time::Instant;

use tracing::{debug, info};

use crate::action::{Action, ActionId, ActionManager};
use crate::config::RuntimeConfig;
use crate::dispatch::{RunLoop, Scheduler};
use crate::entity::{EntityRef, RenderContext};

/// 运行循环停止的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 场景栈为空
    NoScene,
    /// 控制器已暂停
    Paused,
}

/// 一次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus {
    /// 完成一帧
    Rendered { delta: f32 },
    /// 没有绘制，运行循环已停止
    Stopped(StopReason),
}

/// 控制器
#[derive(Debug)]
pub struct Controller {
    config: RuntimeConfig,
    action_manager: ActionManager,
    scheduler: Scheduler,
    scenes: Vec<EntityRef>,
    run_loop: RunLoop,
    last_tick: Option<Instant>,
    delta_time: f32,
    paused: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Controller {
    pub fn new(config: RuntimeConfig) -> Self {
        let run_loop = RunLoop::with_frame_rate(config.frame_rate);
        let paused = config.start_paused;
        Self {
            config,
            action_manager: ActionManager::new(),
            scheduler: Scheduler::new(),
            scenes: Vec::new(),
            run_loop,
            last_tick: None,
            delta_time: 0.0,
            paused,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // ========== 帧率 ==========

    /// 修改帧率；运行中的循环以新间隔重新开始
    pub fn set_frame_rate(&mut self, fps: f32) {
        self.config.frame_rate = fps;
        self.run_loop.set_tick_rate(fps);
        debug!(fps = fps, "frame rate changed");
    }

    pub fn frame_rate(&self) -> f32 {
        self.config.frame_rate
    }

    pub fn run_loop(&self) -> &RunLoop {
        &self.run_loop
    }

    // ========== 场景栈 ==========

    pub fn push_scene(&mut self, scene: EntityRef) {
        self.scenes.push(scene);
        debug!(depth = self.scenes.len(), "push scene");
    }

    /// 弹出栈顶场景；栈为空时返回 `None`
    pub fn pop_scene(&mut self) -> Option<EntityRef> {
        let scene = self.scenes.pop();
        if scene.is_some() {
            debug!(depth = self.scenes.len(), "pop scene");
        }
        scene
    }

    pub fn top_scene(&self) -> Option<&EntityRef> {
        self.scenes.last()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    // ========== 动作 / 回调 ==========

    pub fn action_manager(&self) -> &ActionManager {
        &self.action_manager
    }

    pub fn action_manager_mut(&mut self) -> &mut ActionManager {
        &mut self.action_manager
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// 在实体上开始动作
    pub fn run_action(&mut self, target: &EntityRef, action: impl Into<Action>) -> ActionId {
        self.action_manager.start_action(action, target)
    }

    // ========== 运行状态 ==========

    pub fn pause(&mut self) {
        if !self.paused {
            info!("controller paused");
        }
        self.paused = true;
    }

    /// 取消暂停并启动运行循环
    ///
    /// 帧间隔无效时运行循环拒绝启动，返回 `false`。
    pub fn run(&mut self) -> bool {
        self.paused = false;
        self.run_loop.start()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.run_loop.is_running()
    }

    /// 上一帧的 delta（秒）
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    // ========== 每帧 ==========

    pub fn tick(&mut self, ctx: &mut dyn RenderContext) -> TickStatus {
        self.tick_at(Instant::now(), ctx)
    }

    /// 以给定时刻执行一帧
    pub fn tick_at(&mut self, now: Instant, ctx: &mut dyn RenderContext) -> TickStatus {
        let scene = match self.scenes.last() {
            Some(scene) if !self.paused => scene.clone(),
            Some(_) => return self.halt(StopReason::Paused),
            None => return self.halt(StopReason::NoScene),
        };

        let delta = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.delta_time = delta;

        self.action_manager.advance(delta);
        self.scheduler.advance(delta);
        scene.visit(ctx);

        TickStatus::Rendered { delta }
    }

    fn halt(&mut self, reason: StopReason) -> TickStatus {
        self.delta_time = 0.0;
        self.last_tick = None;
        if self.run_loop.stop() {
            debug!(reason = ?reason, "run loop halted");
        }
        TickStatus::Stopped(reason)
    }
}
