//! # Timeline 模块
//!
//! 所有动作共享的状态机：活跃标记 + 时间轴推进。

use tracing::warn;

use crate::timing::TimingFunction;

/// 动作的活跃标记
///
/// - `active`: 是否消费 `step` 调用（暂停时为 `false`）
/// - `finished`: 是否已显式结束
/// - `jump_to_end`: 下一次 `step` 直接落到终值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityFlags {
    pub active: bool,
    pub finished: bool,
    pub jump_to_end: bool,
}

impl ActivityFlags {
    /// begin 时重置
    pub(crate) fn begin(&mut self) {
        self.active = true;
        self.finished = false;
        self.jump_to_end = false;
    }

    /// 结束：跑完、跳到终点、被中断都走这里
    pub(crate) fn finish(&mut self) {
        self.active = false;
        self.finished = true;
        self.jump_to_end = false;
    }

    /// `end(true)` 原地放弃；`end(false)` 标记下一次 step 跳到终点
    pub(crate) fn end(&mut self, interrupt: bool) {
        if interrupt {
            self.finish();
        } else {
            self.jump_to_end = true;
        }
    }

    pub(crate) fn pause(&mut self) {
        self.active = false;
    }

    /// 已结束的动作不能恢复
    pub(crate) fn resume(&mut self) {
        if !self.finished {
            self.active = true;
        }
    }
}

/// 一次 `step` 产生的进度
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// 中间进度（已应用缓动）
    Partial(f32),
    /// 到达终点，写入精确终值
    End,
}

/// 叶子动作的时间轴
#[derive(Debug, Clone)]
pub struct Timeline {
    duration: f32,
    rate: f32,
    elapsed: f32,
    timing_function: TimingFunction,
    flags: ActivityFlags,
}

impl Timeline {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            rate: 1.0,
            elapsed: 0.0,
            timing_function: TimingFunction::Linear,
            flags: ActivityFlags::default(),
        }
    }

    /// 设置时间缩放
    ///
    /// `rate` 必须为正的有限数，否则保留原值。
    pub fn set_rate(&mut self, rate: f32) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        } else {
            warn!(rate = rate, "忽略无效的 rate");
        }
    }

    pub fn set_timing_function(&mut self, timing_function: TimingFunction) {
        self.timing_function = timing_function;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn timing_function(&self) -> TimingFunction {
        self.timing_function
    }

    pub fn flags(&self) -> ActivityFlags {
        self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut ActivityFlags {
        &mut self.flags
    }

    /// 经过 rate 缩放后的时长
    pub fn scaled_duration(&self) -> f32 {
        self.duration / self.rate
    }

    pub(crate) fn begin(&mut self) {
        self.elapsed = 0.0;
        self.flags.begin();
    }

    /// 推进时间，返回应写入目标的进度；未激活时返回 `None`
    pub(crate) fn advance(&mut self, delta: f32) -> Option<Progress> {
        if !self.flags.active {
            return None;
        }

        self.elapsed += delta;

        if self.duration <= 0.0 {
            self.flags.finish();
            return Some(Progress::End);
        }

        let scaled = self.scaled_duration();
        if self.elapsed >= scaled || self.flags.jump_to_end {
            self.elapsed = scaled;
            self.flags.finish();
            return Some(Progress::End);
        }

        Some(Progress::Partial(
            self.timing_function.evaluate(self.elapsed / scaled),
        ))
    }

    /// 零时长动作只有在落到终点后才算完成
    pub fn has_finished(&self) -> bool {
        self.flags.finished || (self.duration > 0.0 && self.elapsed >= self.scaled_duration())
    }
}
