//! # Leaf 模块
//!
//! 直接修改实体属性的动作：移动、旋转、缩放、淡入淡出、帧动画、延时。
//!
//! 每个叶子动作通过一个通道（channel）读写目标的一个属性。
//! `begin` 时记录起点和差值，之后每次 `step` 写入 `from + delta * progress`；
//! 到达终点时直接写入精确终值。

use tracing::trace;

use super::timeline::{ActivityFlags, Progress, Timeline};
use crate::entity::{Entity, EntityRef, Sprite};
use crate::geometry::Vector2;
use crate::timing::TimingFunction;

/// 二维属性通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorChannel {
    /// `rect.origin`
    Origin,
    Scale,
}

impl VectorChannel {
    pub fn get(self, entity: &Entity) -> Vector2 {
        match self {
            Self::Origin => entity.rect.origin,
            Self::Scale => entity.scale,
        }
    }

    pub fn set(self, entity: &mut Entity, value: Vector2) {
        match self {
            Self::Origin => entity.rect.origin = value,
            Self::Scale => entity.scale = value,
        }
    }
}

/// 标量属性通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarChannel {
    Rotation,
    Opacity,
}

impl ScalarChannel {
    pub fn get(self, entity: &Entity) -> f32 {
        match self {
            Self::Rotation => entity.rotation,
            Self::Opacity => entity.opacity,
        }
    }

    pub fn set(self, entity: &mut Entity, value: f32) {
        match self {
            Self::Rotation => entity.rotation = value,
            Self::Opacity => entity.opacity = value,
        }
    }
}

/// 动作目标：绝对值或相对值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Goal<T> {
    To(T),
    By(T),
}

/// begin 时捕获的插值区间
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span<T> {
    from: T,
    delta: T,
}

#[derive(Debug, Clone)]
enum LeafKind {
    Delay,
    Vector {
        channel: VectorChannel,
        goal: Goal<Vector2>,
        span: Span<Vector2>,
    },
    Scalar {
        channel: ScalarChannel,
        goal: Goal<f32>,
        span: Span<f32>,
    },
    Sprite {
        frames: Vec<Sprite>,
    },
}

impl LeafKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Delay => "delay",
            Self::Vector {
                channel: VectorChannel::Origin,
                ..
            } => "move",
            Self::Vector {
                channel: VectorChannel::Scale,
                ..
            } => "scale",
            Self::Scalar {
                channel: ScalarChannel::Rotation,
                ..
            } => "rotate",
            Self::Scalar {
                channel: ScalarChannel::Opacity,
                ..
            } => "fade",
            Self::Sprite { .. } => "sprite",
        }
    }
}

/// 叶子动作
#[derive(Debug, Clone)]
pub struct LeafAction {
    timeline: Timeline,
    kind: LeafKind,
    target: Option<EntityRef>,
}

impl LeafAction {
    fn with_kind(duration: f32, kind: LeafKind) -> Self {
        Self {
            timeline: Timeline::new(duration),
            kind,
            target: None,
        }
    }

    fn vector(duration: f32, channel: VectorChannel, goal: Goal<Vector2>) -> Self {
        let span = Span {
            from: Vector2::ZERO,
            delta: Vector2::ZERO,
        };
        Self::with_kind(duration, LeafKind::Vector { channel, goal, span })
    }

    fn scalar(duration: f32, channel: ScalarChannel, goal: Goal<f32>) -> Self {
        let span = Span {
            from: 0.0,
            delta: 0.0,
        };
        Self::with_kind(duration, LeafKind::Scalar { channel, goal, span })
    }

    /// 什么都不做，只占用时间
    pub fn delay(duration: f32) -> Self {
        Self::with_kind(duration, LeafKind::Delay)
    }

    pub fn move_to(duration: f32, origin: Vector2) -> Self {
        Self::vector(duration, VectorChannel::Origin, Goal::To(origin))
    }

    pub fn move_by(duration: f32, offset: Vector2) -> Self {
        Self::vector(duration, VectorChannel::Origin, Goal::By(offset))
    }

    pub fn scale_to(duration: f32, scale: Vector2) -> Self {
        Self::vector(duration, VectorChannel::Scale, Goal::To(scale))
    }

    pub fn scale_by(duration: f32, delta: Vector2) -> Self {
        Self::vector(duration, VectorChannel::Scale, Goal::By(delta))
    }

    /// 旋转到指定弧度
    pub fn rotate_to(duration: f32, radians: f32) -> Self {
        Self::scalar(duration, ScalarChannel::Rotation, Goal::To(radians))
    }

    pub fn rotate_by(duration: f32, radians: f32) -> Self {
        Self::scalar(duration, ScalarChannel::Rotation, Goal::By(radians))
    }

    pub fn fade_to(duration: f32, opacity: f32) -> Self {
        Self::scalar(duration, ScalarChannel::Opacity, Goal::To(opacity))
    }

    pub fn fade_by(duration: f32, delta: f32) -> Self {
        Self::scalar(duration, ScalarChannel::Opacity, Goal::By(delta))
    }

    /// 帧动画：在 `duration` 内均匀切换 `frames`
    ///
    /// 空帧列表等价于延时。
    pub fn sprite(duration: f32, frames: Vec<Sprite>) -> Self {
        Self::with_kind(duration, LeafKind::Sprite { frames })
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.timeline.set_rate(rate);
        self
    }

    pub fn with_timing_function(mut self, timing_function: TimingFunction) -> Self {
        self.timeline.set_timing_function(timing_function);
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn target(&self) -> Option<&EntityRef> {
        self.target.as_ref()
    }

    pub fn flags(&self) -> ActivityFlags {
        self.timeline.flags()
    }

    pub fn begin(&mut self, target: &EntityRef) {
        self.target = Some(target.clone());
        self.timeline.begin();

        let entity = target.borrow();
        match &mut self.kind {
            LeafKind::Delay | LeafKind::Sprite { .. } => {}
            LeafKind::Vector {
                channel,
                goal,
                span,
            } => {
                let from = channel.get(&entity);
                let delta = match *goal {
                    Goal::To(to) => to.minus(from),
                    Goal::By(by) => by,
                };
                *span = Span { from, delta };
            }
            LeafKind::Scalar {
                channel,
                goal,
                span,
            } => {
                let from = channel.get(&entity);
                let delta = match *goal {
                    Goal::To(to) => to - from,
                    Goal::By(by) => by,
                };
                *span = Span { from, delta };
            }
        }

        trace!(action = self.kind.name(), "begin");
    }

    pub fn step(&mut self, delta: f32) {
        let Some(progress) = self.timeline.advance(delta) else {
            return;
        };
        let Some(target) = &self.target else {
            return;
        };

        let mut entity = target.borrow_mut();
        match &self.kind {
            LeafKind::Delay => {}
            LeafKind::Vector {
                channel,
                goal,
                span,
            } => {
                let value = match (progress, *goal) {
                    (Progress::End, Goal::To(to)) => to,
                    (Progress::End, Goal::By(_)) => span.from.plus(span.delta),
                    (Progress::Partial(p), _) => span.from.plus(span.delta.times(p)),
                };
                channel.set(&mut entity, value);
            }
            LeafKind::Scalar {
                channel,
                goal,
                span,
            } => {
                let value = match (progress, *goal) {
                    (Progress::End, Goal::To(to)) => to,
                    (Progress::End, Goal::By(_)) => span.from + span.delta,
                    (Progress::Partial(p), _) => span.from + span.delta * p,
                };
                channel.set(&mut entity, value);
            }
            LeafKind::Sprite { frames } => {
                if let Some(frame) = frame_at(frames, progress) {
                    entity.sprite = Some(frame.clone());
                }
            }
        }
    }

    pub fn has_finished(&self) -> bool {
        self.timeline.has_finished()
    }

    pub fn end(&mut self, interrupt: bool) {
        self.timeline.flags_mut().end(interrupt);
    }

    pub fn pause(&mut self) {
        self.timeline.flags_mut().pause();
    }

    pub fn resume(&mut self) {
        self.timeline.flags_mut().resume();
    }
}

/// 进度对应的帧：`floor(progress * n)`，截断到最后一帧
fn frame_at(frames: &[Sprite], progress: Progress) -> Option<&Sprite> {
    let last = frames.len().checked_sub(1)?;
    let index = match progress {
        Progress::End => last,
        Progress::Partial(p) => ((p.max(0.0) * frames.len() as f32).floor() as usize).min(last),
    };
    frames.get(index)
}
