//! # Render 模块
//!
//! 运行时与绘制层之间的边界。
//!
//! 核心库只通过 [`RenderContext`] 发出绘制指令，不关心实际如何绘制；
//! [`RecordingContext`] 把指令记录下来，供测试和无头宿主使用。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::Rect;

/// 精灵句柄
///
/// 外部加载的图像的 key（通常是相对于资源目录的路径），运行时不解释其内容。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sprite(String);

impl Sprite {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sprite {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// 精灵在实体矩形内的适配方式（只是提示，由绘制层实现）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    #[default]
    ScaleToFill,
    AspectFit,
    AspectFill,
    Center,
    TopLeft,
}

impl ContentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScaleToFill => "scale_to_fill",
            Self::AspectFit => "aspect_fit",
            Self::AspectFill => "aspect_fill",
            Self::Center => "center",
            Self::TopLeft => "top_left",
        }
    }
}

/// 绘制上下文
///
/// 语义与 2D canvas 一致：`save`/`restore` 成对出现，变换累积到栈顶状态。
pub trait RenderContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, x: f32, y: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_sprite(&mut self, sprite: &Sprite, rect: Rect, mode: ContentMode);
}

/// 一条已记录的绘制指令
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Rotate { radians: f32 },
    Scale { x: f32, y: f32 },
    GlobalAlpha(f32),
    FillRect { rect: Rect, color: Color },
    DrawSprite {
        sprite: Sprite,
        rect: Rect,
        mode: ContentMode,
    },
}

impl fmt::Display for DrawCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save => write!(f, "save"),
            Self::Restore => write!(f, "restore"),
            Self::Translate { x, y } => write!(f, "translate({x}, {y})"),
            Self::Rotate { radians } => write!(f, "rotate({radians})"),
            Self::Scale { x, y } => write!(f, "scale({x}, {y})"),
            Self::GlobalAlpha(alpha) => write!(f, "global_alpha({alpha})"),
            Self::FillRect { rect, color } => write!(
                f,
                "fill_rect({}, {}, {}, {}, {color})",
                rect.origin.x, rect.origin.y, rect.size.width, rect.size.height
            ),
            Self::DrawSprite { sprite, rect, mode } => write!(
                f,
                "draw_sprite({sprite}, {}, {}, {}, {}, {})",
                rect.origin.x,
                rect.origin.y,
                rect.size.width,
                rect.size.height,
                mode.as_str()
            ),
        }
    }
}

/// 记录所有绘制指令的上下文
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<DrawCall>,
    depth: usize,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// 取出已记录的指令并清空
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// 每条指令的文本形式
    pub fn lines(&self) -> Vec<String> {
        self.calls.iter().map(ToString::to_string).collect()
    }

    /// 当前 `save` 嵌套深度（配对正确时一帧结束后为 0）
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.depth = 0;
    }
}

impl RenderContext for RecordingContext {
    fn save(&mut self) {
        self.depth += 1;
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.calls.push(DrawCall::Rotate { radians });
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Scale { x, y });
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.calls.push(DrawCall::GlobalAlpha(alpha));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::FillRect { rect, color });
    }

    fn draw_sprite(&mut self, sprite: &Sprite, rect: Rect, mode: ContentMode) {
        self.calls.push(DrawCall::DrawSprite {
            sprite: sprite.clone(),
            rect,
            mode,
        });
    }
}
