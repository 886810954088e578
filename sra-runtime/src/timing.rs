//! # Timing 模块
//!
//! 缓动曲线：把线性的时间进度 `[0, 1]` 映射为感知进度。
//!
//! 曲线由三次贝塞尔控制点 `(x1, y1, x2, y2)` 定义（与 CSS `cubic-bezier` 相同），
//! 求值时先用 Newton-Raphson 从 x 反解参数 t，再计算 y。

use std::fmt;

use crate::error::ArgumentError;

const NEWTON_ITERATIONS: usize = 8;

/// 缓动函数
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimingFunction {
    /// 线性（恒等）
    #[default]
    Linear,
    /// 三次贝塞尔曲线
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl TimingFunction {
    pub const LINEAR: Self = Self::Linear;
    pub const EASE: Self = Self::bezier_unchecked(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: Self = Self::bezier_unchecked(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: Self = Self::bezier_unchecked(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: Self = Self::bezier_unchecked(0.42, 0.0, 0.58, 1.0);

    const fn bezier_unchecked(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// 创建自定义贝塞尔曲线
    ///
    /// # 错误
    /// - 任一值为 NaN / 无穷大
    /// - `x1` 或 `x2` 不在 `[0, 1]` 内
    ///
    /// y 值允许超出 `[0, 1]`（回弹效果）。
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, ArgumentError> {
        for (index, value) in [x1, y1, x2, y2].into_iter().enumerate() {
            if !value.is_finite() {
                return Err(ArgumentError::NonFinite { index, value });
            }
        }
        if !(0.0..=1.0).contains(&x1) {
            return Err(ArgumentError::ControlPointOutOfRange { which: 1, value: x1 });
        }
        if !(0.0..=1.0).contains(&x2) {
            return Err(ArgumentError::ControlPointOutOfRange { which: 2, value: x2 });
        }
        Ok(Self::bezier_unchecked(x1, y1, x2, y2))
    }

    /// 从控制值列表创建，列表长度必须恰好为 4
    pub fn from_control_points(values: &[f32]) -> Result<Self, ArgumentError> {
        match *values {
            [x1, y1, x2, y2] => Self::cubic_bezier(x1, y1, x2, y2),
            _ => Err(ArgumentError::WrongArity {
                count: values.len(),
            }),
        }
    }

    /// 按预设名查找（`linear` / `ease` / `ease_in` / `ease_out` / `ease_in_out`）
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::LINEAR),
            "ease" => Some(Self::EASE),
            "ease_in" => Some(Self::EASE_IN),
            "ease_out" => Some(Self::EASE_OUT),
            "ease_in_out" => Some(Self::EASE_IN_OUT),
            _ => None,
        }
    }

    /// 计算缓动值
    ///
    /// 输入不做截断；动作系统保证传入 `[0, 1]`。
    pub fn evaluate(&self, t: f32) -> f32 {
        match *self {
            Self::Linear => t,
            // 退化为直线的贝塞尔
            Self::CubicBezier { x1, y1, x2, y2 } if x1 == y1 && x2 == y2 => t,
            Self::CubicBezier { x1, y1, x2, y2 } => {
                calc_bezier(t_for_x(t, x1, x2), y1, y2)
            }
        }
    }
}

impl fmt::Display for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "TimingFunction({},{},{},{})", x1, y1, x2, y2)
            }
        }
    }
}

fn coeff_a(a1: f32, a2: f32) -> f32 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

fn coeff_b(a1: f32, a2: f32) -> f32 {
    3.0 * a2 - 6.0 * a1
}

fn coeff_c(a1: f32) -> f32 {
    3.0 * a1
}

/// x(t) 或 y(t)
fn calc_bezier(t: f32, a1: f32, a2: f32) -> f32 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

/// dx/dt 或 dy/dt
fn slope(t: f32, a1: f32, a2: f32) -> f32 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

fn t_for_x(x: f32, x1: f32, x2: f32) -> f32 {
    let mut guess = x;
    for _ in 0..NEWTON_ITERATIONS {
        let current_slope = slope(guess, x1, x2);
        if current_slope == 0.0 {
            return guess;
        }
        let current_x = calc_bezier(guess, x1, x2) - x;
        guess -= current_x / current_slope;
    }
    guess
}
