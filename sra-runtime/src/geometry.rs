//! # Geometry 模块
//!
//! 二维几何基础类型：向量、尺寸、矩形。
//!
//! 命名约定：
//! - `add` / `subtract` / `multiply` 等动词形式**原地修改**并返回 `&mut Self`，可以链式调用
//! - `plus` / `minus` / `times` 等形式**返回新值**，不修改自身
//!
//! 所有类型都是 `Copy` 值类型，相等比较使用 [`PRECISION`] 容差。

use std::fmt;
use std::ops::{Mul, Neg};

use serde::{Deserialize, Serialize};

/// 浮点比较容差
pub const PRECISION: f32 = 0.0001;

const DEG2RAD: f32 = 0.017_453_292;

/// 角度转弧度
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * DEG2RAD
}

/// 弧度转角度
pub fn radians_to_degrees(radians: f32) -> f32 {
    radians / DEG2RAD
}

/// 容差内相等
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= PRECISION
}

/// 二维向量
///
/// 既表示点也表示方向。`==` 为近似相等（容差 [`PRECISION`]）。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    /// 零向量
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// (1, 1)
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    // ========== 原地修改 ==========

    /// 原地加
    pub fn add(&mut self, other: Self) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    /// 原地减
    pub fn subtract(&mut self, other: Self) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    /// 原地数乘
    pub fn multiply(&mut self, factor: f32) -> &mut Self {
        self.x *= factor;
        self.y *= factor;
        self
    }

    /// 绕原点原地旋转
    pub fn rotate(&mut self, radians: f32) -> &mut Self {
        let (sin, cos) = radians.sin_cos();
        let x = self.x * cos - self.y * sin;
        let y = self.x * sin + self.y * cos;
        self.x = x;
        self.y = y;
        self
    }

    /// 原地归一化
    ///
    /// 零向量归一化后分量为 NaN，调用方自行保证长度非零。
    pub fn normalize(&mut self) -> &mut Self {
        let magnitude = self.magnitude();
        self.x /= magnitude;
        self.y /= magnitude;
        self
    }

    /// 绕 `pivot` 原地旋转（把自身当作点）
    pub fn rotate_around_pivot(&mut self, pivot: Self, radians: f32) -> &mut Self {
        self.subtract(pivot).rotate(radians).add(pivot)
    }

    // ========== 返回新值 ==========

    pub fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn times(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn opposite(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y))
    }

    /// 以 `center` 为中心的镜像点
    pub fn reflection_on(self, center: Self) -> Self {
        Self::new(center.x + (center.x - self.x), center.y + (center.y - self.y))
    }

    /// 旋转 90 度
    pub fn rotated_90_degrees(self, clockwise: bool) -> Self {
        if clockwise {
            Self::new(self.y, -self.x)
        } else {
            Self::new(-self.y, self.x)
        }
    }

    // ========== 度量 ==========

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude(self) -> f32 {
        self.fast_magnitude().sqrt()
    }

    /// 长度的平方，只用于比较大小
    pub fn fast_magnitude(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance_from(self, other: Self) -> f32 {
        other.minus(self).magnitude()
    }

    /// 较大的分量
    pub fn max(self) -> f32 {
        if self.x > self.y { self.x } else { self.y }
    }

    /// 两向量夹角（弧度）
    ///
    /// 任一向量长度为零时夹角不存在，返回 `None`。
    pub fn angle_from(self, other: Self) -> Option<f32> {
        let divisor = self.magnitude() * other.magnitude();
        if divisor == 0.0 {
            return None;
        }
        Some((self.dot(other) / divisor).clamp(-1.0, 1.0).acos())
    }

    pub fn angle_from_x_axis(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// 是否同向平行；夹角不存在时为 `false`
    pub fn is_parallel_to(self, other: Self) -> bool {
        self.angle_from(other)
            .is_some_and(|angle| angle <= PRECISION)
    }

    /// 是否反向平行；夹角不存在时为 `false`
    pub fn is_opposite_to(self, other: Self) -> bool {
        self.angle_from(other)
            .is_some_and(|angle| (angle - std::f32::consts::PI).abs() <= PRECISION)
    }

    pub fn is_perpendicular_to(self, other: Self) -> bool {
        self.dot(other).abs() <= PRECISION
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl PartialEq for Vector2 {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.x, self.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.times(rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        self.opposite()
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Vector2> for (f32, f32) {
    fn from(v: Vector2) -> Self {
        (v.x, v.y)
    }
}

/// 尺寸
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn set(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// 原地加
    pub fn add(&mut self, other: Self) -> &mut Self {
        self.width += other.width;
        self.height += other.height;
        self
    }

    /// 原地减
    pub fn subtract(&mut self, other: Self) -> &mut Self {
        self.width -= other.width;
        self.height -= other.height;
        self
    }

    pub fn plus(self, other: Self) -> Self {
        Self::new(self.width + other.width, self.height + other.height)
    }

    pub fn minus(self, other: Self) -> Self {
        Self::new(self.width - other.width, self.height - other.height)
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.width, other.width) && approx_eq(self.height, other.height)
    }
}

/// 矩形（左上角 + 尺寸）
///
/// 按值持有 origin 和 size，构造时拷贝，不与外部共享。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vector2,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Self = Self::new(Vector2::ZERO, Size::ZERO);

    pub const fn new(origin: Vector2, size: Size) -> Self {
        Self { origin, size }
    }

    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vector2::new(x, y), Size::new(width, height))
    }

    pub fn set(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.origin.set(x, y);
        self.size.set(width, height);
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// 点是否在矩形内（含边界）
    pub fn contains_point(&self, point: Vector2) -> bool {
        self.contains_xy(point.x, point.y)
    }

    pub fn contains_xy(&self, x: f32, y: f32) -> bool {
        x >= self.origin.x && y >= self.origin.y && x <= self.max_x() && y <= self.max_y()
    }

    /// 两矩形是否相交（边界接触也算相交）
    pub fn intersects(&self, other: &Rect) -> bool {
        let x_overlap = (self.origin.x >= other.origin.x && self.origin.x <= other.max_x())
            || (other.origin.x >= self.origin.x && other.origin.x <= self.max_x());
        let y_overlap = (self.origin.y >= other.origin.y && self.origin.y <= other.max_y())
            || (other.origin.y >= self.origin.y && other.origin.y <= self.max_y());
        x_overlap && y_overlap
    }
}
