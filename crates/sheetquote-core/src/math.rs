//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断点坐标是否有限（非NaN、非无穷）
#[inline]
pub fn is_finite_point(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// 2D包围盒
///
/// 扫描实体时单调扩展；空包围盒的宽高为0，不会为负。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 创建新的包围盒
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 创建空的包围盒（无效状态）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// 退化为原点的零包围盒
    pub fn zero() -> Self {
        Self::new(Point2::origin(), Point2::origin())
    }

    /// 从点集创建包围盒
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 是否尚未包含任何点
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 扩展包围盒以包含另一个包围盒
    pub fn expand_to_include_box(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.expand_to_include(&other.min);
        self.expand_to_include(&other.max);
    }

    /// 获取宽度
    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    /// 获取高度
    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// 包围盒面积
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

impl Default for BoundingBox2 {
    fn default() -> Self {
        Self::empty()
    }
}
