//! 几何图元定义
//!
//! 支持的基本图元：
//! - 线段 (Line)
//! - 圆 (Circle)
//! - 圆弧 (Arc)
//! - 多段线 (Polyline)，顶点可带凸度（bulge）
//! - 样条曲线 (Spline)
//!
//! 所有坐标单位为英寸（提取阶段已完成单位换算）。

use crate::math::{is_finite_point, BoundingBox2, Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Polyline(Polyline),
    Spline(Spline),
}

impl Geometry {
    /// 获取几何的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Geometry::Line(l) => l.bounding_box(),
            Geometry::Circle(c) => c.bounding_box(),
            Geometry::Arc(a) => a.bounding_box(),
            Geometry::Polyline(pl) => pl.bounding_box(),
            Geometry::Spline(s) => s.bounding_box(),
        }
    }

    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Line(_) => "Line",
            Geometry::Circle(_) => "Circle",
            Geometry::Arc(_) => "Arc",
            Geometry::Polyline(_) => "Polyline",
            Geometry::Spline(_) => "Spline",
        }
    }

    /// 所有定义坐标与尺寸是否有限
    pub fn is_finite(&self) -> bool {
        match self {
            Geometry::Line(l) => is_finite_point(&l.start) && is_finite_point(&l.end),
            Geometry::Circle(c) => is_finite_point(&c.center) && c.radius.is_finite(),
            Geometry::Arc(a) => {
                is_finite_point(&a.center)
                    && a.radius.is_finite()
                    && a.start_angle.is_finite()
                    && a.end_angle.is_finite()
            }
            Geometry::Polyline(pl) => pl
                .vertices
                .iter()
                .all(|v| is_finite_point(&v.point) && v.bulge.is_finite()),
            Geometry::Spline(s) => s
                .control_points
                .iter()
                .chain(s.fit_points.iter())
                .all(is_finite_point),
        }
    }

    /// 半径非正、顶点不足等无法参与测量的几何
    pub fn is_degenerate(&self) -> bool {
        match self {
            Geometry::Line(_) => false,
            Geometry::Circle(c) => c.radius <= 0.0,
            Geometry::Arc(a) => a.radius <= 0.0,
            Geometry::Polyline(pl) => pl.vertex_count() < 2,
            Geometry::Spline(s) => s.defining_points().len() < 2,
        }
    }

    /// 可以安全测量：坐标有限且非退化
    pub fn is_measurable(&self) -> bool {
        self.is_finite() && !self.is_degenerate()
    }

    /// 以原点为基准等比缩放（用于单位换算）
    pub fn scaled(&self, factor: f64) -> Geometry {
        let sp = |p: &Point2| Point2::new(p.x * factor, p.y * factor);
        match self {
            Geometry::Line(l) => Geometry::Line(Line::new(sp(&l.start), sp(&l.end))),
            Geometry::Circle(c) => Geometry::Circle(Circle::new(sp(&c.center), c.radius * factor)),
            Geometry::Arc(a) => Geometry::Arc(Arc::new(
                sp(&a.center),
                a.radius * factor,
                a.start_angle,
                a.end_angle,
            )),
            Geometry::Polyline(pl) => Geometry::Polyline(Polyline::new(
                pl.vertices
                    .iter()
                    .map(|v| PolylineVertex::with_bulge(sp(&v.point), v.bulge))
                    .collect(),
                pl.closed,
            )),
            Geometry::Spline(s) => Geometry::Spline(Spline {
                degree: s.degree,
                control_points: s.control_points.iter().map(sp).collect(),
                fit_points: s.fit_points.iter().map(sp).collect(),
                closed: s.closed,
            }),
        }
    }
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points([self.start, self.end])
    }
}

/// 圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 直径
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// 计算周长（π·d）
    pub fn circumference(&self) -> f64 {
        PI * self.diameter()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

/// 圆弧
///
/// 与 DXF 一致：从起始角逆时针扫到终止角。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.sweep_angle().abs() * self.radius
    }

    /// 计算扫过的角度，范围 (0, 2π]
    pub fn sweep_angle(&self) -> f64 {
        let mut sweep = self.end_angle - self.start_angle;
        while sweep <= 0.0 {
            sweep += 2.0 * PI;
        }
        while sweep > 2.0 * PI {
            sweep -= 2.0 * PI;
        }
        sweep
    }

    /// 获取起点
    pub fn start_point(&self) -> Point2 {
        self.point_at_angle(self.start_angle)
    }

    /// 获取终点
    pub fn end_point(&self) -> Point2 {
        self.point_at_angle(self.end_angle)
    }

    fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// 检查角度是否在弧的范围内
    fn contains_angle(&self, angle: f64) -> bool {
        let mut offset = angle - self.start_angle;
        while offset < 0.0 {
            offset += 2.0 * PI;
        }
        while offset >= 2.0 * PI {
            offset -= 2.0 * PI;
        }
        offset <= self.sweep_angle()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.start_point(), self.end_point()]);

        // 检查象限点
        for angle in [0.0, PI / 2.0, PI, 3.0 * PI / 2.0] {
            if self.contains_angle(angle) {
                bbox.expand_to_include(&self.point_at_angle(angle));
            }
        }

        bbox
    }
}

/// 多段线顶点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineVertex {
    pub point: Point2,
    /// 凸度（bulge）- 到下一顶点的弧线段，0表示直线。
    /// 绝对值为 tan(包含角/4)，正值为逆时针。
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(point: Point2) -> Self {
        Self { point, bulge: 0.0 }
    }

    pub fn with_bulge(point: Point2, bulge: f64) -> Self {
        Self { point, bulge }
    }
}

/// 多段线的单个线段（直线或凸度圆弧）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineSegment {
    pub start: Point2,
    pub end: Point2,
    pub bulge: f64,
}

impl PolylineSegment {
    /// 弦长
    pub fn chord_length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 是否为弧线段
    pub fn is_arc(&self) -> bool {
        self.bulge.abs() >= EPSILON && self.chord_length() >= EPSILON
    }

    /// 弧线段半径；直线段返回 None
    pub fn radius(&self) -> Option<f64> {
        if !self.is_arc() {
            return None;
        }
        let b = self.bulge.abs();
        Some(self.chord_length() * (1.0 + b * b) / (4.0 * b))
    }

    /// 包含角（弧度）
    pub fn included_angle(&self) -> f64 {
        4.0 * self.bulge.abs().atan()
    }

    /// 线段长度（弧线段为弧长）
    pub fn length(&self) -> f64 {
        match self.radius() {
            Some(radius) => radius * self.included_angle(),
            None => self.chord_length(),
        }
    }
}

/// 多段线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<PolylineVertex>,
    /// 是否闭合（DXF 闭合标志）
    pub closed: bool,
}

impl Polyline {
    pub fn new(vertices: Vec<PolylineVertex>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    /// 从点列表创建（所有顶点都是直线连接）
    pub fn from_points(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            vertices: points.into_iter().map(PolylineVertex::new).collect(),
            closed,
        }
    }

    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 首末顶点间距离；少于两个顶点时为 None
    pub fn closing_gap(&self) -> Option<f64> {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() >= 2 => {
                Some((last.point - first.point).norm())
            }
            _ => None,
        }
    }

    /// 闭合判定：显式闭合标志，或首末顶点距离小于容差
    pub fn is_closed_within(&self, tolerance: f64) -> bool {
        if self.vertices.len() < 2 {
            return false;
        }
        self.closed || self.closing_gap().is_some_and(|gap| gap < tolerance)
    }

    /// 按指定闭合状态遍历线段，闭合时包含末顶点到首顶点的闭合段
    pub fn segments_with(&self, closed: bool) -> impl Iterator<Item = PolylineSegment> + '_ {
        let n = self.vertices.len();
        let count = match n {
            0 | 1 => 0,
            _ if closed => n,
            _ => n - 1,
        };
        (0..count).map(move |i| {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[(i + 1) % n];
            PolylineSegment {
                start: v1.point,
                end: v2.point,
                bulge: v1.bulge,
            }
        })
    }

    /// 按闭合标志遍历线段
    pub fn segments(&self) -> impl Iterator<Item = PolylineSegment> + '_ {
        self.segments_with(self.closed)
    }

    /// 计算总长度（考虑凸度弧）
    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length()).sum()
    }

    /// 鞋带公式计算有向面积（忽略凸度），逆时针为正
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = &self.vertices[i].point;
                let b = &self.vertices[(i + 1) % n].point;
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice / 2.0
    }

    /// 面积（有向面积的绝对值）
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// 各顶点处的角度（弧度）
    ///
    /// 闭合多段线返回内角，范围 [0, 2π)，按绕向区分凸角与凹角；
    /// 开放多段线只计算中间顶点两条边的夹角，范围 [0, π]。
    /// 闭合时若末顶点与首顶点重合（容差内）则视为同一点，零长度边两侧的顶点被跳过。
    pub fn corner_angles(&self, closed: bool, tolerance: f64) -> Vec<(usize, f64)> {
        let mut points: Vec<Point2> = self.vertices.iter().map(|v| v.point).collect();
        if closed && points.len() >= 2 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if (last - first).norm() < tolerance {
                    points.pop();
                }
            }
        }

        let n = points.len();
        if n < 3 {
            return Vec::new();
        }

        // 逆时针为 1，顺时针为 -1；面积为零时没有内外之分
        let orientation = if closed {
            let twice: f64 = (0..n)
                .map(|i| {
                    let (a, b) = (points[i], points[(i + 1) % n]);
                    a.x * b.y - b.x * a.y
                })
                .sum();
            if twice.abs() < EPSILON {
                0.0
            } else {
                twice.signum()
            }
        } else {
            0.0
        };

        let indices: Vec<usize> = if closed { (0..n).collect() } else { (1..n - 1).collect() };
        indices
            .into_iter()
            .filter_map(|i| {
                let prev = points[(i + n - 1) % n];
                let next = points[(i + 1) % n];
                let a: Vector2 = prev - points[i];
                let b: Vector2 = next - points[i];
                let (la, lb) = (a.norm(), b.norm());
                if la < EPSILON || lb < EPSILON {
                    return None;
                }
                let cos = (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0);
                let angle = cos.acos();

                // 转向与绕向相反的顶点是凹角
                let turn = (-a).perp(&b);
                if orientation != 0.0 && turn * orientation < -EPSILON * la * lb {
                    Some((i, std::f64::consts::TAU - angle))
                } else {
                    Some((i, angle))
                }
            })
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.vertices.iter().map(|v| v.point))
    }
}

/// 样条曲线
///
/// 只保留估算切割长度所需的定义点；不做 NURBS 求值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    /// 阶数
    pub degree: u8,
    /// 控制点
    pub control_points: Vec<Point2>,
    /// 拟合点
    pub fit_points: Vec<Point2>,
    /// 是否闭合
    pub closed: bool,
}

impl Spline {
    /// 从控制点创建
    pub fn from_control_points(control_points: Vec<Point2>, degree: u8, closed: bool) -> Self {
        Self {
            degree,
            control_points,
            fit_points: Vec::new(),
            closed,
        }
    }

    /// 定义点：优先控制点，不足两个时回退到拟合点
    pub fn defining_points(&self) -> &[Point2] {
        if self.control_points.len() >= 2 || self.fit_points.is_empty() {
            &self.control_points
        } else {
            &self.fit_points
        }
    }

    /// 控制多边形长度（闭合时包含闭合边）
    pub fn control_polygon_length(&self) -> f64 {
        let pts = self.defining_points();
        if pts.len() < 2 {
            return 0.0;
        }
        let open: f64 = pts.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        if self.closed {
            open + (pts[0] - pts[pts.len() - 1]).norm()
        } else {
            open
        }
    }

    /// 使用定义点的包围盒（保守估计）
    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.defining_points().iter().copied())
    }
}
