//! 分析阶段的可调常量

use serde::{Deserialize, Serialize};

/// 闭合判定容差：首末顶点距离小于该值即视为闭合
pub const CLOSURE_TOLERANCE: f64 = 1e-3;

/// 样条切割长度相对控制多边形的放大系数
pub const SPLINE_LENGTH_FACTOR: f64 = 1.2;

/// 几何分析的阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    /// 多段线闭合容差
    pub closure_tolerance: f64,

    /// 冲孔/穿孔工装能加工的最小孔径（英寸）
    pub min_hole_diameter: f64,

    /// 可搬运的最小零件尺寸（英寸）
    pub min_part_dimension: f64,

    /// 长宽比超过该值有翘曲风险
    pub max_aspect_ratio: f64,

    /// 两孔中心距小于 系数 × (半径之和) 视为过近
    pub hole_spacing_factor: f64,

    /// 样条切割长度相对控制多边形的放大系数，测量与评分共用
    pub spline_length_factor: f64,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            closure_tolerance: CLOSURE_TOLERANCE,
            min_hole_diameter: 0.0625,
            min_part_dimension: 0.5,
            max_aspect_ratio: 10.0,
            hole_spacing_factor: 1.5,
            spline_length_factor: SPLINE_LENGTH_FACTOR,
        }
    }
}

impl AnalysisLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_hole_diameter(mut self, diameter: f64) -> Self {
        self.min_hole_diameter = diameter;
        self
    }

    pub fn with_min_part_dimension(mut self, dimension: f64) -> Self {
        self.min_part_dimension = dimension;
        self
    }

    pub fn with_max_aspect_ratio(mut self, ratio: f64) -> Self {
        self.max_aspect_ratio = ratio;
        self
    }

    pub fn with_spline_length_factor(mut self, factor: f64) -> Self {
        self.spline_length_factor = factor;
        self
    }
}

/// 切割分段单价（美元/英寸）及分类阈值
///
/// 单价满足 straight < curved < tight_corner < intricate。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentRates {
    pub straight: f64,
    pub curved: f64,
    pub tight_corner: f64,
    pub intricate: f64,

    /// 半径低于该值的曲线段为小半径拐角
    pub tight_radius: f64,

    /// 多段线顶点夹角低于该值（度）为尖角
    pub tight_angle_degrees: f64,

    /// 每个尖角顶点计入的等效切割长度（英寸）
    pub corner_allowance: f64,

    /// 评分权重：曲线段、小半径拐角、复杂曲线所占比例的系数
    pub score_weights: [f64; 3],

    /// 切割密度（段数/包围盒平方英寸）的两级阈值
    pub density_thresholds: [f64; 2],

    /// 超过两级密度阈值时的加分
    pub density_bonus: [f64; 2],
}

impl Default for SegmentRates {
    fn default() -> Self {
        Self {
            straight: 0.25,
            curved: 0.35,
            tight_corner: 0.50,
            intricate: 0.75,
            tight_radius: 0.25,
            tight_angle_degrees: 45.0,
            corner_allowance: 0.25,
            score_weights: [20.0, 30.0, 40.0],
            density_thresholds: [0.5, 2.0],
            density_bonus: [10.0, 20.0],
        }
    }
}

impl SegmentRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rates(mut self, straight: f64, curved: f64, tight_corner: f64, intricate: f64) -> Self {
        self.straight = straight;
        self.curved = curved;
        self.tight_corner = tight_corner;
        self.intricate = intricate;
        self
    }

    pub fn with_tight_radius(mut self, radius: f64) -> Self {
        self.tight_radius = radius;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates_strictly_increase() {
        let r = SegmentRates::default();
        assert!(r.straight < r.curved);
        assert!(r.curved < r.tight_corner);
        assert!(r.tight_corner < r.intricate);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let limits: AnalysisLimits = serde_json::from_str(r#"{"max_aspect_ratio": 6.0}"#).unwrap();
        assert_eq!(limits.max_aspect_ratio, 6.0);
        assert_eq!(limits.closure_tolerance, CLOSURE_TOLERANCE);
    }
}
