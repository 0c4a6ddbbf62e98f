//! 报价输入与输出数据结构

use crate::order::BendComplexity;
use serde::{Deserialize, Serialize};
use sheetquote_analysis::{Complexity, ComplexityAnalysis, DxfAnalysis};

/// 无图纸时调用方估算的零件数据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatedPart {
    /// 单件面积（平方英寸）
    pub area: f64,
    /// 单件切割长度（英寸）
    pub cut_length: f64,
    pub hole_count: u32,
    pub bend_count: u32,
    pub bend_complexity: BendComplexity,
}

impl EstimatedPart {
    pub fn new(area: f64, cut_length: f64) -> Self {
        Self {
            area,
            cut_length,
            ..Default::default()
        }
    }

    pub fn with_holes(mut self, count: u32) -> Self {
        self.hole_count = count;
        self
    }

    pub fn with_bends(mut self, count: u32, complexity: BendComplexity) -> Self {
        self.bend_count = count;
        self.bend_complexity = complexity;
        self
    }
}

/// 报价所用的零件数据来源
#[derive(Debug, Clone, Copy)]
pub enum PartMeasurements<'a> {
    /// 来自真实图纸的分析结果
    Measured {
        analysis: &'a DxfAnalysis,
        complexity: &'a ComplexityAnalysis,
    },
    /// 调用方估算值
    Estimated(&'a EstimatedPart),
}

impl PartMeasurements<'_> {
    pub fn source(&self) -> MeasurementSource {
        match self {
            PartMeasurements::Measured { .. } => MeasurementSource::Measured,
            PartMeasurements::Estimated(_) => MeasurementSource::Estimated,
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            PartMeasurements::Measured { analysis, .. } => analysis.area,
            PartMeasurements::Estimated(part) => part.area,
        }
    }

    pub fn cut_length(&self) -> f64 {
        match self {
            PartMeasurements::Measured { analysis, .. } => analysis.cut_length,
            PartMeasurements::Estimated(part) => part.cut_length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSource {
    Measured,
    Estimated,
}

/// 各穿孔档位的孔数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleDistribution {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
    pub extra_large: usize,
}

impl HoleDistribution {
    pub fn total(&self) -> usize {
        self.small + self.medium + self.large + self.extra_large
    }
}

/// 报价明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetails {
    /// 整单重量（磅）
    pub weight_pounds: f64,
    /// 整单面积（平方英寸）
    pub total_area_sq_in: f64,
    /// 单件切割长度
    pub cut_length: f64,
    pub hole_count: usize,
    pub bend_count: usize,
    /// 仅实测几何有分级
    pub complexity: Option<Complexity>,
    /// 切割路径 0-100 评分，仅实测几何有
    pub complexity_score: Option<f64>,
    pub measurement_source: MeasurementSource,
    pub tolerance_multiplier: f64,
    pub complexity_multiplier: f64,
    pub warnings: Vec<String>,
    pub hole_distribution: HoleDistribution,
}

/// 逐项报价
///
/// 一经生成不再修改；需要调整时重新调用引擎。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePricing {
    #[serde(with = "crate::money")]
    pub material_cost: f64,
    #[serde(with = "crate::money")]
    pub cutting_cost: f64,
    #[serde(with = "crate::money")]
    pub pierce_cost: f64,
    #[serde(with = "crate::money")]
    pub bend_cost: f64,
    #[serde(with = "crate::money")]
    pub finish_cost: f64,
    #[serde(with = "crate::money")]
    pub rush_fee: f64,
    #[serde(with = "crate::money")]
    pub subtotal: f64,
    #[serde(with = "crate::money")]
    pub total: f64,
    /// 单件价格
    #[serde(with = "crate::money")]
    pub unit_price: f64,
    pub details: QuoteDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
