//! 图纸单位
//!
//! 流水线内部统一使用英寸；只在提取阶段根据 DXF 头部 `$INSUNITS`
//! 把坐标换算到英寸。无单位图纸按英寸处理。

use serde::{Deserialize, Serialize};

/// 每英寸的毫米数
pub const MM_PER_INCH: f64 = 25.4;

/// 每平方英尺的平方英寸数
pub const SQ_IN_PER_SQ_FT: f64 = 144.0;

/// 绘图单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    /// 无单位（按英寸处理）
    #[default]
    Unitless,
    /// 英寸
    Inch,
    /// 英尺 (12 英寸)
    Foot,
    /// 英里
    Mile,
    /// 毫米
    Millimeter,
    /// 厘米
    Centimeter,
    /// 米
    Meter,
    /// 千米
    Kilometer,
    /// 微英寸
    Microinch,
    /// 密尔 (0.001 英寸)
    Mil,
    /// 码 (3 英尺)
    Yard,
    /// 埃 (10^-10 米)
    Angstrom,
    /// 纳米
    Nanometer,
    /// 微米
    Micron,
    /// 分米
    Decimeter,
    /// 十米
    Decameter,
    /// 百米
    Hectometer,
}

impl Unit {
    /// 由 DXF `$INSUNITS` 代码解析；未知代码返回 None
    pub fn from_insunits(code: i32) -> Option<Self> {
        let unit = match code {
            0 => Unit::Unitless,
            1 => Unit::Inch,
            2 => Unit::Foot,
            3 => Unit::Mile,
            4 => Unit::Millimeter,
            5 => Unit::Centimeter,
            6 => Unit::Meter,
            7 => Unit::Kilometer,
            8 => Unit::Microinch,
            9 => Unit::Mil,
            10 => Unit::Yard,
            11 => Unit::Angstrom,
            12 => Unit::Nanometer,
            13 => Unit::Micron,
            14 => Unit::Decimeter,
            15 => Unit::Decameter,
            16 => Unit::Hectometer,
            _ => return None,
        };
        Some(unit)
    }

    /// 获取单位到毫米的转换因子
    pub fn to_mm_factor(&self) -> f64 {
        match self {
            Unit::Unitless => MM_PER_INCH,
            Unit::Inch => MM_PER_INCH,
            Unit::Foot => 304.8,
            Unit::Mile => 1_609_344.0,
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 10.0,
            Unit::Meter => 1000.0,
            Unit::Kilometer => 1_000_000.0,
            Unit::Microinch => 0.0000254,
            Unit::Mil => 0.0254,
            Unit::Yard => 914.4,
            Unit::Angstrom => 1e-7,
            Unit::Nanometer => 1e-6,
            Unit::Micron => 0.001,
            Unit::Decimeter => 100.0,
            Unit::Decameter => 10_000.0,
            Unit::Hectometer => 100_000.0,
        }
    }

    /// 获取单位到英寸的转换因子
    pub fn to_inch_factor(&self) -> f64 {
        self.to_mm_factor() / MM_PER_INCH
    }

    /// 是否需要缩放到英寸
    pub fn needs_scaling(&self) -> bool {
        !matches!(self, Unit::Unitless | Unit::Inch)
    }
}

/// 平方英寸转平方英尺
#[inline]
pub fn sq_in_to_sq_ft(area: f64) -> f64 {
    area / SQ_IN_PER_SQ_FT
}
