//! 报价费率表
//!
//! 所有常量集中于此，`Default` 即为标准价目；可整体或局部从 JSON 覆盖。

use crate::error::{PricingError, Result};
use crate::material::{Material, MaterialCatalog};
use crate::order::{BendComplexity, FinishType, ToleranceLevel, Urgency};
use serde::{Deserialize, Serialize};
use sheetquote_analysis::Complexity;
use sheetquote_core::units::sq_in_to_sq_ft;

/// 板厚分档：厚度不超过 `max_thickness` 时切割费率乘以 `multiplier`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThicknessBand {
    pub max_thickness: f64,
    pub multiplier: f64,
}

/// 穿孔分档：孔径不超过 `max_diameter` 时的单孔价格
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PierceTier {
    pub max_diameter: f64,
    pub price: f64,
}

/// 孔径档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PierceBand {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

/// 表面处理单价（美元/平方英尺）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishRates {
    pub powder_coat: f64,
    pub anodize: f64,
    pub galvanize: f64,
    pub paint: f64,
}

impl Default for FinishRates {
    fn default() -> Self {
        Self {
            powder_coat: 3.50,
            anodize: 4.00,
            galvanize: 2.50,
            paint: 3.00,
        }
    }
}

impl FinishRates {
    pub fn rate(&self, finish: FinishType) -> f64 {
        match finish {
            FinishType::None => 0.0,
            FinishType::PowderCoat => self.powder_coat,
            FinishType::Anodize => self.anodize,
            FinishType::Galvanize => self.galvanize,
            FinishType::Paint => self.paint,
        }
    }
}

/// 完整价目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub materials: MaterialCatalog,

    /// 切割开机费
    pub cutting_setup: f64,
    /// 平均切割单价（美元/英寸），估算输入使用
    pub cutting_rate: f64,
    /// 按厚度升序排列的分档
    pub thickness_bands: Vec<ThicknessBand>,
    /// 超过最后一档时的倍率
    pub thickness_beyond_multiplier: f64,
    /// 不锈钢系材料切割倍率
    pub stainless_multiplier: f64,

    /// 按孔径升序排列的三档，超出为最大档
    pub pierce_tiers: [PierceTier; 3],
    pub pierce_beyond_price: f64,
    /// 无孔几何时的单孔统一价
    pub pierce_flat_price: f64,

    pub bend_setup: f64,
    pub bend_price: f64,
    /// 无折弯几何时按声明复杂度的单件价：simple / moderate / complex
    pub bend_tier_prices: [f64; 3],

    pub finish_rates: FinishRates,

    /// standard / precision / tight
    pub tolerance_multipliers: [f64; 3],
    /// simple / moderate / complex，只作用于实测几何
    pub complexity_multipliers: [f64; 3],
    /// standard / rush / emergency
    pub rush_factors: [f64; 3],

    /// 固定利润系数
    pub margin: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            materials: MaterialCatalog::default(),
            cutting_setup: 25.0,
            cutting_rate: 0.25,
            thickness_bands: vec![
                ThicknessBand { max_thickness: 0.125, multiplier: 1.0 },
                ThicknessBand { max_thickness: 0.25, multiplier: 1.5 },
                ThicknessBand { max_thickness: 0.5, multiplier: 2.0 },
            ],
            thickness_beyond_multiplier: 3.0,
            stainless_multiplier: 1.2,
            pierce_tiers: [
                PierceTier { max_diameter: 0.25, price: 0.50 },
                PierceTier { max_diameter: 0.75, price: 0.75 },
                PierceTier { max_diameter: 2.0, price: 1.00 },
            ],
            pierce_beyond_price: 1.50,
            pierce_flat_price: 0.75,
            bend_setup: 15.0,
            bend_price: 2.50,
            bend_tier_prices: [10.0, 25.0, 50.0],
            finish_rates: FinishRates::default(),
            tolerance_multipliers: [1.0, 1.25, 1.5],
            complexity_multipliers: [1.0, 1.15, 1.35],
            rush_factors: [0.0, 0.25, 0.50],
            margin: 1.20,
        }
    }
}

impl PricingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本加载，缺省字段取默认值
    pub fn from_json(text: &str) -> Result<Self> {
        let config: PricingConfig = serde_json::from_str(text)
            .map_err(|e| PricingError::validation("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.insert(material);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_cutting_setup(mut self, setup: f64) -> Self {
        self.cutting_setup = setup;
        self
    }

    /// 厚度分档倍率
    pub fn thickness_multiplier(&self, thickness: f64) -> f64 {
        self.thickness_bands
            .iter()
            .find(|band| thickness <= band.max_thickness)
            .map_or(self.thickness_beyond_multiplier, |band| band.multiplier)
    }

    /// 切割倍率：厚度分档 × 不锈钢上浮
    pub fn cutting_multiplier(&self, thickness: f64, material: &Material) -> f64 {
        let stainless = if material.stainless {
            self.stainless_multiplier
        } else {
            1.0
        };
        self.thickness_multiplier(thickness) * stainless
    }

    pub fn pierce_band(&self, diameter: f64) -> PierceBand {
        let [small, medium, large] = &self.pierce_tiers;
        if diameter <= small.max_diameter {
            PierceBand::Small
        } else if diameter <= medium.max_diameter {
            PierceBand::Medium
        } else if diameter <= large.max_diameter {
            PierceBand::Large
        } else {
            PierceBand::ExtraLarge
        }
    }

    /// 单孔穿孔价
    pub fn pierce_price(&self, diameter: f64) -> f64 {
        match self.pierce_band(diameter) {
            PierceBand::Small => self.pierce_tiers[0].price,
            PierceBand::Medium => self.pierce_tiers[1].price,
            PierceBand::Large => self.pierce_tiers[2].price,
            PierceBand::ExtraLarge => self.pierce_beyond_price,
        }
    }

    pub fn bend_tier_price(&self, complexity: BendComplexity) -> f64 {
        match complexity {
            BendComplexity::None => 0.0,
            BendComplexity::Simple => self.bend_tier_prices[0],
            BendComplexity::Moderate => self.bend_tier_prices[1],
            BendComplexity::Complex => self.bend_tier_prices[2],
        }
    }

    /// 表面处理费：面积换算为平方英尺后乘以单价
    pub fn finish_cost(&self, area_sq_in: f64, finish: FinishType) -> f64 {
        sq_in_to_sq_ft(area_sq_in) * self.finish_rates.rate(finish)
    }

    pub fn tolerance_multiplier(&self, level: ToleranceLevel) -> f64 {
        match level {
            ToleranceLevel::Standard => self.tolerance_multipliers[0],
            ToleranceLevel::Precision => self.tolerance_multipliers[1],
            ToleranceLevel::Tight => self.tolerance_multipliers[2],
        }
    }

    pub fn complexity_multiplier(&self, complexity: Complexity) -> f64 {
        match complexity {
            Complexity::Simple => self.complexity_multipliers[0],
            Complexity::Moderate => self.complexity_multipliers[1],
            Complexity::Complex => self.complexity_multipliers[2],
        }
    }

    pub fn rush_factor(&self, urgency: Urgency) -> f64 {
        match urgency {
            Urgency::Standard => self.rush_factors[0],
            Urgency::Rush => self.rush_factors[1],
            Urgency::Emergency => self.rush_factors[2],
        }
    }

    /// 价目表自洽性校验
    pub fn validate(&self) -> Result<()> {
        self.materials.validate()?;
        let mut last = 0.0;
        for tier in &self.pierce_tiers {
            if tier.max_diameter <= last {
                return Err(PricingError::validation(
                    "pierce_tiers",
                    "diameters must be strictly increasing",
                ));
            }
            last = tier.max_diameter;
        }
        if self
            .thickness_bands
            .windows(2)
            .any(|w| w[1].max_thickness <= w[0].max_thickness)
        {
            return Err(PricingError::validation(
                "thickness_bands",
                "thicknesses must be strictly increasing",
            ));
        }
        if !(self.margin.is_finite() && self.margin > 0.0) {
            return Err(PricingError::validation("margin", "must be positive"));
        }
        Ok(())
    }
}
