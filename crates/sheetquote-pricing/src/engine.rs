//! 报价引擎
//!
//! 计算顺序：
//! 1. 材料费 = 面积 × 数量 × 板厚 × 密度 × 单价
//! 2. 切割费 = 开机费 + 切割项 × 数量 × 厚度/不锈钢倍率；实测几何用分段加权成本，
//!    估算输入用 切割长度 × 平均单价
//! 3. 穿孔费按孔径分档累加；无孔几何时按孔数统一价
//! 4. 折弯费 = 开机费 + 折弯数 × 单价 × 数量；无折弯几何时按声明的复杂度分档
//! 5. 公差倍率、（仅实测）复杂度倍率作用于以上四项
//! 6. 表面处理按整单平方英尺计价，加急费按小计比例，最后乘以利润系数

use crate::config::{PierceBand, PricingConfig};
use crate::error::{PricingError, Result};
use crate::order::{BendComplexity, OrderParameters};
use crate::quote::{
    EstimatedPart, HoleDistribution, PartMeasurements, QuoteDetails, QuotePricing,
};
use sheetquote_analysis::{ComplexityAnalysis, Confidence, DxfAnalysis};
use tracing::{debug, warn};

/// 报价引擎
///
/// 只持有只读价目表，可在线程间共享。
#[derive(Debug, Clone, Default)]
pub struct CostEngine {
    config: PricingConfig,
}

impl CostEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// 按图纸分析结果报价
    pub fn price_measured(
        &self,
        analysis: &DxfAnalysis,
        complexity: &ComplexityAnalysis,
        order: &OrderParameters,
    ) -> Result<QuotePricing> {
        self.price(PartMeasurements::Measured { analysis, complexity }, order)
    }

    /// 按调用方估算值报价
    pub fn price_estimated(&self, part: &EstimatedPart, order: &OrderParameters) -> Result<QuotePricing> {
        self.price(PartMeasurements::Estimated(part), order)
    }

    pub fn price(&self, part: PartMeasurements<'_>, order: &OrderParameters) -> Result<QuotePricing> {
        order.validate()?;
        validate_measurements(&part)?;
        let config = &self.config;
        let material = config.materials.get(&order.material)?;

        let quantity = f64::from(order.quantity);
        let area = part.area();
        let total_area = area * quantity;
        let weight = total_area * order.thickness * material.density;
        let cutting_multiplier = config.cutting_multiplier(order.thickness, material);

        let material_cost = weight * material.price_per_pound;

        let cutting_cost = config.cutting_setup
            + match part {
                PartMeasurements::Measured { complexity, .. } => {
                    complexity.weighted_cutting_cost * quantity * cutting_multiplier
                }
                PartMeasurements::Estimated(estimated) => {
                    estimated.cut_length * quantity * config.cutting_rate * cutting_multiplier
                }
            };

        let mut hole_distribution = HoleDistribution::default();
        let (pierce_cost, hole_count) = match part {
            PartMeasurements::Measured { analysis, .. } => {
                let per_part: f64 = analysis
                    .holes
                    .iter()
                    .map(|hole| {
                        match config.pierce_band(hole.diameter) {
                            PierceBand::Small => hole_distribution.small += 1,
                            PierceBand::Medium => hole_distribution.medium += 1,
                            PierceBand::Large => hole_distribution.large += 1,
                            PierceBand::ExtraLarge => hole_distribution.extra_large += 1,
                        }
                        config.pierce_price(hole.diameter)
                    })
                    .sum();
                (per_part * quantity, analysis.hole_count())
            }
            PartMeasurements::Estimated(estimated) => (
                f64::from(estimated.hole_count) * config.pierce_flat_price * quantity,
                estimated.hole_count as usize,
            ),
        };

        let (bend_cost, bend_count) = match part {
            PartMeasurements::Measured { analysis, .. } => {
                let count = analysis.bend_count();
                (self.bend_cost_by_count(count as f64, quantity), count)
            }
            PartMeasurements::Estimated(estimated) => {
                let cost = if estimated.bend_complexity != BendComplexity::None {
                    config.bend_tier_price(estimated.bend_complexity) * quantity
                } else {
                    self.bend_cost_by_count(f64::from(estimated.bend_count), quantity)
                };
                (cost, estimated.bend_count as usize)
            }
        };

        let tolerance_multiplier = config.tolerance_multiplier(order.tolerance_level);
        let complexity_multiplier = match part {
            PartMeasurements::Measured { analysis, .. } => {
                config.complexity_multiplier(analysis.complexity)
            }
            PartMeasurements::Estimated(_) => 1.0,
        };
        let factor = tolerance_multiplier * complexity_multiplier;

        let material_cost = material_cost * factor;
        let cutting_cost = cutting_cost * factor;
        let pierce_cost = pierce_cost * factor;
        let bend_cost = bend_cost * factor;
        let finish_cost = config.finish_cost(total_area, order.finish_type);

        let subtotal = material_cost + cutting_cost + pierce_cost + bend_cost + finish_cost;
        let rush_fee = subtotal * config.rush_factor(order.urgency);
        let total = (subtotal + rush_fee) * config.margin;

        let warnings = self.warnings(&part);

        debug!(
            material = %material.id,
            source = ?part.source(),
            quantity = order.quantity,
            subtotal,
            total,
            "quote priced"
        );

        Ok(QuotePricing {
            material_cost,
            cutting_cost,
            pierce_cost,
            bend_cost,
            finish_cost,
            rush_fee,
            subtotal,
            total,
            unit_price: total / quantity,
            details: QuoteDetails {
                weight_pounds: weight,
                total_area_sq_in: total_area,
                cut_length: part.cut_length(),
                hole_count,
                bend_count,
                complexity: match part {
                    PartMeasurements::Measured { analysis, .. } => Some(analysis.complexity),
                    PartMeasurements::Estimated(_) => None,
                },
                complexity_score: match part {
                    PartMeasurements::Measured { complexity, .. } => {
                        Some(complexity.complexity_score)
                    }
                    PartMeasurements::Estimated(_) => None,
                },
                measurement_source: part.source(),
                tolerance_multiplier,
                complexity_multiplier,
                warnings,
                hole_distribution,
            },
            notes: order.notes.clone(),
        })
    }

    fn bend_cost_by_count(&self, count: f64, quantity: f64) -> f64 {
        if count > 0.0 {
            self.config.bend_setup + count * self.config.bend_price * quantity
        } else {
            0.0
        }
    }

    fn warnings(&self, part: &PartMeasurements<'_>) -> Vec<String> {
        match part {
            PartMeasurements::Measured { analysis, .. } => {
                let mut warnings = analysis.warnings.clone();
                if analysis.confidence == Confidence::Low {
                    warn!("pricing a drawing with low measurement confidence");
                    warnings.push(
                        "Measurements have low confidence; confirm the quote against estimated dimensions"
                            .to_string(),
                    );
                }
                warnings
            }
            PartMeasurements::Estimated(estimated) => {
                let mut warnings =
                    vec!["Priced from estimated dimensions without a drawing".to_string()];
                if estimated.area == 0.0 {
                    warnings.push("Estimated area is zero; material cost is not included".to_string());
                }
                warnings
            }
        }
    }
}

fn validate_measurements(part: &PartMeasurements<'_>) -> Result<()> {
    let (area_field, cut_field) = match part {
        PartMeasurements::Measured { .. } => ("analysis.area", "analysis.cutLength"),
        PartMeasurements::Estimated(_) => ("area", "cutLength"),
    };
    if !(part.area().is_finite() && part.area() >= 0.0) {
        return Err(PricingError::validation(
            area_field,
            format!("must be a non-negative number, got {}", part.area()),
        ));
    }
    if !(part.cut_length().is_finite() && part.cut_length() >= 0.0) {
        return Err(PricingError::validation(
            cut_field,
            format!("must be a non-negative number, got {}", part.cut_length()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money;
    use crate::order::{FinishType, ToleranceLevel, Urgency};
    use crate::quote::MeasurementSource;
    use approx::assert_relative_eq;
    use sheetquote_analysis::{Complexity, CuttingComplexityScorer, GeometryAnalyzer};
    use sheetquote_core::entity::Entity;
    use sheetquote_core::geometry::{Circle, Geometry, Line, Polyline};
    use sheetquote_core::math::Point2;

    fn plate(width: f64, height: f64) -> Entity {
        Entity::new(Geometry::Polyline(Polyline::from_points(
            [
                Point2::new(0.0, 0.0),
                Point2::new(width, 0.0),
                Point2::new(width, height),
                Point2::new(0.0, height),
            ],
            true,
        )))
    }

    fn measure(entities: &[Entity]) -> (DxfAnalysis, ComplexityAnalysis) {
        let analysis = GeometryAnalyzer::default().analyze(entities);
        let complexity = CuttingComplexityScorer::default().score(entities, &analysis.bounding_box);
        (analysis, complexity)
    }

    fn steel_order() -> OrderParameters {
        OrderParameters::new("mild_steel", 0.125, 1)
    }

    fn assert_reference_quote(quote: &QuotePricing) {
        assert_eq!(money::format(quote.material_cost), "4.34");
        assert_eq!(money::format(quote.cutting_cost), "37.00");
        assert_eq!(quote.pierce_cost, 0.0);
        assert_eq!(quote.bend_cost, 0.0);
        assert_eq!(quote.finish_cost, 0.0);
        assert_eq!(quote.rush_fee, 0.0);
        assert_eq!(money::format(quote.subtotal), "41.34");
        assert_eq!(money::format(quote.total), "49.61");
    }

    #[test]
    fn test_reference_part_estimated() {
        let quote = CostEngine::default()
            .price_estimated(&EstimatedPart::new(144.0, 48.0), &steel_order())
            .unwrap();
        assert_relative_eq!(quote.material_cost, 144.0 * 0.125 * 0.2836 * 0.85, epsilon = 1e-12);
        assert_reference_quote(&quote);
        assert_eq!(quote.details.measurement_source, MeasurementSource::Estimated);
        assert_eq!(quote.details.complexity, None);
    }

    #[test]
    fn test_reference_part_measured() {
        let (analysis, complexity) = measure(&[plate(12.0, 12.0)]);
        assert_relative_eq!(complexity.weighted_cutting_cost, 12.0, epsilon = 1e-12);
        let quote = CostEngine::default()
            .price_measured(&analysis, &complexity, &steel_order())
            .unwrap();
        assert_reference_quote(&quote);
        assert_eq!(quote.details.measurement_source, MeasurementSource::Measured);
        assert_relative_eq!(quote.details.weight_pounds, 144.0 * 0.125 * 0.2836, epsilon = 1e-12);
        assert!(quote.details.warnings.is_empty());
    }

    #[test]
    fn test_pierce_tiers_and_distribution() {
        let mut entities = vec![plate(20.0, 20.0)];
        for (i, diameter) in [0.20, 1.0, 3.0].into_iter().enumerate() {
            let center = Point2::new(4.0 + 6.0 * i as f64, 10.0);
            entities.push(Entity::new(Geometry::Circle(Circle::new(center, diameter / 2.0))));
        }
        let (analysis, complexity) = measure(&entities);
        let quote = CostEngine::default()
            .price_measured(&analysis, &complexity, &OrderParameters::new("mild_steel", 0.125, 2))
            .unwrap();

        let dist = quote.details.hole_distribution;
        assert_eq!((dist.small, dist.medium, dist.large, dist.extra_large), (1, 0, 1, 1));
        assert_eq!(dist.total(), quote.details.hole_count);
        assert_relative_eq!(quote.pierce_cost, (0.50 + 1.00 + 1.50) * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_measured_bends_add_setup() {
        let bend = Entity::new(Geometry::Line(Line::new(
            Point2::new(0.0, 5.0),
            Point2::new(10.0, 5.0),
        )))
        .with_layer("BEND");
        let (analysis, complexity) = measure(&[plate(10.0, 10.0), bend]);
        let quote = CostEngine::default()
            .price_measured(&analysis, &complexity, &OrderParameters::new("mild_steel", 0.125, 4))
            .unwrap();
        assert_eq!(quote.details.bend_count, 1);
        assert_relative_eq!(quote.bend_cost, 15.0 + 2.50 * 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_estimated_bend_tier_and_flat_pierce() {
        let part = EstimatedPart::new(100.0, 40.0)
            .with_holes(4)
            .with_bends(2, BendComplexity::Moderate);
        let quote = CostEngine::default()
            .price_estimated(&part, &OrderParameters::new("mild_steel", 0.125, 3))
            .unwrap();
        assert_relative_eq!(quote.bend_cost, 25.0 * 3.0, epsilon = 1e-12);
        assert_relative_eq!(quote.pierce_cost, 4.0 * 0.75 * 3.0, epsilon = 1e-12);
        assert_eq!(quote.details.hole_distribution, HoleDistribution::default());

        let counted = EstimatedPart::new(100.0, 40.0).with_bends(2, BendComplexity::None);
        let quote = CostEngine::default()
            .price_estimated(&counted, &OrderParameters::new("mild_steel", 0.125, 3))
            .unwrap();
        assert_relative_eq!(quote.bend_cost, 15.0 + 2.0 * 2.50 * 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multipliers_rush_and_finish() {
        let order = steel_order()
            .with_tolerance(ToleranceLevel::Tight)
            .with_urgency(Urgency::Rush)
            .with_finish(FinishType::PowderCoat);
        let quote = CostEngine::default()
            .price_estimated(&EstimatedPart::new(144.0, 48.0), &order)
            .unwrap();

        let core = (144.0 * 0.125 * 0.2836 * 0.85 + 37.0) * 1.5;
        let subtotal = core + 3.50;
        assert_relative_eq!(quote.finish_cost, 3.50, epsilon = 1e-12);
        assert_relative_eq!(quote.subtotal, subtotal, epsilon = 1e-9);
        assert_relative_eq!(quote.rush_fee, subtotal * 0.25, epsilon = 1e-9);
        assert_relative_eq!(quote.total, subtotal * 1.25 * 1.20, epsilon = 1e-9);
    }

    #[test]
    fn test_emergency_precision_on_reference_part() {
        let order = steel_order()
            .with_tolerance(ToleranceLevel::Precision)
            .with_urgency(Urgency::Emergency);
        let quote = CostEngine::default()
            .price_estimated(&EstimatedPart::new(144.0, 48.0), &order)
            .unwrap();

        let material = 144.0 * 0.125 * 0.2836 * 0.85;
        assert_eq!(quote.details.tolerance_multiplier, 1.25);
        assert_relative_eq!(quote.material_cost, material * 1.25, epsilon = 1e-12);
        assert_relative_eq!(quote.cutting_cost, 37.0 * 1.25, epsilon = 1e-12);
        let subtotal = (material + 37.0) * 1.25;
        assert_relative_eq!(quote.subtotal, subtotal, epsilon = 1e-9);
        assert_relative_eq!(quote.rush_fee, subtotal * 0.50, epsilon = 1e-9);
        assert_relative_eq!(quote.total, subtotal * 1.50 * 1.20, epsilon = 1e-9);
        assert_eq!(money::format(quote.total), "93.01");
    }

    #[test]
    fn test_measured_complexity_factors() {
        let (mut analysis, complexity) = measure(&[plate(12.0, 12.0)]);
        let engine = CostEngine::default();
        let simple = engine
            .price_measured(&analysis, &complexity, &steel_order())
            .unwrap();
        assert_eq!(simple.details.complexity_multiplier, 1.0);

        for (level, factor) in [(Complexity::Moderate, 1.15), (Complexity::Complex, 1.35)] {
            analysis.complexity = level;
            let quote = engine
                .price_measured(&analysis, &complexity, &steel_order())
                .unwrap();
            assert_eq!(quote.details.complexity_multiplier, factor);
            assert_relative_eq!(quote.material_cost, simple.material_cost * factor, epsilon = 1e-12);
            assert_relative_eq!(quote.cutting_cost, 37.0 * factor, epsilon = 1e-12);
            assert_relative_eq!(quote.subtotal, simple.subtotal * factor, epsilon = 1e-9);
            assert_relative_eq!(quote.total, simple.subtotal * factor * 1.20, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_complexity_multiplier_only_for_measured() {
        let mut entities = vec![plate(30.0, 30.0)];
        for i in 0..11 {
            let center = Point2::new(2.0 + 2.5 * i as f64, 15.0);
            entities.push(Entity::new(Geometry::Circle(Circle::new(center, 0.25))));
        }
        // 11 个孔 +2，超过 5 条多段线 +1，达到中等分级
        for i in 0..6 {
            let x = 2.0 + 4.0 * i as f64;
            entities.push(Entity::new(Geometry::Polyline(Polyline::from_points(
                [Point2::new(x, 2.0), Point2::new(x + 1.0, 2.0), Point2::new(x + 1.0, 3.0)],
                false,
            ))));
        }
        entities.push(
            Entity::new(Geometry::Line(Line::new(Point2::new(0.0, 25.0), Point2::new(30.0, 25.0))))
                .with_layer("bend"),
        );
        let (analysis, complexity) = measure(&entities);
        let quote = CostEngine::default()
            .price_measured(&analysis, &complexity, &steel_order())
            .unwrap();
        assert_eq!(quote.details.complexity, Some(analysis.complexity));
        assert_eq!(
            quote.details.complexity_multiplier,
            CostEngine::default().config().complexity_multiplier(analysis.complexity)
        );
        assert!(quote.details.complexity_multiplier > 1.0);

        let estimated = CostEngine::default()
            .price_estimated(&EstimatedPart::new(analysis.area, analysis.cut_length), &steel_order())
            .unwrap();
        assert_eq!(estimated.details.complexity_multiplier, 1.0);
    }

    #[test]
    fn test_stainless_cuts_cost_more() {
        let part = EstimatedPart::new(144.0, 48.0);
        let engine = CostEngine::default();
        let steel = engine.price_estimated(&part, &steel_order()).unwrap();
        let stainless = engine
            .price_estimated(&part, &OrderParameters::new("stainless_304", 0.125, 1))
            .unwrap();
        assert_relative_eq!(stainless.cutting_cost, 25.0 + 48.0 * 0.25 * 1.2, epsilon = 1e-12);
        assert!(stainless.cutting_cost > steel.cutting_cost);
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let err = CostEngine::default()
            .price_estimated(&EstimatedPart::new(10.0, 10.0), &OrderParameters::new("kryptonite", 0.1, 1))
            .unwrap_err();
        assert_eq!(err.field(), "material");
    }

    #[test]
    fn test_invalid_estimate_fields() {
        let engine = CostEngine::default();
        let err = engine
            .price_estimated(&EstimatedPart::new(-1.0, 10.0), &steel_order())
            .unwrap_err();
        assert_eq!(err.field(), "area");
        let err = engine
            .price_estimated(&EstimatedPart::new(1.0, f64::INFINITY), &steel_order())
            .unwrap_err();
        assert_eq!(err.field(), "cutLength");
        let err = engine
            .price_estimated(&EstimatedPart::new(1.0, 1.0), &OrderParameters::new("mild_steel", -0.1, 1))
            .unwrap_err();
        assert_eq!(err.field(), "thickness");
    }

    #[test]
    fn test_low_confidence_is_flagged() {
        let open = Entity::new(Geometry::Line(Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0))));
        let (analysis, complexity) = measure(&[open]);
        assert_eq!(analysis.confidence, Confidence::Low);
        let quote = CostEngine::default()
            .price_measured(&analysis, &complexity, &steel_order())
            .unwrap();
        assert!(quote.details.warnings.iter().any(|w| w.contains("low confidence")));
        assert_eq!(quote.material_cost, 0.0);
    }

    #[test]
    fn test_quote_json_money_strings() {
        let quote = CostEngine::default()
            .price_estimated(&EstimatedPart::new(144.0, 48.0), &steel_order().with_notes("deburr"))
            .unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["total"], "49.61");
        assert_eq!(json["cuttingCost"], "37.00");
        assert_eq!(json["details"]["measurementSource"], "estimated");
        assert_eq!(json["details"]["holeDistribution"]["extraLarge"], 0);
        assert_eq!(json["notes"], "deburr");

        let back: QuotePricing = serde_json::from_value(json).unwrap();
        assert_eq!(money::format(back.total), "49.61");
    }
}
