//! 切割复杂度评分
//!
//! 对可切割实体（排除折弯线）做比 [`GeometryAnalyzer`](crate::GeometryAnalyzer)
//! 更细的分段分类，得到 0-100 的复杂度评分和按分段单价加权的切割成本。
//! 评分与工艺无关：材料和厚度由报价引擎以系数形式施加。

use crate::bend::{BendLineClassifier, LayerConventions};
use crate::config::{AnalysisLimits, SegmentRates, CLOSURE_TOLERANCE, SPLINE_LENGTH_FACTOR};
use serde::{Deserialize, Serialize};
use sheetquote_core::entity::Entity;
use sheetquote_core::geometry::Geometry;
use sheetquote_core::math::BoundingBox2;
use std::sync::Arc;
use tracing::debug;

/// 分段类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Straight,
    Curved,
    TightCorner,
    Intricate,
}

/// 切割分段（临时产物，不持久化）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuttingSegment {
    pub kind: SegmentKind,
    pub length: f64,
    pub unit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl CuttingSegment {
    pub fn cost(&self) -> f64 {
        self.length * self.unit_rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationKind {
    /// 加大拐角半径
    CornerRadius,
    /// 改用其他切割工艺
    AlternativeProcess,
    /// 增加准备时间附加费
    SetupPremium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub impact: Impact,
}

/// 切割复杂度分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityAnalysis {
    pub segments: Vec<CuttingSegment>,
    pub straight_count: usize,
    pub curved_count: usize,
    pub tight_corner_count: usize,
    pub intricate_count: usize,
    /// 0-100
    pub complexity_score: f64,
    /// Σ 分段长度 × 分段单价
    pub weighted_cutting_cost: f64,
    pub recommendations: Vec<Recommendation>,
}

impl ComplexityAnalysis {
    pub fn total_cuts(&self) -> usize {
        self.segments.len()
    }
}

/// 切割复杂度评分器
#[derive(Clone)]
pub struct CuttingComplexityScorer {
    classifier: Arc<dyn BendLineClassifier>,
    rates: SegmentRates,
    closure_tolerance: f64,
    spline_length_factor: f64,
}

impl Default for CuttingComplexityScorer {
    fn default() -> Self {
        Self::new(Arc::new(LayerConventions::default()))
    }
}

impl std::fmt::Debug for CuttingComplexityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuttingComplexityScorer")
            .field("rates", &self.rates)
            .field("closure_tolerance", &self.closure_tolerance)
            .field("spline_length_factor", &self.spline_length_factor)
            .finish_non_exhaustive()
    }
}

impl CuttingComplexityScorer {
    pub fn new(classifier: Arc<dyn BendLineClassifier>) -> Self {
        Self {
            classifier,
            rates: SegmentRates::default(),
            closure_tolerance: CLOSURE_TOLERANCE,
            spline_length_factor: SPLINE_LENGTH_FACTOR,
        }
    }

    pub fn with_rates(mut self, rates: SegmentRates) -> Self {
        self.rates = rates;
        self
    }

    /// 闭合容差与样条系数取自几何分析阈值，保证两个阶段的测量一致
    pub fn with_limits(mut self, limits: &AnalysisLimits) -> Self {
        self.closure_tolerance = limits.closure_tolerance;
        self.spline_length_factor = limits.spline_length_factor;
        self
    }

    pub fn rates(&self) -> &SegmentRates {
        &self.rates
    }

    /// 对实体评分；包围盒取自几何分析结果
    pub fn score(&self, entities: &[Entity], bounding_box: &BoundingBox2) -> ComplexityAnalysis {
        let segments = self.segments(entities);

        let count = |kind: SegmentKind| segments.iter().filter(|s| s.kind == kind).count();
        let straight_count = count(SegmentKind::Straight);
        let curved_count = count(SegmentKind::Curved);
        let tight_corner_count = count(SegmentKind::TightCorner);
        let intricate_count = count(SegmentKind::Intricate);

        let complexity_score = self.complexity_score(
            segments.len(),
            curved_count,
            tight_corner_count,
            intricate_count,
            bounding_box,
        );
        let weighted_cutting_cost = segments.iter().map(CuttingSegment::cost).sum();
        let recommendations =
            Self::recommendations(tight_corner_count, intricate_count, complexity_score);

        debug!(
            "Scored {} segments ({} straight, {} curved, {} tight, {} intricate): score {:.1}, weighted cost {:.2}",
            segments.len(),
            straight_count,
            curved_count,
            tight_corner_count,
            intricate_count,
            complexity_score,
            weighted_cutting_cost
        );

        ComplexityAnalysis {
            segments,
            straight_count,
            curved_count,
            tight_corner_count,
            intricate_count,
            complexity_score,
            weighted_cutting_cost,
            recommendations,
        }
    }

    fn segments(&self, entities: &[Entity]) -> Vec<CuttingSegment> {
        let rates = &self.rates;
        let mut segments = Vec::new();

        for entity in entities {
            if !entity.geometry.is_measurable() {
                continue;
            }
            match &entity.geometry {
                Geometry::Line(line) => {
                    if self.classifier.is_bend_line(entity) {
                        continue;
                    }
                    segments.push(self.straight(line.length()));
                }
                Geometry::Arc(arc) => segments.push(self.curve(arc.length(), arc.radius)),
                Geometry::Circle(circle) => {
                    segments.push(self.curve(circle.circumference(), circle.radius))
                }
                Geometry::Polyline(polyline) => {
                    let closed = polyline.is_closed_within(self.closure_tolerance);
                    for segment in polyline.segments_with(closed) {
                        if segment.chord_length() == 0.0 {
                            continue;
                        }
                        match segment.radius() {
                            Some(radius) => segments.push(self.curve(segment.length(), radius)),
                            None => segments.push(self.straight(segment.length())),
                        }
                    }

                    let tight_angle = rates.tight_angle_degrees.to_radians();
                    for (_, angle) in polyline.corner_angles(closed, self.closure_tolerance) {
                        if angle < tight_angle {
                            segments.push(CuttingSegment {
                                kind: SegmentKind::TightCorner,
                                length: rates.corner_allowance,
                                unit_rate: rates.tight_corner,
                                radius: None,
                            });
                        }
                    }
                }
                Geometry::Spline(spline) => segments.push(CuttingSegment {
                    kind: SegmentKind::Intricate,
                    length: spline.control_polygon_length() * self.spline_length_factor,
                    unit_rate: rates.intricate,
                    radius: None,
                }),
            }
        }

        segments
    }

    fn straight(&self, length: f64) -> CuttingSegment {
        CuttingSegment {
            kind: SegmentKind::Straight,
            length,
            unit_rate: self.rates.straight,
            radius: None,
        }
    }

    fn curve(&self, length: f64, radius: f64) -> CuttingSegment {
        let (kind, unit_rate) = if radius < self.rates.tight_radius {
            (SegmentKind::TightCorner, self.rates.tight_corner)
        } else {
            (SegmentKind::Curved, self.rates.curved)
        };
        CuttingSegment {
            kind,
            length,
            unit_rate,
            radius: Some(radius),
        }
    }

    fn complexity_score(
        &self,
        total: usize,
        curved: usize,
        tight: usize,
        intricate: usize,
        bounding_box: &BoundingBox2,
    ) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let total_f = total as f64;
        let [w_curved, w_tight, w_intricate] = self.rates.score_weights;
        let mut score = curved as f64 / total_f * w_curved
            + tight as f64 / total_f * w_tight
            + intricate as f64 / total_f * w_intricate;

        let area = bounding_box.area();
        if area > 0.0 {
            let density = total_f / area;
            let [low, high] = self.rates.density_thresholds;
            let [low_bonus, high_bonus] = self.rates.density_bonus;
            if density > high {
                score += high_bonus;
            } else if density > low {
                score += low_bonus;
            }
        }

        score.clamp(0.0, 100.0)
    }

    fn recommendations(tight: usize, intricate: usize, score: f64) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if tight > 5 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::CornerRadius,
                message: format!(
                    "{tight} tight corners detected; consider larger corner radii to reduce cutting time"
                ),
                impact: Impact::Medium,
            });
        }
        if intricate > 0 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::AlternativeProcess,
                message: "Spline geometry present; consider waterjet or laser for intricate profiles"
                    .to_string(),
                impact: Impact::High,
            });
        }
        if score > 70.0 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::SetupPremium,
                message: format!("Complexity score {score:.0} warrants a setup-time premium"),
                impact: Impact::High,
            });
        }

        recommendations
    }
}
