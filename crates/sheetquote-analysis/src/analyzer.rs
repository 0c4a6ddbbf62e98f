//! 几何分析
//!
//! 把实体列表转换为制造测量值。退化输入（零面积、未闭合轮廓）不报错，
//! 而是降低置信度并给出警告，下游总能拿到结构完整的 [`DxfAnalysis`]。

use crate::bend::{BendLineClassifier, LayerConventions};
use crate::config::AnalysisLimits;
use serde::{Deserialize, Serialize};
use sheetquote_core::entity::Entity;
use sheetquote_core::geometry::Geometry;
use sheetquote_core::math::{BoundingBox2, Point2};
use std::sync::Arc;
use tracing::debug;

/// 孔（由圆一一对应生成），直径恒大于0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub diameter: f64,
    pub x: f64,
    pub y: f64,
}

impl Hole {
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// 折弯线，length 等于起止点欧氏距离
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BendLine {
    pub start: Point2,
    pub end: Point2,
    pub length: f64,
}

impl BendLine {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            length: (end - start).norm(),
        }
    }
}

/// 粗粒度复杂度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// 由离散阈值累积得到的整数分数分级
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 4 => Complexity::Complex,
            s if s >= 2 => Complexity::Moderate,
            _ => Complexity::Simple,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

/// 测量结果置信度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// 没有找到闭合轮廓，下游应回退到人工估算
    Low,
    Medium,
    High,
}

/// 几何分析结果（每份图纸构建一次，之后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DxfAnalysis {
    /// 闭合多段线面积之和（平方英寸）
    pub area: f64,
    /// 所有多段线长度之和（英寸）
    pub perimeter: f64,
    /// 总切割长度（英寸），不含折弯线
    pub cut_length: f64,
    pub holes: Vec<Hole>,
    pub bend_lines: Vec<BendLine>,
    pub bounding_box: BoundingBox2,
    /// 复杂度阈值累积分数
    pub complexity_score: u32,
    pub complexity: Complexity,
    pub warnings: Vec<String>,
    pub confidence: Confidence,
}

impl DxfAnalysis {
    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    pub fn bend_count(&self) -> usize {
        self.bend_lines.len()
    }
}

/// 几何分析器
#[derive(Clone)]
pub struct GeometryAnalyzer {
    classifier: Arc<dyn BendLineClassifier>,
    limits: AnalysisLimits,
}

impl Default for GeometryAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(LayerConventions::default()))
    }
}

impl std::fmt::Debug for GeometryAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryAnalyzer")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// 扫描过程中的累加器
#[derive(Default)]
struct Totals {
    area: f64,
    perimeter: f64,
    cut_length: f64,
    polyline_count: usize,
    closed_count: usize,
    holes: Vec<Hole>,
    bend_lines: Vec<BendLine>,
    bounding_box: BoundingBox2,
    /// 坐标非有限或半径非正而被忽略的实体
    ignored: usize,
}

impl GeometryAnalyzer {
    pub fn new(classifier: Arc<dyn BendLineClassifier>) -> Self {
        Self {
            classifier,
            limits: AnalysisLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: AnalysisLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &AnalysisLimits {
        &self.limits
    }

    pub fn classifier(&self) -> Arc<dyn BendLineClassifier> {
        Arc::clone(&self.classifier)
    }

    /// 分析实体列表
    pub fn analyze(&self, entities: &[Entity]) -> DxfAnalysis {
        let totals = self.measure(entities);

        let complexity_score = self.complexity_score(&totals);
        let complexity = Complexity::from_score(complexity_score);
        let warnings = self.warnings(&totals, !entities.is_empty());

        let confidence = if totals.area == 0.0 || totals.perimeter == 0.0 {
            Confidence::Low
        } else if warnings.len() > 2 || totals.ignored > 0 {
            Confidence::Medium
        } else {
            Confidence::High
        };

        debug!(
            "Analyzed {} entities: area {:.4}, perimeter {:.4}, cut length {:.4}, {} holes, {} bends, {:?} ({:?})",
            entities.len(),
            totals.area,
            totals.perimeter,
            totals.cut_length,
            totals.holes.len(),
            totals.bend_lines.len(),
            complexity,
            confidence
        );

        let bounding_box = if totals.bounding_box.is_empty() {
            BoundingBox2::zero()
        } else {
            totals.bounding_box
        };

        DxfAnalysis {
            area: totals.area,
            perimeter: totals.perimeter,
            cut_length: totals.cut_length,
            holes: totals.holes,
            bend_lines: totals.bend_lines,
            bounding_box,
            complexity_score,
            complexity,
            warnings,
            confidence,
        }
    }

    fn measure(&self, entities: &[Entity]) -> Totals {
        let mut totals = Totals {
            bounding_box: BoundingBox2::empty(),
            ..Default::default()
        };

        for entity in entities {
            if !entity.geometry.is_measurable() {
                totals.ignored += 1;
                continue;
            }
            totals.bounding_box.expand_to_include_box(&entity.bounding_box());

            match &entity.geometry {
                Geometry::Polyline(polyline) => {
                    totals.polyline_count += 1;
                    let closed = polyline.is_closed_within(self.limits.closure_tolerance);
                    let length: f64 = polyline.segments_with(closed).map(|s| s.length()).sum();
                    totals.perimeter += length;
                    totals.cut_length += length;
                    if closed {
                        totals.closed_count += 1;
                        totals.area += polyline.area();
                    }
                }
                Geometry::Circle(circle) => {
                    totals.holes.push(Hole {
                        diameter: circle.diameter(),
                        x: circle.center.x,
                        y: circle.center.y,
                    });
                    totals.cut_length += circle.circumference();
                }
                Geometry::Line(line) => {
                    if self.classifier.is_bend_line(entity) {
                        totals.bend_lines.push(BendLine::new(line.start, line.end));
                    } else {
                        totals.cut_length += line.length();
                    }
                }
                Geometry::Arc(arc) => {
                    totals.cut_length += arc.length();
                }
                Geometry::Spline(spline) => {
                    totals.cut_length += spline.control_polygon_length() * self.limits.spline_length_factor;
                }
            }
        }

        totals
    }

    fn complexity_score(&self, totals: &Totals) -> u32 {
        let mut score = 0;

        let holes = totals.holes.len();
        if holes > 10 {
            score += 2;
        } else if holes > 5 {
            score += 1;
        }

        let bends = totals.bend_lines.len();
        if bends > 4 {
            score += 2;
        } else if bends > 2 {
            score += 1;
        }

        if totals.area > 0.0 {
            let ratio = totals.perimeter / totals.area.sqrt();
            if ratio > 8.0 {
                score += 2;
            } else if ratio > 5.0 {
                score += 1;
            }
        }

        if totals.polyline_count > 5 {
            score += 1;
        }

        score
    }

    fn warnings(&self, totals: &Totals, has_entities: bool) -> Vec<String> {
        let limits = &self.limits;
        let mut warnings = Vec::new();

        if totals.ignored > 0 {
            warnings.push(format!(
                "{} entit{} with non-finite coordinates or non-positive radius ignored",
                totals.ignored,
                if totals.ignored == 1 { "y" } else { "ies" }
            ));
        }

        if totals.closed_count == 0 {
            warnings.push(
                "No closed outline found; part area could not be measured from the drawing"
                    .to_string(),
            );
        }

        let small_holes: Vec<&Hole> = totals
            .holes
            .iter()
            .filter(|h| h.diameter < limits.min_hole_diameter)
            .collect();
        if let Some(smallest) = small_holes
            .iter()
            .map(|h| h.diameter)
            .min_by(|a, b| a.total_cmp(b))
        {
            warnings.push(format!(
                "{} hole(s) below minimum tooling diameter of {:.4} in (smallest {:.4} in)",
                small_holes.len(),
                limits.min_hole_diameter,
                smallest
            ));
        }

        if has_entities {
            let width = totals.bounding_box.width();
            let height = totals.bounding_box.height();
            let (short, long) = if width < height { (width, height) } else { (height, width) };

            if short < limits.min_part_dimension {
                warnings.push(format!(
                    "Part dimension {:.4} in is below the minimum handleable size of {:.4} in",
                    short, limits.min_part_dimension
                ));
            }
            if short > 0.0 && long / short > limits.max_aspect_ratio {
                warnings.push(format!(
                    "Aspect ratio {:.1}:1 exceeds {:.1}:1; part may warp during cutting",
                    long / short,
                    limits.max_aspect_ratio
                ));
            }
        }

        let close_pairs = self.close_hole_pairs(&totals.holes);
        if close_pairs > 0 {
            warnings.push(format!(
                "{} hole pair(s) closer than {:.1}x the sum of their radii",
                close_pairs, limits.hole_spacing_factor
            ));
        }

        warnings
    }

    fn close_hole_pairs(&self, holes: &[Hole]) -> usize {
        let factor = self.limits.hole_spacing_factor;
        let mut count = 0;
        for (i, a) in holes.iter().enumerate() {
            for b in &holes[i + 1..] {
                let distance = (b.center() - a.center()).norm();
                if distance < factor * (a.radius() + b.radius()) {
                    count += 1;
                }
            }
        }
        count
    }
}
