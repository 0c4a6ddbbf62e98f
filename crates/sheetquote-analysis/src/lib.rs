//! SheetQuote 几何分析
//!
//! 两个相互独立的纯函数阶段：
//! - [`GeometryAnalyzer`]: 实体列表 → [`DxfAnalysis`]（面积、周长、切割长度、孔、折弯线、
//!   粗粒度复杂度、可制造性警告、置信度）
//! - [`CuttingComplexityScorer`]: 可切割实体 → [`ComplexityAnalysis`]（分段、0-100评分、
//!   分段加权切割成本、建议）
//!
//! 折弯线识别通过 [`BendLineClassifier`] 策略注入，两个阶段共用同一个策略。

pub mod analyzer;
pub mod bend;
pub mod complexity;
pub mod config;

pub use analyzer::{BendLine, Complexity, Confidence, DxfAnalysis, GeometryAnalyzer, Hole};
pub use bend::{BendLineClassifier, LayerConventions};
pub use complexity::{
    ComplexityAnalysis, CuttingComplexityScorer, CuttingSegment, Impact, Recommendation,
    RecommendationKind, SegmentKind,
};
pub use config::{AnalysisLimits, SegmentRates};
