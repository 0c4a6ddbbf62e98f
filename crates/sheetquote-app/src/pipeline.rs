//! 报价流水线：提取 → 几何分析 → 切割评分 → 计价
//!
//! 每个阶段都是纯函数，流水线本身只持有只读配置，
//! 因此同一个 [`QuotePipeline`] 可被多个线程同时调用。

use crate::config::PipelineConfig;
use crate::error::{QuoteError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sheetquote_analysis::{
    BendLineClassifier, ComplexityAnalysis, CuttingComplexityScorer, DxfAnalysis,
    GeometryAnalyzer,
};
use sheetquote_core::entity::Entity;
use sheetquote_core::units::Unit;
use sheetquote_file::ExtractedDrawing;
use sheetquote_pricing::{CostEngine, EstimatedPart, OrderParameters, QuotePricing};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 单个零件的分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartAnalysis {
    pub analysis: DxfAnalysis,
    pub cutting: ComplexityAnalysis,
    pub entity_count: usize,
    pub skipped_entities: usize,
    pub source_units: Unit,
}

/// 单个零件的报价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartQuote {
    #[serde(flatten)]
    pub part: PartAnalysis,
    pub pricing: QuotePricing,
}

/// 批量报价中的一项
#[derive(Debug, Clone)]
pub struct QuoteJob {
    /// 用于日志与结果对应的名称（通常是文件名）
    pub name: String,
    pub bytes: Vec<u8>,
    pub order: OrderParameters,
}

/// 报价流水线
#[derive(Clone)]
pub struct QuotePipeline {
    analyzer: GeometryAnalyzer,
    scorer: CuttingComplexityScorer,
    engine: CostEngine,
    max_document_bytes: usize,
}

impl Default for QuotePipeline {
    fn default() -> Self {
        Self::from_config(PipelineConfig::default())
    }
}

impl QuotePipeline {
    /// 按配置构建，折弯线识别使用配置中的图层约定
    pub fn from_config(config: PipelineConfig) -> Self {
        let classifier: Arc<dyn BendLineClassifier> = Arc::new(config.layers.clone());
        Self::with_classifier(config, classifier)
    }

    /// 使用自定义折弯线识别策略；分析与评分两个阶段共享同一个策略
    pub fn with_classifier(config: PipelineConfig, classifier: Arc<dyn BendLineClassifier>) -> Self {
        let scorer = CuttingComplexityScorer::new(Arc::clone(&classifier))
            .with_rates(config.rates)
            .with_limits(&config.limits);
        Self {
            analyzer: GeometryAnalyzer::new(classifier).with_limits(config.limits),
            scorer,
            engine: CostEngine::new(config.pricing),
            max_document_bytes: config.max_document_bytes,
        }
    }

    pub fn engine(&self) -> &CostEngine {
        &self.engine
    }

    /// 分析已提取的实体
    pub fn analyze_drawing(&self, drawing: &ExtractedDrawing) -> PartAnalysis {
        let (analysis, cutting) = self.analyze_entities(&drawing.entities);
        PartAnalysis {
            analysis,
            cutting,
            entity_count: drawing.entity_count(),
            skipped_entities: drawing.skipped,
            source_units: drawing.source_units,
        }
    }

    pub fn analyze_entities(&self, entities: &[Entity]) -> (DxfAnalysis, ComplexityAnalysis) {
        let analysis = self.analyzer.analyze(entities);
        let cutting = self.scorer.score(entities, &analysis.bounding_box);
        debug!(
            area = analysis.area,
            cut_length = analysis.cut_length,
            score = cutting.complexity_score,
            "part analyzed"
        );
        (analysis, cutting)
    }

    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<PartAnalysis> {
        self.check_size(bytes.len())?;
        let drawing = sheetquote_file::extract_bytes(bytes)?;
        Ok(self.analyze_drawing(&drawing))
    }

    pub fn analyze_file(&self, path: &Path) -> Result<PartAnalysis> {
        let bytes = read_document(path)?;
        self.analyze_bytes(&bytes)
    }

    /// 按图纸报价
    pub fn quote_bytes(&self, bytes: &[u8], order: &OrderParameters) -> Result<PartQuote> {
        // 先校验订单，避免为无效订单做整套几何分析
        order.validate()?;
        self.engine.config().materials.get(&order.material)?;

        let part = self.analyze_bytes(bytes)?;
        let pricing = self
            .engine
            .price_measured(&part.analysis, &part.cutting, order)?;
        Ok(PartQuote { part, pricing })
    }

    pub fn quote_file(&self, path: &Path, order: &OrderParameters) -> Result<PartQuote> {
        let bytes = read_document(path)?;
        self.quote_bytes(&bytes, order)
    }

    /// 无图纸报价
    pub fn quote_estimated(&self, part: &EstimatedPart, order: &OrderParameters) -> Result<QuotePricing> {
        Ok(self.engine.price_estimated(part, order)?)
    }

    /// 并行批量报价，结果顺序与输入一致
    pub fn quote_batch(&self, jobs: &[QuoteJob]) -> Vec<Result<PartQuote>> {
        info!(jobs = jobs.len(), "pricing batch");
        jobs.par_iter()
            .map(|job| {
                let result = self.quote_bytes(&job.bytes, &job.order);
                if let Err(e) = &result {
                    debug!(name = %job.name, error = %e, "batch item failed");
                }
                result
            })
            .collect()
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_bytes {
            return Err(QuoteError::TooLarge {
                size,
                limit: self.max_document_bytes,
            });
        }
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| QuoteError::File(e.into()))
}
