//! 流水线配置
//!
//! 一个 JSON 文件覆盖全部阶段，缺省部分取默认值：
//!
//! ```json
//! {
//!   "layers": { "layer_keywords": ["bend", "abkant"], "fold_colors": [3, 5] },
//!   "pricing": { "margin": 1.25 }
//! }
//! ```

use crate::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use sheetquote_analysis::{AnalysisLimits, LayerConventions, SegmentRates};
use sheetquote_pricing::PricingConfig;
use std::path::Path;

/// 默认文档大小上限：64 MiB
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub limits: AnalysisLimits,
    pub layers: LayerConventions,
    pub rates: SegmentRates,
    pub pricing: PricingConfig,
    /// 超过该字节数的文档直接拒绝
    pub max_document_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limits: AnalysisLimits::default(),
            layers: LayerConventions::default(),
            rates: SegmentRates::default(),
            pricing: PricingConfig::default(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_str(text).map_err(|e| QuoteError::Config(e.to_string()))?;
        config.pricing.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| QuoteError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = PipelineConfig::from_json(
            r#"{"layers": {"layer_keywords": ["abkant"], "fold_colors": [6, 6]}, "pricing": {"margin": 1.25}}"#,
        )
        .unwrap();
        assert_eq!(config.layers.layer_keywords, vec!["abkant".to_string()]);
        assert_eq!(config.pricing.margin, 1.25);
        assert_eq!(config.rates, SegmentRates::default());
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            PipelineConfig::from_json("[1, 2]"),
            Err(QuoteError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{"pricing": {"margin": 0.0}}"#),
            Err(QuoteError::Pricing(_))
        ));
    }
}
