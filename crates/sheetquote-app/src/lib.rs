//! SheetQuote 流水线
//!
//! 把提取、几何分析、切割评分与计价四个阶段串成一次调用：
//!
//! ```no_run
//! use sheetquote_app::{QuotePipeline, OrderParameters};
//! use std::path::Path;
//!
//! let pipeline = QuotePipeline::default();
//! let order = OrderParameters::new("mild_steel", 0.125, 10);
//! let quote = pipeline.quote_file(Path::new("bracket.dxf"), &order)?;
//! println!("{}", quote.pricing.total);
//! # Ok::<(), sheetquote_app::QuoteError>(())
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{QuoteError, Result};
pub use pipeline::{PartAnalysis, PartQuote, QuoteJob, QuotePipeline};

pub use sheetquote_analysis::{BendLineClassifier, LayerConventions};
pub use sheetquote_pricing::{EstimatedPart, OrderParameters, OrderRequest, QuotePricing};
