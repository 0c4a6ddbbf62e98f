//! SheetQuote 报价引擎
//!
//! 由几何测量（或调用方估算值）与订单参数生成逐项报价 [`QuotePricing`]：
//! 材料、切割、穿孔、折弯、表面处理、加急费，最后乘以固定利润系数。
//!
//! 所有费率集中在 [`PricingConfig`]，可从 JSON 加载。

pub mod config;
pub mod engine;
pub mod error;
pub mod material;
pub mod money;
pub mod order;
pub mod quote;

pub use config::PricingConfig;
pub use engine::CostEngine;
pub use error::{PricingError, Result};
pub use material::{Material, MaterialCatalog};
pub use order::{BendComplexity, FinishType, OrderParameters, OrderRequest, ToleranceLevel, Urgency};
pub use quote::{
    EstimatedPart, HoleDistribution, MeasurementSource, PartMeasurements, QuoteDetails,
    QuotePricing,
};
