//! SheetQuote 核心几何类型
//!
//! 钣金报价流水线共用的2D几何图元。
//!
//! # 架构设计
//!
//! - `Geometry`: 封闭的几何和类型（线段、圆、圆弧、多段线、样条）
//! - `Entity`: 几何 + 图层名 + 颜色索引（仅用于折弯线识别）
//! - `BoundingBox2`: 随实体扫描单调扩展的包围盒
//!
//! # 示例
//!
//! ```rust
//! use sheetquote_core::prelude::*;
//!
//! let line = Line::new(Point2::origin(), Point2::new(3.0, 4.0));
//! assert!((line.length() - 5.0).abs() < 1e-12);
//! ```

pub mod entity;
pub mod geometry;
pub mod math;
pub mod units;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::entity::Entity;
    pub use crate::geometry::{Arc, Circle, Geometry, Line, Polyline, PolylineVertex, Spline};
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::units::Unit;
}
