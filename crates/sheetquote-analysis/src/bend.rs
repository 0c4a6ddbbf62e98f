//! 折弯线识别策略
//!
//! 判断一条线段是折弯标注还是切割轮廓，完全依赖绘图习惯（图层名、颜色），
//! 因此做成可替换的策略，由集成方按车间规范提供。

use serde::{Deserialize, Serialize};
use sheetquote_core::entity::Entity;
use sheetquote_core::geometry::Geometry;

/// 折弯线识别策略
///
/// 只对线段实体调用；返回 true 表示该线段是折弯线，不计入切割长度。
pub trait BendLineClassifier: Send + Sync {
    fn is_bend_line(&self, entity: &Entity) -> bool;
}

impl<F> BendLineClassifier for F
where
    F: Fn(&Entity) -> bool + Send + Sync,
{
    fn is_bend_line(&self, entity: &Entity) -> bool {
        self(entity)
    }
}

/// 默认策略：图层名关键字或保留颜色索引
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConventions {
    /// 图层名包含任一关键字（不区分大小写）即为折弯线
    pub layer_keywords: Vec<String>,

    /// 约定用于折弯标注的颜色索引
    pub fold_colors: [u8; 2],
}

impl Default for LayerConventions {
    fn default() -> Self {
        Self {
            layer_keywords: vec!["bend".into(), "fold".into(), "crease".into()],
            fold_colors: [3, 5],
        }
    }
}

impl LayerConventions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换图层关键字
    pub fn with_layer_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// 替换保留颜色
    pub fn with_fold_colors(mut self, colors: [u8; 2]) -> Self {
        self.fold_colors = colors;
        self
    }

    fn layer_matches(&self, layer: &str) -> bool {
        let layer = layer.to_lowercase();
        self.layer_keywords
            .iter()
            .any(|keyword| layer.contains(&keyword.to_lowercase()))
    }
}

impl BendLineClassifier for LayerConventions {
    fn is_bend_line(&self, entity: &Entity) -> bool {
        if !matches!(entity.geometry, Geometry::Line(_)) {
            return false;
        }
        let by_layer = entity
            .layer
            .as_deref()
            .is_some_and(|layer| self.layer_matches(layer));
        let by_color = entity
            .color_index
            .is_some_and(|color| self.fold_colors.contains(&color));
        by_layer || by_color
    }
}
