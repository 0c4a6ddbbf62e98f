//! 提取结果数据模型

use serde::{Deserialize, Serialize};
use sheetquote_core::entity::Entity;
use sheetquote_core::math::BoundingBox2;
use sheetquote_core::units::Unit;

/// 一次提取的结果：实体列表 + 累积包围盒
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDrawing {
    /// 所有支持的实体（已换算到英寸）
    pub entities: Vec<Entity>,

    /// 所有实体的包围盒；没有实体时为原点处的零包围盒
    pub bounding_box: BoundingBox2,

    /// 图纸声明的单位
    pub source_units: Unit,

    /// 因坐标非有限或几何退化而跳过的实体数
    pub skipped: usize,
}

impl ExtractedDrawing {
    /// 由实体列表构建，包围盒随实体逐个扩展
    pub fn from_entities(entities: Vec<Entity>, source_units: Unit, skipped: usize) -> Self {
        let mut bounding_box = BoundingBox2::empty();
        for entity in &entities {
            bounding_box.expand_to_include_box(&entity.bounding_box());
        }
        if bounding_box.is_empty() {
            bounding_box = BoundingBox2::zero();
        }
        Self {
            entities,
            bounding_box,
            source_units,
            skipped,
        }
    }

    /// 实体数量
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
