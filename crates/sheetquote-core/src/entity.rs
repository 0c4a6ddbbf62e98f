//! 图纸实体
//!
//! 一个实体 = 几何数据 + 图层名 + 颜色索引。
//! 图层和颜色只用于折弯线的启发式识别，不参与几何计算。

use crate::geometry::Geometry;
use crate::math::BoundingBox2;
use serde::{Deserialize, Serialize};

/// 提取后的CAD实体（提取后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// 几何类型和数据
    pub geometry: Geometry,

    /// 所属图层名
    pub layer: Option<String>,

    /// AutoCAD颜色索引（ACI，1-255）；ByLayer 已在提取时解析
    pub color_index: Option<u8>,
}

impl Entity {
    /// 创建新实体
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            layer: None,
            color_index: None,
        }
    }

    /// 获取包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        self.geometry.bounding_box()
    }

    /// 使用指定的图层
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// 使用指定的颜色索引
    pub fn with_color_index(mut self, index: u8) -> Self {
        self.color_index = Some(index);
        self
    }
}

impl From<Geometry> for Entity {
    fn from(geometry: Geometry) -> Self {
        Self::new(geometry)
    }
}
