//! 材料表
//!
//! 未知材料一律报错，不会静默替换为默认价格。

use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};

/// 板材材料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 订单中引用的标识，如 `mild_steel`
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 密度（磅/立方英寸）
    pub density: f64,
    /// 单价（美元/磅）
    pub price_per_pound: f64,
    /// 不锈钢系材料切割费率上浮
    #[serde(default)]
    pub stainless: bool,
}

impl Material {
    pub fn new(id: &str, name: &str, density: f64, price_per_pound: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            density,
            price_per_pound,
            stainless: false,
        }
    }

    pub fn stainless(mut self) -> Self {
        self.stainless = true;
        self
    }
}

/// 材料表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialCatalog {
    materials: Vec<Material>,
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::new(vec![
            Material::new("mild_steel", "Mild Steel (A36)", 0.2836, 0.85),
            Material::new("galvanized_steel", "Galvanized Steel", 0.2836, 1.05),
            Material::new("stainless_304", "Stainless Steel 304", 0.289, 2.50).stainless(),
            Material::new("stainless_316", "Stainless Steel 316", 0.289, 3.20).stainless(),
            Material::new("aluminum_5052", "Aluminum 5052", 0.097, 2.75),
            Material::new("aluminum_6061", "Aluminum 6061", 0.0975, 3.00),
            Material::new("copper", "Copper C110", 0.323, 5.50),
            Material::new("brass", "Brass C260", 0.307, 4.20),
        ])
    }
}

impl MaterialCatalog {
    pub fn new(materials: Vec<Material>) -> Self {
        Self { materials }
    }

    /// 按标识查找（不区分大小写，`-` 与 `_` 等价）
    pub fn get(&self, id: &str) -> Result<&Material> {
        let key = normalize(id);
        self.materials
            .iter()
            .find(|m| normalize(&m.id) == key)
            .ok_or_else(|| PricingError::validation("material", format!("unknown material {id:?}")))
    }

    /// 添加或替换材料
    pub fn insert(&mut self, material: Material) {
        match self.materials.iter_mut().find(|m| m.id == material.id) {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// 校验表中数值（密度、单价为正且有限）
    pub fn validate(&self) -> Result<()> {
        for m in &self.materials {
            if !(m.density.is_finite() && m.density > 0.0) {
                return Err(PricingError::validation(
                    "material.density",
                    format!("{} has non-positive density", m.id),
                ));
            }
            if !(m.price_per_pound.is_finite() && m.price_per_pound >= 0.0) {
                return Err(PricingError::validation(
                    "material.price_per_pound",
                    format!("{} has invalid price", m.id),
                ));
            }
        }
        Ok(())
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_lowercase().replace('-', "_")
}
