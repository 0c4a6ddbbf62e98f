//! 订单参数
//!
//! [`OrderRequest`] 是调用方提交的原始扁平记录（枚举字段为字符串），
//! 经 `TryFrom` 校验后得到强类型的 [`OrderParameters`]。

use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 枚举字段的统一解析：忽略大小写，`-`、空格与 `_` 等价
fn parse_token(value: &str) -> String {
    value.trim().to_lowercase().replace(['-', ' '], "_")
}

macro_rules! order_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $token:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl FromStr for $name {
            type Err = PricingError;

            fn from_str(value: &str) -> Result<Self> {
                match parse_token(value).as_str() {
                    $($token $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(PricingError::validation(
                        $field,
                        format!("unrecognized value {value:?}"),
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

order_enum! {
    /// 表面处理
    FinishType, "finishType" {
        None => "none",
        PowderCoat => "powder_coat" | "powdercoat",
        Anodize => "anodize" | "anodized",
        Galvanize => "galvanize" | "galvanized",
        Paint => "paint" | "painted",
    }
}

order_enum! {
    /// 公差等级
    ToleranceLevel, "toleranceLevel" {
        Standard => "standard",
        Precision => "precision",
        Tight => "tight",
    }
}

order_enum! {
    /// 交期
    Urgency, "urgency" {
        Standard => "standard",
        Rush => "rush",
        Emergency => "emergency",
    }
}

order_enum! {
    /// 无图纸时调用方声明的折弯复杂度
    BendComplexity, "bendComplexity" {
        None => "none",
        Simple => "simple",
        Moderate => "moderate",
        Complex => "complex",
    }
}

/// 调用方提交的原始订单记录
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub material: String,
    pub thickness: f64,
    pub quantity: i64,
    #[serde(default)]
    pub finish_type: Option<String>,
    #[serde(default)]
    pub tolerance_level: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// 校验后的订单参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParameters {
    /// 材料标识，由 [`crate::MaterialCatalog`] 解析
    pub material: String,
    /// 板厚（英寸）
    pub thickness: f64,
    pub quantity: u32,
    pub finish_type: FinishType,
    pub tolerance_level: ToleranceLevel,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderParameters {
    pub fn new(material: impl Into<String>, thickness: f64, quantity: u32) -> Self {
        Self {
            material: material.into(),
            thickness,
            quantity,
            finish_type: FinishType::None,
            tolerance_level: ToleranceLevel::Standard,
            urgency: Urgency::Standard,
            notes: None,
        }
    }

    pub fn with_finish(mut self, finish: FinishType) -> Self {
        self.finish_type = finish;
        self
    }

    pub fn with_tolerance(mut self, tolerance: ToleranceLevel) -> Self {
        self.tolerance_level = tolerance;
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 数值字段校验（材料是否存在由引擎查表判断）
    pub fn validate(&self) -> Result<()> {
        if self.material.trim().is_empty() {
            return Err(PricingError::validation("material", "must not be empty"));
        }
        if !(self.thickness.is_finite() && self.thickness > 0.0) {
            return Err(PricingError::validation(
                "thickness",
                format!("must be a positive number, got {}", self.thickness),
            ));
        }
        if self.quantity == 0 {
            return Err(PricingError::validation("quantity", "must be at least 1"));
        }
        Ok(())
    }
}

fn parse_optional<T>(value: Option<&str>) -> Result<T>
where
    T: FromStr<Err = PricingError> + Default,
{
    match value {
        Some(v) if !v.trim().is_empty() => v.parse(),
        _ => Ok(T::default()),
    }
}

impl TryFrom<OrderRequest> for OrderParameters {
    type Error = PricingError;

    fn try_from(request: OrderRequest) -> Result<Self> {
        if request.quantity <= 0 {
            return Err(PricingError::validation(
                "quantity",
                format!("must be a positive integer, got {}", request.quantity),
            ));
        }
        let quantity = u32::try_from(request.quantity).map_err(|_| {
            PricingError::validation("quantity", format!("{} is too large", request.quantity))
        })?;

        let params = OrderParameters {
            material: request.material.trim().to_string(),
            thickness: request.thickness,
            quantity,
            finish_type: parse_optional(request.finish_type.as_deref())?,
            tolerance_level: parse_optional(request.tolerance_level.as_deref())?,
            urgency: parse_optional(request.urgency.as_deref())?,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };
        params.validate()?;
        Ok(params)
    }
}
