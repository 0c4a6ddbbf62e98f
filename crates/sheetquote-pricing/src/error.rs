//! 报价错误定义

use thiserror::Error;

/// 报价操作的结果类型
pub type Result<T> = std::result::Result<T, PricingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// 输入校验失败，`field` 为出错的输入字段名
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl PricingError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 出错字段名
    pub fn field(&self) -> &str {
        match self {
            PricingError::Validation { field, .. } => field,
        }
    }
}
