//! 金额序列化
//!
//! 内部用 f64 计算，对外输出两位小数的定点字符串，避免浮点显示漂移。

use serde::{Deserialize, Deserializer, Serializer};

/// 格式化为两位小数
pub fn format(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn serialize<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(*amount))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.trim()
        .parse::<f64>()
        .map_err(|e| serde::de::Error::custom(format!("invalid amount {text:?}: {e}")))
}
