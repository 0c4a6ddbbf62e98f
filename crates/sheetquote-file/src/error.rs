//! 提取错误定义

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    /// 输入不是格式正确的 DXF 文档，携带解析器原始消息
    #[error("DXF decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
