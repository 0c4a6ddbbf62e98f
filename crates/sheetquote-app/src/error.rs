//! 流水线错误

use sheetquote_file::FileError;
use sheetquote_pricing::PricingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    /// 图纸无法解码或读取
    #[error(transparent)]
    File(#[from] FileError),

    /// 订单参数或估算值校验失败
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// 文档超出调用方设定的大小上限，未进入提取
    #[error("Document is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
