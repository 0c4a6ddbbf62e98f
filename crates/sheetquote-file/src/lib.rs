//! SheetQuote 图纸提取
//!
//! 把 DXF 文档（字节、文件路径或已解码的 `dxf::Drawing`）转换为
//! 扁平的几何实体列表和累积包围盒。只做原始几何转换，不做任何解释。

pub mod document;
pub mod dxf_io;
pub mod error;

pub use document::ExtractedDrawing;
pub use dxf_io::{extract_bytes, extract_drawing, extract_file};
pub use error::FileError;
