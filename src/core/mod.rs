//! 核心类型：生成调用的错误

pub mod error;

pub use error::GenerationError;
