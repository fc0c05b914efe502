//! RFP 领域类型：风险等级、处理状态、RFP 记录

pub mod types;

pub use types::{Rfp, RfpStatus, RiskLevel};
