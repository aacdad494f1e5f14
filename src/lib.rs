//! Per-build test result matrix for a job: aggregation, build selection, a
//! staleness-aware JSON cache and CSV export.

pub mod aggregate;
pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod selector;
pub mod source;
pub mod util;

pub use analyzer::{Analyzer, CacheStatus};
pub use cache::Cache;
pub use config::{GlobalConfig, UserConfig};
pub use error::CacheError;
pub use source::{BuildSource, JobDirectory};
