pub mod dataset;
pub mod error;
pub mod frequency;
pub mod patterns;
pub mod recommend;
pub mod timeline;

pub use dataset::{DatasetOverview, DrawHistory};
pub use error::{AnalysisError, Result};
