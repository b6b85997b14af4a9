pub mod answers;
pub mod error;
pub mod loader;
pub mod models;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod session;

pub use error::{DashboardError, DashboardResult};
pub use loader::{DataCache, Datasets};
pub use models::{AssessmentResponse, AssessmentResult};
