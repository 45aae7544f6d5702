pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod membership;
pub mod progress;
pub mod report;
pub mod stats;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::engine::{ClassificationMap, Classifier, classify};
    pub use crate::error::CompareError;
    pub use crate::membership::{Comparison, Membership, Side};
    pub use crate::stats::Stats;
}
