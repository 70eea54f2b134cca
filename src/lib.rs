pub mod builders;
pub mod compiler;
pub mod config;
pub mod correlation;
pub mod error;
pub mod expr;
pub mod facet;
pub mod grammar;
pub mod handlers;
pub mod params;
pub mod projection;
pub mod region;
pub mod resolver;
pub mod types;

pub use compiler::{QueryCompiler, RowLimits};
pub use config::Config;
pub use error::{Error, Result};
pub use params::FilterKey;
pub use types::{FilterRequest, QueryOptions, SearchQuery};
