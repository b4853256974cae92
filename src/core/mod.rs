pub mod http;
pub mod people;
pub mod pubmed;
pub mod run_data;
pub mod scholarly;
pub mod token;

pub use crate::domain::model::{Config, PmidTarget};
pub use crate::domain::ports::ConfigSource;
pub use crate::utils::error::Result;
