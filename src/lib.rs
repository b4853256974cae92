pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::database::{connect_database, DatabaseConnection, DatabaseSpec};
pub use adapters::email::{send_email, Email};
pub use adapters::memory::InMemoryConfigSource;
pub use config::{ClientSettings, ConfigClient, Credentials, Endpoints};
pub use core::run_data::{get_run_data, get_user_name};
pub use core::scholarly::ScholarlyClient;
pub use core::token::{check_token, TokenError};
pub use domain::model::{Config, PmidTarget};
pub use domain::ports::ConfigSource;
pub use utils::error::{JrcError, Result};
pub use utils::text::convert_diacritics;
