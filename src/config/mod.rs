#[cfg(feature = "cli")]
pub mod cli;
pub mod remote;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use remote::{ConfigClient, CONFIG_SERVER_URL};
pub use settings::{ClientSettings, Credentials, Endpoints};
