use crate::domain::ports::ConfigSource;
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::path::Path;

const USER_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// Login name of the user running the program.
pub fn current_user() -> Option<String> {
    USER_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.is_empty())
}

/// Display name for `user` from the `workday` configuration, falling back to
/// the login name itself.
pub async fn display_name_for(source: &dyn ConfigSource, user: &str) -> Result<String> {
    let workday = source.get_config("workday").await?;
    let record = workday.get(user);
    let part = |key: &str| record.and_then(|r| r.get(key)).and_then(Value::as_str);

    Ok(match (part("first"), part("last")) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        _ => user.to_string(),
    })
}

pub async fn get_user_name(source: &dyn ConfigSource) -> Result<Option<String>> {
    match current_user() {
        Some(user) => Ok(Some(display_name_for(source, &user).await?)),
        None => Ok(None),
    }
}

/// `"<program> (version <v>) run by <name> at <timestamp>\n"`
pub fn run_data_message(
    program: &str,
    version: &str,
    user_name: Option<&str>,
    at: DateTime<Local>,
) -> String {
    let program = Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string());
    let timestamp = at.format("%Y-%m-%d %H:%M:%S%.6f");

    match user_name {
        Some(name) => format!("{} (version {}) run by {} at {}\n", program, version, name, timestamp),
        None => format!("{} (version {}) run at {}\n", program, version, timestamp),
    }
}

pub async fn get_run_data(source: &dyn ConfigSource, program: &str, version: &str) -> Result<String> {
    let user_name = get_user_name(source).await?;
    Ok(run_data_message(program, version, user_name.as_deref(), Local::now()))
}
