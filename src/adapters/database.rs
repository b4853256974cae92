//! Database connections described by configuration documents.
//!
//! The drivers are optional: build with the `mysql`, `postgres` and/or `mongo`
//! features to enable them. Asking for a driver that was not compiled in is an
//! error rather than a silent no-op.

use crate::domain::model::Config;
use crate::utils::error::{JrcError, Result};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_MONGO_PORT: u16 = 27017;
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Mongo,
    MySql,
    Postgres,
}

impl std::str::FromStr for DatabaseKind {
    type Err = JrcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mongo" => Ok(Self::Mongo),
            "mysql" => Ok(Self::MySql),
            "pg" => Ok(Self::Postgres),
            other => Err(JrcError::UnsupportedDatabase {
                kind: other.to_string(),
            }),
        }
    }
}

/// Connection details as stored in the configuration service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub host: Option<String>,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database name (relational drivers).
    pub name: Option<String>,
    /// Database name (Mongo).
    pub client: Option<String>,
    pub uri: Option<String>,
    pub replicaset: Option<String>,
    pub authsource: Option<String>,
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Number(port)) => Ok(Some(port)),
        Some(Port::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Port::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {}", text))),
    }
}

impl DatabaseSpec {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.deserialize()
    }

    pub fn kind(&self) -> Result<DatabaseKind> {
        self.kind.parse()
    }

    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    #[cfg_attr(not(any(feature = "mongo", feature = "mysql", feature = "postgres")), allow(dead_code))]
    fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| JrcError::MissingConfigError {
                field: field.to_string(),
            })
    }

    #[cfg_attr(not(any(feature = "mongo", feature = "mysql", feature = "postgres")), allow(dead_code))]
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    #[cfg(feature = "mongo")]
    Mongo(mongodb::Database),
    #[cfg(feature = "mysql")]
    MySql(sqlx::MySqlPool),
    #[cfg(feature = "postgres")]
    Postgres(sqlx::PgPool),
}

pub async fn connect_database(spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    let kind = spec.kind()?;
    tracing::debug!("Connecting to {:?} database on {:?}", kind, spec.host);
    match kind {
        DatabaseKind::Mongo => connect_mongo(spec).await,
        DatabaseKind::MySql => connect_mysql(spec).await,
        DatabaseKind::Postgres => connect_postgres(spec).await,
    }
}

#[cfg(feature = "mongo")]
pub fn mongo_options(spec: &DatabaseSpec) -> Result<mongodb::options::ClientOptions> {
    use mongodb::options::{ClientOptions, Credential, ServerAddress};

    let host = DatabaseSpec::required(&spec.host, "host")?;
    let address = ServerAddress::parse(format!("{}:{}", host, spec.port_or(DEFAULT_MONGO_PORT)))?;

    let mut options = ClientOptions::default();
    options.hosts = vec![address];
    options.repl_set_name = DatabaseSpec::non_empty(&spec.replicaset).map(str::to_string);

    if let Some(password) = DatabaseSpec::non_empty(&spec.password) {
        let mut credential = Credential::default();
        credential.username = spec.user.clone();
        credential.password = Some(password.to_string());
        credential.source = DatabaseSpec::non_empty(&spec.authsource).map(str::to_string);
        options.credential = Some(credential);
    }
    Ok(options)
}

#[cfg(feature = "mongo")]
async fn connect_mongo(spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    use mongodb::options::ClientOptions;

    let database = DatabaseSpec::required(&spec.client, "client")?;
    let options = match DatabaseSpec::non_empty(&spec.uri) {
        Some(uri) => ClientOptions::parse(uri).await?,
        None => mongo_options(spec)?,
    };
    let client = mongodb::Client::with_options(options)?;
    Ok(DatabaseConnection::Mongo(client.database(database)))
}

#[cfg(not(feature = "mongo"))]
async fn connect_mongo(_spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    Err(JrcError::DriverNotEnabled {
        kind: "mongo".to_string(),
        feature: "mongo".to_string(),
    })
}

#[cfg(feature = "mysql")]
pub fn mysql_options(spec: &DatabaseSpec) -> Result<sqlx::mysql::MySqlConnectOptions> {
    let mut options = sqlx::mysql::MySqlConnectOptions::new()
        .host(DatabaseSpec::required(&spec.host, "host")?)
        .port(spec.port_or(DEFAULT_MYSQL_PORT))
        .username(DatabaseSpec::required(&spec.user, "user")?)
        .database(DatabaseSpec::required(&spec.name, "name")?);
    if let Some(password) = DatabaseSpec::non_empty(&spec.password) {
        options = options.password(password);
    }
    Ok(options)
}

#[cfg(feature = "mysql")]
async fn connect_mysql(spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .connect_with(mysql_options(spec)?)
        .await?;
    Ok(DatabaseConnection::MySql(pool))
}

#[cfg(not(feature = "mysql"))]
async fn connect_mysql(_spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    Err(JrcError::DriverNotEnabled {
        kind: "mysql".to_string(),
        feature: "mysql".to_string(),
    })
}

#[cfg(feature = "postgres")]
pub fn postgres_options(spec: &DatabaseSpec) -> Result<sqlx::postgres::PgConnectOptions> {
    let mut options = sqlx::postgres::PgConnectOptions::new()
        .host(DatabaseSpec::required(&spec.host, "host")?)
        .username(DatabaseSpec::required(&spec.user, "user")?)
        .database(DatabaseSpec::required(&spec.name, "name")?);
    if let Some(port) = spec.port {
        options = options.port(port);
    }
    if let Some(password) = DatabaseSpec::non_empty(&spec.password) {
        options = options.password(password);
    }
    Ok(options)
}

#[cfg(feature = "postgres")]
async fn connect_postgres(spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_with(postgres_options(spec)?)
        .await?;
    Ok(DatabaseConnection::Postgres(pool))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_spec: &DatabaseSpec) -> Result<DatabaseConnection> {
    Err(JrcError::DriverNotEnabled {
        kind: "pg".to_string(),
        feature: "postgres".to_string(),
    })
}

/// One-line description of a SQL error, with the server's error code when there is one.
#[cfg(any(feature = "mysql", feature = "postgres"))]
pub fn sql_error(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("SQL error [{}]: {}", code, db_err.message()),
            None => format!("SQL error {}", db_err.message()),
        },
        other => format!("SQL error {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> DatabaseSpec {
        DatabaseSpec::from_config(&Config::new(value)).unwrap()
    }

    #[test]
    fn parses_config_documents() {
        let spec = spec(json!({
            "type": "mysql",
            "host": "mysql.example.org",
            "port": "3307",
            "user": "app",
            "password": "pw",
            "name": "flyboy"
        }));
        assert_eq!(spec.kind().unwrap(), DatabaseKind::MySql);
        assert_eq!(spec.port_or(DEFAULT_MYSQL_PORT), 3307);
        assert_eq!(spec.name.as_deref(), Some("flyboy"));
    }

    #[test]
    fn numeric_and_missing_ports() {
        assert_eq!(spec(json!({"type": "mongo", "port": 27018})).port, Some(27018));
        assert_eq!(spec(json!({"type": "mongo", "port": ""})).port, None);
        assert_eq!(spec(json!({"type": "mongo"})).port_or(DEFAULT_MONGO_PORT), 27017);
        assert!(DatabaseSpec::from_config(&Config::new(json!({"port": "abc"}))).is_err());
    }

    #[tokio::test]
    async fn unknown_type_is_unsupported() {
        let err = connect_database(&spec(json!({"type": "oracle"}))).await.unwrap_err();
        assert!(matches!(err, JrcError::UnsupportedDatabase { ref kind } if kind == "oracle"));
    }

    #[cfg(not(feature = "mongo"))]
    #[tokio::test]
    async fn disabled_driver_is_reported() {
        let err = connect_database(&spec(json!({"type": "mongo", "host": "h", "client": "db"})))
            .await
            .unwrap_err();
        assert!(matches!(err, JrcError::DriverNotEnabled { ref feature, .. } if feature == "mongo"));
    }

    #[cfg(feature = "mongo")]
    #[test]
    fn mongo_credentials_only_with_password() {
        let with_password = mongo_options(&spec(json!({
            "type": "mongo",
            "host": "mongo.example.org",
            "user": "reader",
            "password": "pw",
            "authsource": "admin",
            "replicaset": "rs0",
            "client": "dis"
        })))
        .unwrap();
        assert_eq!(with_password.hosts[0].to_string(), "mongo.example.org:27017");
        assert_eq!(with_password.repl_set_name.as_deref(), Some("rs0"));
        let credential = with_password.credential.unwrap();
        assert_eq!(credential.username.as_deref(), Some("reader"));
        assert_eq!(credential.source.as_deref(), Some("admin"));

        let anonymous = mongo_options(&spec(json!({"type": "mongo", "host": "h", "port": 1234})))
            .unwrap();
        assert!(anonymous.credential.is_none());
        assert_eq!(anonymous.hosts[0].to_string(), "h:1234");
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_options_from_spec() {
        let options = postgres_options(&spec(json!({
            "type": "pg",
            "host": "pg.example.org",
            "user": "app",
            "name": "reports"
        })))
        .unwrap();
        assert_eq!(options.get_host(), "pg.example.org");
        assert_eq!(options.get_database(), Some("reports"));
    }

    #[cfg(any(feature = "mysql", feature = "postgres"))]
    #[test]
    fn sql_error_without_code() {
        assert!(sql_error(&sqlx::Error::RowNotFound).starts_with("SQL error "));
    }
}
