use std::path::Path;
use std::str::FromStr;

use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use sqlx::postgres::PgConnectOptions;

/// Environment variables read on top of the defaults and the optional settings file.
const ENV_OVERRIDES: [(&str, &str); 7] = [
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("APP_HOST", "application.host"),
    ("APP_PORT", "application.port"),
];

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> SecretString {
        SecretString::from(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.name
        ))
    }

    /// Parses `connection_string()`, so the server connects with exactly that URL.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        PgConnectOptions::from_str(self.connection_string().expose_secret())
    }
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads settings from the process environment (and `.env`), optionally layered over a file.
pub fn get_configuration(file: Option<&Path>) -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    load_settings(file, |key| dotenv::var(key).ok())
}

pub fn load_settings<F>(file: Option<&Path>, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder()
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.user", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.name", "trivia")?
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 8080)?;

    if let Some(path) = file {
        builder = builder.add_source(File::from(path));
    }
    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(key, env(var))?;
    }

    builder.build()?.try_deserialize()
}
