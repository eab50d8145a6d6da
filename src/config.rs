use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use crate::{
    error::AppError,
    reconcile::{is_date_pattern, SHORT_DATE_FORMAT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Files,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "files" => Ok(StoreBackend::Files),
            other => Err(AppError::Config(format!(
                "invalid TRIP_STORE `{other}` (expected sqlite or files)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub trip_store: StoreBackend,
    pub data_root: PathBuf,
    pub cookie_secret: String,
    pub date_format: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://tripmates.db?mode=rwc".to_string());
        let listen_addr: SocketAddr = lookup("APP_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let trip_store = match lookup("TRIP_STORE") {
            Some(value) => value.parse::<StoreBackend>()?,
            None => StoreBackend::default(),
        };

        let data_root = lookup("DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let cookie_secret = lookup("COOKIE_SECRET")
            .unwrap_or_else(|| "change-me-tripmates-development-cookie-secret".to_string());

        let date_format =
            lookup("DATE_FORMAT").unwrap_or_else(|| SHORT_DATE_FORMAT.to_string());
        if !is_date_pattern(&date_format) {
            return Err(AppError::Config(format!(
                "invalid DATE_FORMAT `{date_format}`"
            )));
        }

        Ok(Self {
            database_url,
            listen_addr,
            trip_store,
            data_root,
            cookie_secret,
            date_format,
        })
    }
}
