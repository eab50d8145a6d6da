use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{config::AppConfig, store::SharedTripStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: SharedTripStore,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedTripStore) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        Self {
            config,
            store,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
