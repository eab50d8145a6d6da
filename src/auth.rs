use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    PrivateCookieJar,
};

use crate::{error::AppError, models::trip::Trip, state::AppState};

pub const ACCESS_COOKIE: &str = "tripmates_access";

/// Gate on the shared trip passphrase.
///
/// The comparison is plain string equality against the stored secret.
pub fn check_passphrase(trip: &Trip, input: &str) -> Result<(), AppError> {
    if trip.passphrase == input {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

/// Trip ids this browser has unlocked, kept as a JSON array in the encrypted
/// access cookie.
#[derive(Debug, Clone, Default)]
pub struct TripAccess(Vec<String>);

#[async_trait]
impl FromRequestParts<AppState> for TripAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        Ok(Self::from_jar(&jar))
    }
}

impl TripAccess {
    pub fn from_jar(jar: &PrivateCookieJar) -> Self {
        let ids = jar
            .get(ACCESS_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default();
        Self(ids)
    }

    pub fn allows(&self, trip_id: &str) -> bool {
        self.0.iter().any(|id| id == trip_id)
    }

    pub fn require(&self, trip_id: &str) -> Result<(), AppError> {
        if self.allows(trip_id) {
            Ok(())
        } else {
            Err(AppError::AccessDenied)
        }
    }

    /// Adds `trip_id` to the unlocked set stored in `jar`.
    pub fn grant(
        mut self,
        jar: PrivateCookieJar,
        trip_id: &str,
    ) -> Result<PrivateCookieJar, AppError> {
        if !self.allows(trip_id) {
            self.0.push(trip_id.to_owned());
        }
        let value = serde_json::to_string(&self.0).map_err(|err| AppError::Other(err.into()))?;
        let cookie = Cookie::build((ACCESS_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        Ok(jar.add(cookie))
    }
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;

    #[test]
    fn passphrase_must_match_exactly() {
        let trip = Trip {
            passphrase: "fox".into(),
            ..Trip::default()
        };
        assert!(check_passphrase(&trip, "fox").is_ok());
        assert!(matches!(
            check_passphrase(&trip, "cat"),
            Err(AppError::AccessDenied)
        ));
        assert!(matches!(
            check_passphrase(&trip, "Fox"),
            Err(AppError::AccessDenied)
        ));
    }

    #[test]
    fn granted_ids_survive_the_jar() {
        let jar = PrivateCookieJar::new(Key::from(&[7u8; 64][..]));
        let jar = TripAccess::default().grant(jar, "negev").unwrap();
        let jar = TripAccess::from_jar(&jar).grant(jar, "galilee").unwrap();

        let access = TripAccess::from_jar(&jar);
        assert!(access.allows("negev"));
        assert!(access.allows("galilee"));
        assert!(access.require("golan").is_err());
    }

    #[test]
    fn ids_with_commas_stay_whole() {
        let jar = PrivateCookieJar::new(Key::from(&[7u8; 64][..]));
        let jar = TripAccess::default().grant(jar, "north,south").unwrap();

        let access = TripAccess::from_jar(&jar);
        assert!(access.allows("north,south"));
        assert!(!access.allows("north"));
        assert!(!access.allows("south"));
    }
}
