//! Login sessions. Tokens are issued by the identity service, which stores
//! only their blake2 digest; every request loads its session explicitly.

use actix_web::web;
use anyhow::{bail, Context};
use blake2::{Blake2b, Digest};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::{database::get_db_conn, models::sessions::SessionData, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "user",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub account: String,
    pub role: Role,
    pub login_time: NaiveDateTime,
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Blake2b::digest(token.as_bytes()))
}

impl Session {
    pub fn is_expired(&self, now: NaiveDateTime, ttl_secs: i64) -> bool {
        now.signed_duration_since(self.login_time).num_seconds() > ttl_secs
    }

    pub async fn load(
        state: &web::Data<AppState>,
        token: String,
        role: Role,
    ) -> anyhow::Result<Session> {
        use crate::schema::sessions;

        let conn = get_db_conn(&state.pool)?;
        let token_hash = hash_token(&token);
        let data = web::block(move || {
            sessions::table
                .filter(sessions::token_hash.eq(token_hash))
                .filter(sessions::role.eq(role.as_str()))
                .order(sessions::login_time.desc())
                .limit(1)
                .get_result::<SessionData>(&conn)
                .optional()
        })
        .await
        .context("DB error")?;

        let data = match data {
            Some(data) => data,
            None => bail!("No such login token"),
        };
        let session = Session {
            account: data.account,
            role,
            login_time: data.login_time,
        };
        if session.is_expired(Utc::now().naive_utc(), state.config.session_ttl_secs) {
            bail!("Login has expired");
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn session_expires_after_ttl() {
        let login_time = NaiveDateTime::parse_from_str("2024-08-10 09:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let session = Session {
            account: "alice".to_string(),
            role: Role::Patient,
            login_time,
        };

        assert!(!session.is_expired(login_time + Duration::seconds(3600), 3600));
        assert!(session.is_expired(login_time + Duration::seconds(3601), 3600));
    }

    #[test]
    fn token_digest_is_stable_hex() {
        let digest = hash_token("secret-token");
        assert_eq!(digest, hash_token("secret-token"));
        assert_ne!(digest, hash_token("other-token"));
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
