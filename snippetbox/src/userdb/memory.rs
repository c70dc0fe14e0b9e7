use async_trait::async_trait;
use chrono::Utc;
use ring::pbkdf2;
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicI64, Ordering};
#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use tokio::sync::Mutex;

use crate::utils::gen_random_bytes;

use super::errors::UserError;
use super::types::{User, UserStore};

const PBKDF2_ITERATIONS: u32 = 50_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

// Unknown emails are checked against these so they cost the same as a wrong password
const DUMMY_SALT: [u8; SALT_LEN] = [0x5a; SALT_LEN];
const DUMMY_HASH: [u8; HASH_LEN] = [0; HASH_LEN];

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(PBKDF2_ITERATIONS).unwrap_or(NonZeroU32::MIN)
}

fn hash_password(salt: &[u8], password: &[u8]) -> Vec<u8> {
    let mut hashed = vec![0u8; HASH_LEN];
    pbkdf2::derive(PBKDF2_ALG, iterations(), salt, password, &mut hashed);
    hashed
}

fn verify_password(salt: &[u8], password: &[u8], hashed: &[u8]) -> bool {
    pbkdf2::verify(PBKDF2_ALG, iterations(), salt, password, hashed).is_ok()
}

/// Run a PBKDF2 computation off the async workers.
async fn run_hashing<T, F>(work: F) -> Result<T, UserError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| UserError::Crypto(e.to_string()))
}

/// In-process [`UserStore`] with PBKDF2-hashed passwords.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<BTreeMap<i64, User>>,
    // Ids are never reused, so a stale session cannot inherit a new account
    last_id: AtomicI64,
    #[cfg(test)]
    verifications: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an account. Returns whether it existed.
    pub async fn delete(&self, id: i64) -> bool {
        self.users.lock().await.remove(&id).is_some()
    }

    pub async fn get(&self, id: i64) -> Option<User> {
        self.users.lock().await.get(&id).cloned()
    }

    /// Id, salt and hash for `email`, copied out so the lock is not held while hashing.
    async fn credentials(&self, email: &str) -> Option<(i64, Vec<u8>, Vec<u8>)> {
        self.users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .map(|u| (u.id, u.salt.clone(), u.hashed_password.clone()))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    #[tracing::instrument(skip(self, password))]
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<i64, UserError> {
        let salt = gen_random_bytes(SALT_LEN).map_err(|e| UserError::Crypto(e.to_string()))?;
        let hashed_password = {
            let salt = salt.clone();
            let password = password.to_owned();
            run_hashing(move || hash_password(&salt, password.as_bytes())).await?
        };

        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == email) {
            return Err(UserError::DuplicateEmail);
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                salt,
                hashed_password,
                created_at: Utc::now(),
            },
        );

        tracing::debug!(id, "Registered user");
        Ok(id)
    }

    #[tracing::instrument(skip(self, password))]
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, UserError> {
        let (id, salt, hashed) = match self.credentials(email).await {
            Some((id, salt, hashed)) => (Some(id), salt, hashed),
            None => (None, DUMMY_SALT.to_vec(), DUMMY_HASH.to_vec()),
        };

        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let password = password.to_owned();
        let verified =
            run_hashing(move || verify_password(&salt, password.as_bytes(), &hashed)).await?;

        match id {
            Some(id) if verified => Ok(id),
            _ => Err(UserError::InvalidCredentials),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, UserError> {
        Ok(self.users.lock().await.contains_key(&id))
    }
}
