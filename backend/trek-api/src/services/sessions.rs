/// Cookie-session storage backed by Redis.
///
/// Login mints an opaque token, stores `token -> user id` with a TTL, and
/// hands the token to the client in an http-only cookie. Handlers never see
/// the token; the auth middleware resolves it to a `UserId` extension.
use async_trait::async_trait;
use rand::RngCore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Name of the session cookie set on login.
pub const SESSION_COOKIE: &str = "trek_session";

const SESSION_KEY_PREFIX: &str = "trek:session:";
const SESSION_TOKEN_BYTES: usize = 32;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Mint a new session for the user and return the opaque token.
    async fn create(&self, user_id: Uuid) -> Result<String>;

    /// Resolve a token to the user it belongs to, if the session is alive.
    async fn fetch(&self, token: &str) -> Result<Option<Uuid>>;

    /// Drop a session. Revoking an unknown token is a no-op.
    async fn revoke(&self, token: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    fn key(token: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: Uuid) -> Result<String> {
        let token = generate_session_token();
        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(Self::key(&token), user_id.to_string(), self.ttl_secs)
            .await?;
        Ok(token)
    }

    async fn fetch(&self, token: &str) -> Result<Option<Uuid>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(Self::key(token)).await?;
        match value {
            Some(raw) => {
                let user_id = Uuid::parse_str(&raw).map_err(|_| {
                    AppError::Internal(format!("corrupt session entry for token {}", token))
                })?;
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(Self::key(token)).await?;
        Ok(())
    }
}

/// Opaque, URL-safe session token (256 bits, hex-encoded).
fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
