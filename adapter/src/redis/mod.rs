use std::time::Duration;

use redis::{AsyncCommands, Client};
use shared::{
    config::RedisConfig,
    error::{AppError, AppResult},
};

pub mod model;

use self::model::{RedisKey, RedisValue};

/// TTL of the per-office booking lock. The backstop for a holder that
/// dies without releasing.
const LOCK_TTL: Duration = Duration::from_secs(10);
/// Bounded blocking wait for the lock before the booking is rejected as
/// retryable.
const LOCK_WAIT: Duration = Duration::from_secs(3);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(250);

pub struct RedisClient {
    client: Client,
}

impl RedisClient {
    pub fn new(config: &RedisConfig) -> AppResult<Self> {
        let client = Client::open(format!("redis://{}:{}", config.host, config.port))?;
        Ok(Self { client })
    }

    pub async fn set_ex<T: RedisKey>(&self, key: &T, value: &T::Value, ttl: u64) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key.inner(), value.inner(), ttl)
            .await?;
        Ok(())
    }

    pub async fn get<T: RedisKey>(&self, key: &T) -> AppResult<Option<T::Value>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: Option<String> = conn.get(key.inner()).await?;
        result.map(T::Value::try_from).transpose()
    }

    pub async fn delete<T: RedisKey>(&self, key: &T) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(key.inner()).await?;
        Ok(())
    }

    pub async fn try_connect(&self) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// A held per-office booking lock. Owned by exactly one request; the token
/// makes release safe after the TTL has expired and someone else holds the
/// key.
pub struct OfficeLock {
    key: String,
    token: String,
}

const RELEASE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

impl RedisClient {
    /// Blocks up to `LOCK_WAIT` for the office's booking lock, polling at
    /// `LOCK_RETRY_INTERVAL`. Fails with `AppError::LockTimeout` when the
    /// wait is exhausted.
    pub async fn lock_office(&self, key: String) -> AppResult<OfficeLock> {
        let token = uuid::Uuid::new_v4().to_string();
        let deadline = tokio::time::Instant::now() + LOCK_WAIT;
        loop {
            if self.try_acquire(&key, &token).await? {
                return Ok(OfficeLock { key, token });
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AppError::LockTimeout);
            }
            tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
        }
    }

    async fn try_acquire(&self, key: &str, token: &str) -> AppResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("PX")
            .arg(LOCK_TTL.as_millis() as u64)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(result.is_some())
    }

    /// Compare-and-delete release; a lock whose TTL already expired (and
    /// whose key was re-acquired) is left alone.
    pub async fn unlock_office(&self, lock: &OfficeLock) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(&lock.key)
            .arg(&lock.token)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }
}
