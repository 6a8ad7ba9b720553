use redis::aio::ConnectionManager;

/// Redis is only used for request counters, so the client exposes just
/// what the rate limiter and health check need.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
}

impl RedisClient {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let conn = redis::Client::open(url)?.get_connection_manager().await?;
        tracing::info!("redis connection manager ready");
        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }

    /// Counts one hit against `key` and returns the running total.
    ///
    /// `INCR` and `EXPIRE` go out as one MULTI block so a key can never be
    /// left without a TTL. Callers put the window index in the key, so the
    /// refreshed TTL never stretches a window.
    pub async fn hit_window(&self, key: &str, window_secs: u64) -> Result<u64, redis::RedisError> {
        let mut conn = self.conn.clone();
        let ttl = i64::try_from(window_secs).unwrap_or(i64::MAX);
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(key, 1u64)
            .expire(key, ttl)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}
