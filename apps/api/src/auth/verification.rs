//! Email verification tokens, kept in Redis with a TTL.

use redis::Client as RedisClient;
use uuid::Uuid;

use crate::errors::AppError;

pub const VERIFICATION_TTL_SECS: u64 = 24 * 60 * 60;

fn token_key(token: &str) -> String {
    format!("habayta:email-verify:{token}")
}

/// Stores a fresh single-use token for `user_id` and returns it.
pub async fn issue_verification_token(redis: &RedisClient, user_id: Uuid) -> Result<String, AppError> {
    let token = Uuid::new_v4().simple().to_string();
    let mut conn = redis.get_multiplexed_async_connection().await?;
    redis::cmd("SET")
        .arg(token_key(&token))
        .arg(user_id.to_string())
        .arg("EX")
        .arg(VERIFICATION_TTL_SECS)
        .query_async::<_, ()>(&mut conn)
        .await?;
    Ok(token)
}

/// Consumes a token. Returns the user it was issued for, or `None` when the
/// token is unknown, already used or expired.
pub async fn consume_verification_token(
    redis: &RedisClient,
    token: &str,
) -> Result<Option<Uuid>, AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let user_id: Option<String> = redis::cmd("GETDEL")
        .arg(token_key(token))
        .query_async(&mut conn)
        .await?;
    Ok(user_id.and_then(|s| Uuid::parse_str(&s).ok()))
}

/// `{base}/verify-email?token={token}`
pub fn verification_link(app_base_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={token}", app_base_url.trim_end_matches('/'))
}
