use rand::Rng;
use redis::AsyncCommands;

use super::queue::QueueError;

const OTP_TTL_SECONDS: u64 = 600;

fn key(email: &str) -> String {
    format!("aquaclean:otp:{}", email.trim().to_lowercase())
}

/// Random six-digit numeric code.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// No code was issued, or it expired.
    #[error("OTP not found")]
    NotFound,

    #[error("Invalid OTP")]
    Mismatch,

    #[error(transparent)]
    Store(#[from] QueueError),
}

impl From<redis::RedisError> for OtpError {
    fn from(e: redis::RedisError) -> Self {
        OtpError::Store(QueueError::Redis(e))
    }
}

/// Email verification codes kept in Redis with a ten minute expiry.
pub struct OtpStore {
    client: redis::Client,
}

impl OtpStore {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// Issue a fresh code, replacing any outstanding one.
    pub async fn issue(&self, email: &str) -> Result<String, OtpError> {
        let code = generate_code();
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key(email), &code, OTP_TTL_SECONDS)
            .await?;
        Ok(code)
    }

    /// Check a code. A matching code is consumed.
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), OtpError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(key(email)).await?;
        match stored {
            None => Err(OtpError::NotFound),
            Some(s) if s != code.trim() => Err(OtpError::Mismatch),
            Some(_) => {
                conn.del::<_, ()>(key(email)).await?;
                Ok(())
            }
        }
    }
}
