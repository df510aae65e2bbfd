use std::env;

use crate::utils::validators::validate_booking_code_prefix;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub booking_code_prefix: String,
    pub minio_endpoint: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub minio_bucket: String,
    pub minio_public_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            jwt_secret: env::var("JWT_SECRET")?,
            booking_code_prefix: booking_code_prefix(env::var("BOOKING_CODE_PREFIX").ok())?,
            minio_endpoint: env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            minio_access_key: env::var("MINIO_ACCESS_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            minio_secret_key: env::var("MINIO_SECRET_KEY")
                .unwrap_or_else(|_| "minioadmin".to_string()),
            minio_bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "homestay".to_string()),
            minio_public_url: env::var("MINIO_PUBLIC_URL").ok(),
        })
    }
}

/// Префикс должен проходить проверку формата кода, иначе бронирования
/// нельзя будет найти по коду.
fn booking_code_prefix(value: Option<String>) -> anyhow::Result<String> {
    let prefix = value.unwrap_or_else(|| "BK".to_string());
    anyhow::ensure!(
        validate_booking_code_prefix(&prefix),
        "BOOKING_CODE_PREFIX must be 1-10 ASCII letters or digits, got {:?}",
        prefix
    );
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_code_prefix_default() {
        assert_eq!(booking_code_prefix(None).unwrap(), "BK");
        assert_eq!(booking_code_prefix(Some("YH".to_string())).unwrap(), "YH");
    }

    #[test]
    fn test_booking_code_prefix_rejects_unsearchable_codes() {
        assert!(booking_code_prefix(Some("YH-".to_string())).is_err());
        assert!(booking_code_prefix(Some(String::new())).is_err());
        assert!(booking_code_prefix(Some("HOMESTAY2024".to_string())).is_err());
    }
}
