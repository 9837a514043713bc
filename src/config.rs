use crate::utils::SeedError;
use std::env;

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "recipes_app";
const DEFAULT_PASSWORD: &str = "123";

/// Runtime settings, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub uri: String,
    pub database: String,
    pub bcrypt_cost: u32,
    pub password: String,
}

impl SeedConfig {
    pub fn from_env() -> Result<Self, SeedError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, SeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_URI.to_string());

        let database = lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        if database.trim().is_empty() {
            return Err(SeedError::Config("MONGODB_DATABASE must not be empty".to_string()));
        }

        let bcrypt_cost = match lookup("SEED_BCRYPT_COST") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| {
                    SeedError::Config(format!(
                        "SEED_BCRYPT_COST must be between 4 and 31, got '{}'",
                        raw
                    ))
                })?,
            None => bcrypt::DEFAULT_COST,
        };

        let password = lookup("SEED_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
        if password.is_empty() {
            return Err(SeedError::Config("SEED_PASSWORD must not be empty".to_string()));
        }

        Ok(Self {
            uri,
            database,
            bcrypt_cost,
            password,
        })
    }
}
