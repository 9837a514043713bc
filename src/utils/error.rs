use std::fmt;

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub enum SeedError {
    Config(String),
    Database(String),
    PasswordHash(String),
    Fixture(String),
    Verification(Vec<String>),
    Output(String),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SeedError::Database(msg) => write!(f, "Database error: {}", msg),
            SeedError::PasswordHash(msg) => write!(f, "Password hashing error: {}", msg),
            SeedError::Fixture(msg) => write!(f, "Fixture error: {}", msg),
            SeedError::Verification(failed) => {
                write!(f, "Verification failed: {}", failed.join(", "))
            }
            SeedError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for SeedError {}

impl From<mongodb::error::Error> for SeedError {
    fn from(e: mongodb::error::Error) -> Self {
        SeedError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(e: serde_json::Error) -> Self {
        SeedError::Output(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for SeedError {
    fn from(e: bcrypt::BcryptError) -> Self {
        SeedError::PasswordHash(e.to_string())
    }
}

/// True when the driver error is a unique index violation (E11000)
pub fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::InsertMany(insert_error) => insert_error
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY_CODE))
            .unwrap_or(false),
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SeedError::Config("SEED_BCRYPT_COST must be between 4 and 31".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: SEED_BCRYPT_COST must be between 4 and 31"
        );

        let err = SeedError::Verification(vec!["users_count".into(), "indexes".into()]);
        assert_eq!(err.to_string(), "Verification failed: users_count, indexes");
    }

    #[test]
    fn test_bcrypt_error_converts() {
        let err: SeedError = bcrypt::hash("123", 2).unwrap_err().into();
        assert!(matches!(err, SeedError::PasswordHash(_)));
    }
}
