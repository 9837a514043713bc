pub mod fixtures;
pub mod recipes_seed;
pub mod verify;

pub use recipes_seed::seed_database;
pub use verify::{verify_database, VerifyReport};
