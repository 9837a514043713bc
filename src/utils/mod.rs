// Utility functions
pub mod error;
pub mod normalize;

pub use error::*;
pub use normalize::*;
