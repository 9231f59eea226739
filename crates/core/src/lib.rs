//! Pure domain logic for the Looks Lab backend.
//!
//! Nothing in this crate performs I/O. The `db` and `api` crates build on
//! these constants, enums, and validation helpers.

pub mod domains;
pub mod error;
pub mod iap;
pub mod images;
pub mod insights;
pub mod nutrition;
pub mod onboarding;
pub mod progress;
pub mod quotes;
pub mod subscription;
pub mod types;
pub mod workout;
