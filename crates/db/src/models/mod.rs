//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create/update DTOs where the API accepts them

pub mod domain;
pub mod image;
pub mod insight;
pub mod onboarding;
pub mod refresh_token;
pub mod subscription;
pub mod user;
