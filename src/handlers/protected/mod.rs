// handlers/protected/mod.rs - Handlers behind the bearer session middleware

pub mod admin;
pub mod profile;
pub mod user;

pub use admin::{admin_delete, admin_get, admin_list, admin_post, admin_put};
pub use profile::{password_post, profile_get, profile_post};
pub use user::{user_delete, user_get, user_list, user_post, user_put};
