// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod health;
pub mod login;

pub use health::health_get;
pub use login::login_post;
