pub mod admin;
pub mod user;
pub mod user_token;

pub use admin::{Admin, AdminView};
pub use user::{User, UserView};
pub use user_token::UserToken;
