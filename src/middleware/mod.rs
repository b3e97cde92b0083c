pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{session_auth_middleware, CurrentUser};
pub use extract::{parse_id, JsonBody};
pub use response::{ApiResponse, ApiResult};
