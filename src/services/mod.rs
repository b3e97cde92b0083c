pub mod admins;
pub mod profile;
pub mod session;
pub mod users;

pub use admins::{AdminService, CreateAdminForm, UpdateAdminForm};
pub use profile::{ChangePasswordForm, ProfileService, UpdateProfileForm};
pub use session::{login, LoginForm, LoginResponse};
pub use users::{CreateUserForm, UpdateUserForm, UserService};
