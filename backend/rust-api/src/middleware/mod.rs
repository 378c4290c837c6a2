pub mod auth;

pub use auth::AuthStaff;
