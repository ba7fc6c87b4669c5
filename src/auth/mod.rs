pub mod auth;
pub mod auth_state;

pub use auth::{Auth, ExpectedUser};
pub use auth_state::{AuthSnapshot, AuthState, AuthSubscription};
