pub mod review;
pub mod user;

pub use review::Review;
pub use user::{SessionCredentials, User};
