pub mod base;
pub mod plain_provider;
pub mod securetoken_provider;

pub use base::{create_identity_provider, IdentityProvider, ProviderConfig};
