//! Bastion Auth: password hashing, JWT issuance/validation,
//! registration, authentication and startup bootstrap.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod password;
pub mod registration;
pub mod service;
pub mod token;

pub use bootstrap::{Bootstrapper, SystemOrganizationConfig, SystemUserConfig};
pub use config::AuthConfig;
pub use error::AuthError;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use registration::{Registration, RegistrationService};
pub use service::{AuthService, Authentication, Credentials};
pub use token::{Claims, TokenIssuer, TokenManager, TokenVerifier, expiration_time};
