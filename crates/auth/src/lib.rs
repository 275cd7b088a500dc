pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod validation;

// Re-export key items for convenience
pub use jwt::{Claims, JwtService};
pub use middleware::{AuthUser, require_auth};
pub use password::CredentialHasher;
pub use service::AccountService;
