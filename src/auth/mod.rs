//! Password hashing, access tokens and the authenticated-user extractor.

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::AuthUser;
pub use jwt::{create_access_token, decode_access_token, Claims};
pub use password::{hash_password, verify_password};
