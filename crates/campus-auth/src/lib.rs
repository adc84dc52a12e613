//! Club credentials for Campus Live.
//!
//! Clubs register with a name, an email and a password. Passwords are
//! stored as argon2id hashes; a successful registration or login returns
//! an HS256 bearer token whose claims identify the club. [`TokenService`]
//! implements [`campus_types::Authorizer`], which is how the live mutation
//! gateway and the authenticated HTTP routes consume a credential decision.

mod clubs;
mod error;
mod header;
mod password;
mod token;

pub use clubs::{find_club, login, register_club, Club, ClubSummary};
pub use error::AuthError;
pub use header::parse_bearer;
pub use password::{hash_password, verify_password};
pub use token::{ClubClaims, TokenService, DEFAULT_TOKEN_TTL_HOURS};
