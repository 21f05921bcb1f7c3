mod token;

pub use token::{AuthToken, TokenService, BEARER_PREFIX};
