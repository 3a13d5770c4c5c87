mod argon2_hasher;
mod auth_service_impl;
mod jwt_codec;
mod member_authenticator;

pub use argon2_hasher::*;
pub use auth_service_impl::*;
pub use jwt_codec::*;
pub use member_authenticator::*;
