mod refresh_token_store_redis;
mod revocation_list_redis;

pub use refresh_token_store_redis::*;
pub use revocation_list_redis::*;
