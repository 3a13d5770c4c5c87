mod member_repo_memory;
mod refresh_token_store_memory;
mod revocation_list_memory;
mod tx_memory;

pub use member_repo_memory::*;
pub use refresh_token_store_memory::*;
pub use revocation_list_memory::*;
pub use tx_memory::*;
