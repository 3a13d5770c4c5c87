// store

mod refresh_token_store;
mod revocation_list;

pub use refresh_token_store::*;
pub use revocation_list::*;

// repo

mod member_repo;

mod repo_tx;

pub use member_repo::*;

pub use repo_tx::*;
