mod member;
mod principal;
mod token;

pub use member::*;
pub use principal::*;
pub use token::*;
