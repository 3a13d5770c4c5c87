//! Settings come from a TOML file picked by `--settings` or the build profile.
//! See `bin/settings_demo.rs` for a binary that loads and prints them.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
