//! JSON backup: full-snapshot export and merge import.

mod export;
mod import;
mod menus;

pub use export::*;
pub use import::*;
pub use menus::*;

/// Application tag every bundle carries in `appName`.
pub const APP_NAME: &str = "smrm";
