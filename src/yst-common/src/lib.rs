mod message;
pub mod asset;
pub mod constants;
pub mod layout;
pub mod platform;

// re-export for convenient use with `message`
pub use colored::Colorize;
