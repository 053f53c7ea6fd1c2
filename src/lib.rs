// Library surface for the typing engine; the terminal host lives in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod timers;
pub mod word_source;
