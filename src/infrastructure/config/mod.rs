//! Configuration adapters

mod xdg;

pub use xdg::{XdgConfigStore, APP_DIR_NAME, CONFIG_FILE_NAME};
