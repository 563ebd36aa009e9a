pub mod bus;
pub mod catalog;
pub mod config;
pub mod ipc;
pub mod logging;
pub mod prefs;
pub mod session;
pub mod shutdown;
pub mod store;
pub mod surface;
pub mod ui;
pub mod window;
