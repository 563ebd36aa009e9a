//! Command channel between surfaces and the preference store.
//!
//! Surfaces send [`StoreCommand`]s through a bounded mpsc channel; the
//! [`StoreServer`] task answers each one through its oneshot responder.

mod client;
mod server;
mod types;

#[cfg(test)]
mod tests;

pub use client::CommandClient;
pub use server::StoreServer;
pub use types::{IpcError, StoreCommand, StoreResult};

use tokio::sync::mpsc;

use crate::config::IpcConfig;

pub struct IpcLayer;

impl IpcLayer {
    pub fn new(config: &IpcConfig) -> (CommandClient, StoreServer) {
        let (sender, receiver) = mpsc::channel(config.buffer.max(1));
        (
            CommandClient::new(sender, config.timeout()),
            StoreServer::new(receiver),
        )
    }
}
