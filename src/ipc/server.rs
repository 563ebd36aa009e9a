use tokio::sync::{mpsc, oneshot};

use crate::shutdown::ShutdownHandle;
use crate::store::Store;

use super::types::StoreCommand;

pub struct StoreServer {
    pub(crate) receiver: mpsc::Receiver<StoreCommand>,
}

impl StoreServer {
    pub fn new(receiver: mpsc::Receiver<StoreCommand>) -> Self {
        Self { receiver }
    }

    /// Serve commands one at a time until every client is gone or shutdown
    /// is signaled.
    pub async fn run(mut self, mut store: Store, shutdown: ShutdownHandle) {
        loop {
            let command = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                command = self.receiver.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            store.record(command.name(), command.update());
            handle(&mut store, command);
        }
        tracing::debug!("Store server stopped");
    }
}

fn handle(store: &mut Store, command: StoreCommand) {
    match command {
        StoreCommand::Get { field, respond_to } => {
            reply(respond_to, store.get(field), "Get");
        }
        StoreCommand::GetPreferences { respond_to } => {
            reply(respond_to, store.preferences(), "GetPreferences");
        }
        StoreCommand::GetCrosshairList { respond_to } => {
            reply(respond_to, store.crosshair_list(), "GetCrosshairList");
        }
        StoreCommand::Set { update, respond_to } => {
            reply(respond_to, store.set(update), "Set");
        }
        StoreCommand::ToggleLock { respond_to } => {
            reply(respond_to, store.toggle_lock(), "ToggleLock");
        }
        StoreCommand::ToggleVisibility { respond_to } => {
            reply(respond_to, store.toggle_visibility(), "ToggleVisibility");
        }
        StoreCommand::SetPosition { x, y, respond_to } => {
            store.set_position(x, y);
            reply(respond_to, (), "SetPosition");
        }
        StoreCommand::Save { respond_to } => {
            reply(respond_to, store.save(), "Save");
        }
        StoreCommand::Reset { respond_to } => {
            store.reset();
            reply(respond_to, (), "Reset");
        }
        StoreCommand::WindowPosition { id, respond_to } => {
            reply(respond_to, store.window_position(&id), "WindowPosition");
        }
        StoreCommand::CenterWindow { id, respond_to } => {
            reply(respond_to, store.center_window(&id), "CenterWindow");
        }
        StoreCommand::MoveToNextDisplay { id, respond_to } => {
            reply(respond_to, store.move_to_next_display(&id), "MoveToNextDisplay");
        }
        StoreCommand::MoveWindowBy {
            id,
            dx,
            dy,
            respond_to,
        } => {
            reply(respond_to, store.move_window_by(&id, dx, dy), "MoveWindowBy");
        }
        StoreCommand::CreateShadowWindow { respond_to } => {
            reply(respond_to, store.create_shadow_window(), "CreateShadowWindow");
        }
        StoreCommand::CloseShadowWindow { id, respond_to } => {
            reply(respond_to, store.close_shadow_window(&id), "CloseShadowWindow");
        }
        StoreCommand::CloseAllShadowWindows { respond_to } => {
            store.close_all_shadow_windows();
            reply(respond_to, (), "CloseAllShadowWindows");
        }
        StoreCommand::OpenSettings { respond_to } => {
            reply(respond_to, store.open_settings(), "OpenSettings");
        }
        StoreCommand::ImportCrosshair { path, respond_to } => {
            reply(respond_to, store.import_crosshair(&path), "ImportCrosshair");
        }
        StoreCommand::Dispatch { action, respond_to } => {
            reply(respond_to, store.dispatch(action), "Dispatch");
        }
    }
}

fn reply<T>(respond_to: oneshot::Sender<T>, value: T, command: &'static str) {
    if respond_to.send(value).is_err() {
        tracing::trace!("IPC: {} response dropped (receiver gone)", command);
    }
}
