//! One controller per open surface.
//!
//! The controller owns a disposable cache of the preference aggregate,
//! renders it through its [`SurfaceBindings`], turns gestures into
//! optimistic updates plus queued store mutations, and reconciles every
//! bus notification into the cache. All state transitions go through
//! [`SurfaceReducer`]; this type only performs the side effects.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::bus::{BusReceiver, Notification, NotificationBus, RecvError, TryRecvError};
use crate::config::LockConfig;
use crate::ipc::CommandClient;
use crate::prefs::{
    clamp_size, opacity_from_percent, FieldUpdate, HexColor, Preferences, Reticle,
    ValidationError,
};
use crate::shutdown::ShutdownHandle;
use crate::ui::mvi::Reducer;
use crate::window::SurfaceId;

use super::handle::SurfaceEvent;
use super::mutations::{Mutation, MutationQueue};
use super::notice::{Notice, NoticeSink};
use super::{
    SurfaceBindings, SurfaceError, SurfaceIntent, SurfaceReducer, SurfaceRole, SurfaceState,
    SurfaceView,
};

pub const NUDGE_STEP: i32 = 1;
pub const FAST_NUDGE_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
    Left,
    Right,
}

impl Nudge {
    pub fn offset(&self, fast: bool) -> (i32, i32) {
        let step = if fast { FAST_NUDGE_STEP } else { NUDGE_STEP };
        match self {
            Nudge::Up => (0, -step),
            Nudge::Down => (0, step),
            Nudge::Left => (-step, 0),
            Nudge::Right => (step, 0),
        }
    }
}

/// What every controller of a session shares.
#[derive(Clone)]
pub struct SurfaceContext {
    pub client: CommandClient,
    pub bus: NotificationBus,
    pub notices: Arc<dyn NoticeSink>,
    pub lock: LockConfig,
}

pub struct SurfaceController {
    id: SurfaceId,
    state: SurfaceState,
    client: CommandClient,
    queue: MutationQueue,
    bus: BusReceiver,
    bindings: Arc<dyn SurfaceBindings>,
    notices: Arc<dyn NoticeSink>,
    lock: LockConfig,
    ack_deadline: Option<Instant>,
    /// A write went out since the last commit.
    uncommitted: bool,
    dragging: bool,
    /// UI requests that arrived while waiting for an unlock.
    deferred: VecDeque<Notification>,
}

impl SurfaceController {
    /// Create a controller and subscribe it to the bus.
    ///
    /// Subscription happens here, before any hydration, so nothing
    /// published after construction is missed.
    pub fn new(
        id: SurfaceId,
        role: SurfaceRole,
        bindings: Arc<dyn SurfaceBindings>,
        context: &SurfaceContext,
    ) -> Self {
        let bus = context.bus.subscribe();
        let queue = MutationQueue::spawn(
            id.clone(),
            context.client.clone(),
            Arc::clone(&context.notices),
        );
        Self {
            id,
            state: SurfaceState::new(role),
            client: context.client.clone(),
            queue,
            bus,
            bindings,
            notices: Arc::clone(&context.notices),
            lock: context.lock.clone(),
            ack_deadline: None,
            uncommitted: false,
            dragging: false,
            deferred: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &SurfaceId {
        &self.id
    }

    pub fn role(&self) -> SurfaceRole {
        self.state.role
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn preferences(&self) -> &Preferences {
        &self.state.prefs
    }

    pub fn view(&self) -> SurfaceView {
        self.state.view()
    }

    /// When the lock acknowledgment will clear, if it is showing.
    pub fn lock_ack_deadline(&self) -> Option<Instant> {
        self.ack_deadline
    }

    // Lifecycle

    /// Initial hydration. Shadows only load the catalog and wait for their
    /// bulk sync; every other role reads each field once.
    pub async fn hydrate(&mut self) -> Result<(), SurfaceError> {
        if self.role().hydrates_from_sync() {
            let catalog = self.client.get_crosshair_list().await?;
            self.apply(SurfaceIntent::CatalogLoaded(catalog));
            return Ok(());
        }
        self.read_all().await
    }

    /// One parallel batch: every readable field plus the catalog.
    async fn read_all(&mut self) -> Result<(), SurfaceError> {
        let client = &self.client;
        let (
            crosshair,
            size,
            opacity,
            color,
            reticle,
            locked,
            visible,
            follow_mouse,
            hide_on_ads,
            catalog,
        ) = tokio::join!(
            client.get_crosshair(),
            client.get_size(),
            client.get_opacity(),
            client.get_color(),
            client.get_reticle(),
            client.is_locked(),
            client.is_visible(),
            client.get_follow_mouse(),
            client.get_hide_on_ads(),
            client.get_crosshair_list(),
        );

        let prefs = Preferences {
            crosshair: crosshair?,
            size: size?,
            opacity: opacity?,
            color: color?,
            reticle: reticle?,
            locked: locked?,
            visible: visible?,
            follow_mouse: follow_mouse?,
            hide_on_ads: hide_on_ads?,
            ..Preferences::default()
        };
        let catalog = catalog?;

        tracing::info!(surface = %self.id, role = %self.role(), "Hydrated");
        self.apply(SurfaceIntent::Hydrated { prefs, catalog });
        Ok(())
    }

    /// Drive the surface until it is closed, its event channel closes, the
    /// bus closes or shutdown is signaled. Pending mutations are flushed on
    /// exit.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SurfaceEvent>,
        mut closed: watch::Receiver<bool>,
        shutdown: ShutdownHandle,
    ) {
        if let Err(e) = self.hydrate().await {
            self.report(&e);
        }

        loop {
            self.run_deferred().await;
            let deadline = self.ack_deadline;

            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = async { closed.wait_for(|closed| *closed).await.map(drop) } => break,
                result = self.bus.recv() => match result {
                    Ok(notification) => {
                        if let Err(e) = self.handle_notification(notification).await {
                            self.report(&e);
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        if let Err(e) = self.recover_from_lag(missed).await {
                            self.report(&e);
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.apply(SurfaceIntent::LockAckExpired);
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }

        self.queue.flush().await;
        tracing::debug!(surface = %self.id, "Surface closed");
    }

    // Notifications

    /// Apply one bus notification.
    pub async fn handle_notification(
        &mut self,
        notification: Notification,
    ) -> Result<(), SurfaceError> {
        if self.role().handles_ui_signals() {
            match notification {
                Notification::OpenSettings => return self.open_settings().await.map(drop),
                Notification::OpenChooser => return self.open_chooser().await,
                Notification::CreateShadow => return self.duplicate().await.map(drop),
                _ => {}
            }
        }
        self.reconcile(notification);
        Ok(())
    }

    /// Handle everything already buffered on the bus without waiting.
    /// Returns how many notifications were applied.
    pub async fn pump_pending(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.bus.try_recv() {
                Ok(notification) => {
                    if let Err(e) = self.handle_notification(notification).await {
                        self.report(&e);
                    }
                    handled += 1;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    if let Err(e) = self.recover_from_lag(missed).await {
                        self.report(&e);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        self.run_deferred().await;
        handled
    }

    /// Synchronous part of notification handling. UI requests that need to
    /// await are deferred.
    fn reconcile(&mut self, notification: Notification) {
        if notification.is_ui_signal() && !self.role().handles_ui_signals() {
            return;
        }
        match notification {
            Notification::Field(update) => self.apply(SurfaceIntent::FieldChanged(update)),
            Notification::SyncSettings { target, prefs } => {
                if target == self.id {
                    tracing::debug!(surface = %self.id, "Bulk sync received");
                    self.apply(SurfaceIntent::Synced { prefs });
                }
            }
            Notification::PlaySound(name) => self.bindings.play_sound(&name),
            Notification::ShowAbout => self.bindings.show_about(),
            request @ (Notification::OpenSettings
            | Notification::OpenChooser
            | Notification::CreateShadow) => self.deferred.push_back(request),
        }
    }

    async fn run_deferred(&mut self) {
        while let Some(notification) = self.deferred.pop_front() {
            if let Err(e) = self.handle_notification(notification).await {
                self.report(&e);
            }
        }
    }

    /// Missed notifications cannot be replayed; re-read the aggregate.
    async fn recover_from_lag(&mut self, missed: u64) -> Result<(), SurfaceError> {
        tracing::warn!(surface = %self.id, missed, "Notification bus lagged, resyncing");
        let prefs = self.client.get_preferences().await?;
        self.apply(SurfaceIntent::Synced { prefs });
        Ok(())
    }

    // Gestures

    pub fn size_input(&mut self, size: u32) -> Result<(), SurfaceError> {
        self.require_configuration("change size")?;
        self.write(FieldUpdate::Size(clamp_size(size)));
        Ok(())
    }

    pub fn opacity_input(&mut self, percent: u8) -> Result<(), SurfaceError> {
        self.require_configuration("change opacity")?;
        self.write(FieldUpdate::Opacity(opacity_from_percent(percent)));
        Ok(())
    }

    pub fn slider_release(&mut self) {
        self.end_gesture();
    }

    /// Invalid input is rejected here and never reaches the store.
    pub fn color_input(&mut self, raw: &str) -> Result<(), SurfaceError> {
        self.require_configuration("change color")?;
        let color = HexColor::parse(raw)?;
        self.write(FieldUpdate::Color(color));
        Ok(())
    }

    pub fn color_blur(&mut self) {
        self.end_gesture();
    }

    pub fn pick_crosshair(&mut self, crosshair: &str) -> Result<(), SurfaceError> {
        self.require_configuration("change crosshair")?;
        let crosshair = crosshair.trim();
        if crosshair.is_empty() {
            return Err(ValidationError::EmptyCrosshair.into());
        }
        self.write(FieldUpdate::Crosshair(crosshair.to_string()));
        self.end_gesture();
        Ok(())
    }

    pub fn pick_reticle(&mut self, raw: &str) -> Result<(), SurfaceError> {
        self.require_configuration("change reticle")?;
        let reticle: Reticle = raw.parse()?;
        self.write(FieldUpdate::Reticle(reticle));
        self.end_gesture();
        Ok(())
    }

    pub fn set_follow_mouse(&mut self, follow: bool) -> Result<(), SurfaceError> {
        self.require_configuration("change follow mouse")?;
        self.write(FieldUpdate::FollowMouse(follow));
        self.end_gesture();
        Ok(())
    }

    pub fn set_hide_on_ads(&mut self, hide: bool) -> Result<(), SurfaceError> {
        self.require_configuration("change hide on ADS")?;
        self.write(FieldUpdate::HideOnAds(hide));
        self.end_gesture();
        Ok(())
    }

    /// Request a lock flip. The gate moves when `lock-changed` arrives.
    pub fn toggle_lock(&mut self) {
        self.queue.push(Mutation::ToggleLock);
        self.queue.push(Mutation::Commit);
    }

    pub fn toggle_visibility(&mut self) {
        let visible = !self.state.prefs.visible;
        self.apply(SurfaceIntent::Optimistic(FieldUpdate::Visible(visible)));
        self.queue.push(Mutation::ToggleVisibility);
        self.queue.push(Mutation::Commit);
    }

    pub fn drag_move(&mut self, dx: i32, dy: i32) -> Result<(), SurfaceError> {
        self.require_drag()?;
        self.dragging = true;
        self.queue.push(Mutation::MoveBy {
            target: self.id.clone(),
            dx,
            dy,
        });
        Ok(())
    }

    /// End of a drag. The primary remembers where it was dropped.
    pub fn drag_release(&mut self) -> Result<(), SurfaceError> {
        let was_dragging = std::mem::take(&mut self.dragging);
        self.require_drag()?;
        if was_dragging && self.role().persists_position() {
            self.queue.push(Mutation::PersistPosition(self.id.clone()));
        }
        Ok(())
    }

    pub fn nudge(&mut self, direction: Nudge, fast: bool) -> Result<(), SurfaceError> {
        self.require_position_change("move")?;
        let (dx, dy) = direction.offset(fast);
        self.queue.push(Mutation::MoveBy {
            target: self.placement_target(),
            dx,
            dy,
        });
        Ok(())
    }

    pub fn center(&mut self) -> Result<(), SurfaceError> {
        self.require_position_change("center")?;
        self.queue.push(Mutation::Center(self.placement_target()));
        Ok(())
    }

    pub fn next_display(&mut self) -> Result<(), SurfaceError> {
        self.require_position_change("change display")?;
        self.queue
            .push(Mutation::NextDisplay(self.placement_target()));
        Ok(())
    }

    /// Import an image, then select and commit it.
    pub async fn import_crosshair(&mut self, path: PathBuf) -> Result<String, SurfaceError> {
        self.require_configuration("import crosshair")?;
        let crosshair = self.client.import_crosshair(path).await?;
        let catalog = self.client.get_crosshair_list().await?;
        self.apply(SurfaceIntent::CatalogLoaded(catalog));
        self.pick_crosshair(&crosshair)?;
        Ok(crosshair)
    }

    /// Open a shadow of this surface.
    ///
    /// Queued writes are flushed first so the bulk sync the new surface
    /// receives includes every value already shown here.
    pub async fn duplicate(&mut self) -> Result<SurfaceId, SurfaceError> {
        if self.state.gate.is_locked() {
            return Err(SurfaceError::Locked { action: "duplicate" });
        }
        self.queue.flush().await;
        let id = self.client.create_shadow_window().await?;
        tracing::info!(surface = %self.id, shadow = %id, "Duplicated surface");
        Ok(id)
    }

    /// Reload defaults in the store, then re-read every field.
    pub async fn reset(&mut self) -> Result<(), SurfaceError> {
        self.queue.flush().await;
        self.uncommitted = false;
        self.client.reset_preferences().await?;
        self.read_all().await
    }

    pub async fn open_settings(&mut self) -> Result<SurfaceId, SurfaceError> {
        self.ensure_unlocked().await?;
        Ok(self.client.open_settings().await?)
    }

    pub async fn open_chooser(&mut self) -> Result<(), SurfaceError> {
        self.ensure_unlocked().await?;
        self.bindings.show_chooser(&self.state.catalog);
        Ok(())
    }

    /// Wait for everything queued so far to be answered by the store.
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    /// Force an unlock and wait until this surface observes it.
    async fn ensure_unlocked(&mut self) -> Result<(), SurfaceError> {
        if !self.state.gate.is_locked() {
            return Ok(());
        }

        tracing::info!(surface = %self.id, "Unlocking before opening configuration");
        self.client.set_locked(false).await?;

        let deadline = Instant::now() + self.lock.unlock_wait();
        while self.state.gate.is_locked() {
            match tokio::time::timeout_at(deadline, self.bus.recv()).await {
                Ok(Ok(notification)) => self.reconcile(notification),
                Ok(Err(RecvError::Lagged(missed))) => self.recover_from_lag(missed).await?,
                Ok(Err(RecvError::Closed)) => return Err(SurfaceError::Closed),
                Err(_) => {
                    let still_locked = self.client.is_locked().await?;
                    return Err(SurfaceError::UnlockTimeout { still_locked });
                }
            }
        }
        Ok(())
    }

    // Internals

    async fn handle_event(&mut self, event: SurfaceEvent) {
        let result = match event {
            SurfaceEvent::SizeInput(size) => self.size_input(size),
            SurfaceEvent::OpacityInput(percent) => self.opacity_input(percent),
            SurfaceEvent::SliderRelease => {
                self.slider_release();
                Ok(())
            }
            SurfaceEvent::ColorInput(raw) => self.color_input(&raw),
            SurfaceEvent::ColorBlur => {
                self.color_blur();
                Ok(())
            }
            SurfaceEvent::PickCrosshair(crosshair) => self.pick_crosshair(&crosshair),
            SurfaceEvent::PickReticle(raw) => self.pick_reticle(&raw),
            SurfaceEvent::SetFollowMouse(follow) => self.set_follow_mouse(follow),
            SurfaceEvent::SetHideOnAds(hide) => self.set_hide_on_ads(hide),
            SurfaceEvent::ToggleLock => {
                self.toggle_lock();
                Ok(())
            }
            SurfaceEvent::ToggleVisibility => {
                self.toggle_visibility();
                Ok(())
            }
            SurfaceEvent::DragMove { dx, dy } => self.drag_move(dx, dy),
            SurfaceEvent::DragRelease => self.drag_release(),
            SurfaceEvent::Nudge { direction, fast } => self.nudge(direction, fast),
            SurfaceEvent::Center => self.center(),
            SurfaceEvent::NextDisplay => self.next_display(),
            SurfaceEvent::ImportCrosshair(path) => self.import_crosshair(path).await.map(drop),
            SurfaceEvent::Duplicate => self.duplicate().await.map(drop),
            SurfaceEvent::Reset => self.reset().await,
            SurfaceEvent::OpenSettings => self.open_settings().await.map(drop),
            SurfaceEvent::OpenChooser => self.open_chooser().await,
            SurfaceEvent::Flush(done) => {
                self.queue.flush().await;
                let _ = done.send(());
                Ok(())
            }
            SurfaceEvent::Snapshot(respond_to) => {
                if respond_to.send(self.state.clone()).is_err() {
                    tracing::trace!(surface = %self.id, "Snapshot dropped (receiver gone)");
                }
                Ok(())
            }
        };

        if let Err(e) = result {
            self.report(&e);
        }
    }

    /// Run an intent through the reducer, then render and schedule the
    /// lock acknowledgment as needed.
    fn apply(&mut self, intent: SurfaceIntent) {
        let previous = std::mem::take(&mut self.state);
        let previous_view = previous.hydrated.then(|| previous.view());
        let previous_ack = previous.lock_ack;

        self.state = SurfaceReducer::reduce(previous, intent);

        if !self.state.lock_ack {
            self.ack_deadline = None;
        } else if !previous_ack {
            self.ack_deadline = Some(Instant::now() + self.lock.ack_duration());
        }

        if self.state.hydrated {
            let view = self.state.view();
            if previous_view.as_ref() != Some(&view) {
                self.bindings.render(&view);
            }
        }
    }

    fn write(&mut self, update: FieldUpdate) {
        self.apply(SurfaceIntent::Optimistic(update.clone()));
        self.queue.push(Mutation::Set(update));
        self.uncommitted = true;
    }

    /// Commit once per gesture, and only if the gesture wrote something.
    fn end_gesture(&mut self) {
        if std::mem::take(&mut self.uncommitted) {
            self.queue.push(Mutation::Commit);
        }
    }

    fn placement_target(&self) -> SurfaceId {
        match self.role() {
            SurfaceRole::Settings => SurfaceId::main(),
            SurfaceRole::Primary | SurfaceRole::Shadow => self.id.clone(),
        }
    }

    fn require_configuration(&self, action: &'static str) -> Result<(), SurfaceError> {
        if self.state.accepts_configuration() {
            Ok(())
        } else {
            Err(SurfaceError::Locked { action })
        }
    }

    fn require_position_change(&self, action: &'static str) -> Result<(), SurfaceError> {
        if self.state.gate.allows_position_change() {
            Ok(())
        } else {
            Err(SurfaceError::Locked { action })
        }
    }

    fn require_drag(&self) -> Result<(), SurfaceError> {
        if !self.role().is_draggable() {
            return Err(SurfaceError::Unsupported {
                role: self.role(),
                action: "drag",
            });
        }
        self.require_position_change("drag")
    }

    fn report(&self, error: &SurfaceError) {
        self.notices.notify(Notice::from_error(self.id.clone(), error));
    }
}
