//! Event-wait and scoped-resource-lifecycle engine.
//!
//! This module provides the [`SyncEngine`] type, the orchestration layer a
//! test driver uses to act on a host application whose UI actions are
//! fire-and-forget. Every operation follows the same protocol: subscribe to
//! the completion events the host is documented to emit, trigger the action,
//! poll the subscription until it fires, let the host's internal state
//! settle, then read the now-consistent state.
//!
//! The scoped helpers ([`load_file`](SyncEngine::load_file),
//! [`execute_dialog_through_command`](SyncEngine::execute_dialog_through_command),
//! [`execute_blocking_action`](SyncEngine::execute_blocking_action), ...)
//! additionally pair resource acquisition with guaranteed teardown: the
//! document is closed, the dialog dismissed, and any worker thread joined on
//! every exit path, including a failure reported by the caller-supplied
//! scenario. The scenario's failure always propagates unchanged after
//! cleanup.
//!
//! Waits are unbounded by default; the outer test framework owns timeout
//! policy. [`EngineConfig::deadline`] bounds them when a caller wants that.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use uisync_core::bus::EventBus;
//! use uisync_core::engine::{DialogOptions, SyncEngine};
//! use uisync_core::host::UiHost;
//!
//! # async fn example(host: Arc<dyn UiHost>) -> Result<(), uisync_core::engine::EngineError> {
//! let bus = Arc::new(EventBus::new());
//! let engine = SyncEngine::new(host, Arc::clone(&bus));
//!
//! engine
//!     .execute_dialog_through_command(".uno:InsertBreak", DialogOptions::default(), |dialog| {
//!         let engine = &engine;
//!         async move {
//!             let _state = engine.host().state(&dialog).await?;
//!             Ok(())
//!         }
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info_span, warn, Instrument};

use crate::bus::{EventBus, EventScope};
use crate::host::{ComponentHandle, ElementHandle, HostError, UiHost};
use crate::poll::{poll_until, PollPolicy, DEFAULT_POLL_INTERVAL};

/// Action name for clicking a widget.
pub const ACTION_CLICK: &str = "CLICK";

/// Event announced when a document finished loading from a URL.
pub const EVENT_ON_LOAD: &str = "OnLoad";
/// Event announced when a new empty document finished opening.
pub const EVENT_ON_NEW: &str = "OnNew";
/// Event announced when a modal dialog is being executed.
pub const EVENT_DIALOG_EXECUTE: &str = "DialogExecute";
/// Event announced when a modeless dialog is being executed.
pub const EVENT_MODELESS_DIALOG_EXECUTE: &str = "ModelessDialogExecute";
/// Event announced when a modeless dialog became visible.
pub const EVENT_MODELESS_DIALOG_VISIBLE: &str = "ModelessDialogVisible";
/// Event announced when a dialog was closed.
pub const EVENT_DIALOG_CLOSED: &str = "DialogClosed";

/// Window identity the host's crash reporter presents itself under.
const CRASH_REPORT_DIALOG_ID: &str = "CrashReportDialog";
/// Cancel button inside the crash-report dialog.
const CRASH_REPORT_CANCEL: &str = "btn_cancel";
/// Child name tried as a fallback when a failed dialog scope has no
/// configured close button.
const CANCEL_BUTTON: &str = "cancel";
/// Default close button for dialog scopes.
const DEFAULT_CLOSE_BUTTON: &str = "ok";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The host rejected a dialog command outright; no event will ever
    /// fire for it.
    #[error("dialog not executed for: {0}")]
    CommandExecution(String),

    /// A host API call failed; propagated unchanged.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A configured deadline elapsed before the awaited condition held.
    #[error("deadline of {0:?} exceeded while waiting")]
    DeadlineExceeded(Duration),

    /// No document component was available after a completed load.
    #[error("no document component available after load")]
    NoComponent,

    /// The worker thread of a blocking action panicked.
    #[error("worker thread failed: {0}")]
    Worker(String),

    /// A failure reported by caller-supplied scenario logic.
    #[error("scenario failed: {0}")]
    Scenario(String),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing configuration for engine waits.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Interval between condition probes.
    pub poll_interval: Duration,

    /// Bound on every wait; `None` waits forever and leaves timeout policy
    /// to the outer test framework.
    pub deadline: Option<Duration>,

    /// Extra sleep after an awaited event fires, before derived state
    /// (frame list, active frame) is read. Compensates for host-internal
    /// asynchrony the notification does not cover.
    pub settle_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
            settle_delay: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Options for dialog-producing scopes.
#[derive(Debug, Clone)]
pub struct DialogOptions {
    /// Event names that announce the dialog; any one of them completes the
    /// wait.
    pub event_names: Vec<String>,

    /// Child name clicked to close the dialog during cleanup. `None` leaves
    /// the dialog open on success and tries a `cancel` child on failure,
    /// which is useful when consecutive dialogs open one after another.
    pub close_button: Option<String>,

    /// Log every event observed on the bus while the scope is attached.
    pub log_all: bool,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            event_names: vec![EVENT_DIALOG_EXECUTE.to_string()],
            close_button: Some(DEFAULT_CLOSE_BUTTON.to_string()),
            log_all: false,
        }
    }
}

impl DialogOptions {
    /// Options for a modeless dialog, announced via
    /// [`EVENT_MODELESS_DIALOG_VISIBLE`].
    pub fn modeless() -> Self {
        Self {
            event_names: vec![EVENT_MODELESS_DIALOG_VISIBLE.to_string()],
            ..Self::default()
        }
    }

    /// Options for a dialog opened by a blocking call, which the host may
    /// announce through any of the dialog-visible event family.
    pub fn blocking() -> Self {
        Self {
            event_names: vec![
                EVENT_DIALOG_EXECUTE.to_string(),
                EVENT_MODELESS_DIALOG_EXECUTE.to_string(),
                EVENT_MODELESS_DIALOG_VISIBLE.to_string(),
            ],
            ..Self::default()
        }
    }

    /// Replaces the event names announcing the dialog.
    pub fn with_event(mut self, event_name: impl Into<String>) -> Self {
        self.event_names = vec![event_name.into()];
        self
    }

    /// Replaces the close button clicked during cleanup.
    pub fn with_close_button(mut self, name: impl Into<String>) -> Self {
        self.close_button = Some(name.into());
        self
    }

    /// Leaves the dialog open during cleanup (cancel fallback still applies
    /// on failure where the helper supports it).
    pub fn without_close_button(mut self) -> Self {
        self.close_button = None;
        self
    }

    /// Enables logging of every event observed while the scope is attached.
    pub fn with_log_all(mut self, log_all: bool) -> Self {
        self.log_all = log_all;
        self
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Orchestration engine over a [`UiHost`] and an [`EventBus`].
///
/// Cheap to construct; holds only shared handles and a copy of the timing
/// configuration.
pub struct SyncEngine {
    host: Arc<dyn UiHost>,
    bus: Arc<EventBus>,
    config: EngineConfig,
}

impl SyncEngine {
    /// Creates an engine with the default [`EngineConfig`].
    pub fn new(host: Arc<dyn UiHost>, bus: Arc<EventBus>) -> Self {
        Self::with_config(host, bus, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(host: Arc<dyn UiHost>, bus: Arc<EventBus>, config: EngineConfig) -> Self {
        Self { host, bus, config }
    }

    /// The host backend this engine drives.
    pub fn host(&self) -> &Arc<dyn UiHost> {
        &self.host
    }

    /// The notification bus this engine waits on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The timing configuration.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.config.poll_interval,
            deadline: self.config.deadline,
        }
    }

    fn deadline_exceeded(&self) -> EngineError {
        EngineError::DeadlineExceeded(self.config.deadline.unwrap_or(Duration::ZERO))
    }

    // -----------------------------------------------------------------------
    // Polling primitives
    // -----------------------------------------------------------------------

    /// Waits until the focused top-level window identifies as `id` and
    /// returns its handle.
    ///
    /// The focused window is re-queried fresh on every probe; it can change
    /// between polls (e.g. crash-reporter interposition), so the handle is
    /// never cached across iterations.
    pub async fn wait_for_top_focus_window(&self, id: &str) -> Result<ElementHandle, EngineError> {
        let host = &self.host;
        let matched = poll_until(self.policy(), move || async move {
            let window = host.top_focus_window().await?;
            let state = host.state(&window).await?;
            Ok::<_, EngineError>((state.id() == Some(id)).then_some(window))
        })
        .await?;
        matched.ok_or_else(|| self.deadline_exceeded())
    }

    /// Waits until the focused top-level window has a child named `name`
    /// and returns the child's handle.
    pub async fn wait_for_child(&self, name: &str) -> Result<ElementHandle, EngineError> {
        let host = &self.host;
        let matched = poll_until(self.policy(), move || async move {
            let window = host.top_focus_window().await?;
            if host.has_child(&window, name).await? {
                let child = host.child(&window, name).await?;
                Ok::<_, EngineError>(Some(child))
            } else {
                Ok(None)
            }
        })
        .await?;
        matched.ok_or_else(|| self.deadline_exceeded())
    }

    /// Waits until a fresh snapshot of `element` reports
    /// `property == value`.
    ///
    /// A property that already holds is observed on the first probe, with
    /// zero sleeps.
    pub async fn wait_for_property(
        &self,
        element: &ElementHandle,
        property: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        let host = &self.host;
        let matched = poll_until(self.policy(), move || async move {
            let state = host.state(element).await?;
            Ok::<_, EngineError>((state.get(property) == Some(value)).then_some(()))
        })
        .await?;
        matched.ok_or_else(|| self.deadline_exceeded())
    }

    /// Waits until any event subscribed by `scope` has fired.
    async fn wait_for_event(&self, scope: &EventScope) -> Result<(), EngineError> {
        let fired = poll_until(self.policy(), move || {
            let fired = scope.fired();
            async move { Ok::<_, EngineError>(fired.then_some(())) }
        })
        .await?;
        fired.ok_or_else(|| self.deadline_exceeded())
    }

    // -----------------------------------------------------------------------
    // Document lifecycle
    // -----------------------------------------------------------------------

    /// Loads a component from `url`, waits for `event_name` to announce the
    /// completed load, and activates the newest frame.
    pub async fn load_component_from_url(
        &self,
        url: &str,
        event_name: &str,
    ) -> Result<ComponentHandle, EngineError> {
        let span = info_span!("load_component", url, event = event_name);
        async {
            let scope = self.bus.subscribe([event_name], false);
            let component = self.host.load_component_from_url(url).await?;
            self.wait_for_event(&scope).await?;
            // Let the host's frame bookkeeping settle before reading it.
            sleep(self.config.settle_delay).await;
            self.activate_newest_frame().await?;
            debug!(component = component.id(), "component loaded");
            Ok(component)
        }
        .instrument(span)
        .await
    }

    /// Runs a trigger that is expected to cause a document load (e.g.
    /// confirming a file picker), waits for the load to be announced, and
    /// activates the newest frame.
    ///
    /// The [`EVENT_ON_LOAD`] subscription is opened before `trigger` runs,
    /// so a load that completes while the trigger is still executing is not
    /// missed. A trigger failure propagates unchanged without waiting.
    pub async fn wait_until_component_loaded<T, F, Fut>(
        &self,
        trigger: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let scope = self.bus.subscribe([EVENT_ON_LOAD], false);
        let value = trigger().await?;
        self.wait_for_event(&scope).await?;
        sleep(self.config.settle_delay).await;
        self.activate_newest_frame().await?;
        Ok(value)
    }

    /// Loads the document at `url`, runs `scenario` on it, and closes the
    /// document on every exit path. A scenario failure propagates unchanged
    /// after the close.
    pub async fn load_file<T, F, Fut>(&self, url: &str, scenario: F) -> Result<T, EngineError>
    where
        F: FnOnce(ComponentHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let component = self.load_component_from_url(url, EVENT_ON_LOAD).await?;
        self.run_with_doc(component, scenario).await
    }

    /// Creates an empty document of the given application kind (e.g.
    /// `"writer"` loads `private:factory/swriter`), runs `scenario` on it,
    /// and closes the document on every exit path.
    pub async fn load_empty_file<T, F, Fut>(&self, app: &str, scenario: F) -> Result<T, EngineError>
    where
        F: FnOnce(ComponentHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let url = format!("private:factory/s{app}");
        let component = self.load_component_from_url(&url, EVENT_ON_NEW).await?;
        self.run_with_doc(component, scenario).await
    }

    /// Creates a document by clicking the `{app}_all` button in the focused
    /// start center, runs `scenario` on the new document's component, and
    /// closes the document on every exit path.
    ///
    /// Tolerates the host presenting a crash-report dialog instead of the
    /// start center: the dialog is cancelled and the button lookup retried
    /// exactly once. Any other unexpected window state propagates the
    /// original lookup failure. One-shot recovery, not a retry loop.
    pub async fn create_doc_in_start_center<T, F, Fut>(
        &self,
        app: &str,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ComponentHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let button = self.find_start_center_button(app).await?;

        let scope = self.bus.subscribe([EVENT_ON_NEW], false);
        self.host.execute_action(&button, ACTION_CLICK, &[]).await?;
        self.wait_for_event(&scope).await?;
        sleep(self.config.settle_delay).await;
        self.activate_newest_frame().await?;

        let component = self
            .host
            .components()
            .await?
            .into_iter()
            .next()
            .ok_or(EngineError::NoComponent)?;
        self.run_with_doc(component, scenario).await
    }

    /// Closes the active document.
    ///
    /// Disposes the active frame's component, then activates the first
    /// remaining frame. "No active frame" and "frame has no component" are
    /// logged no-ops: the caller may legitimately have closed the document
    /// already.
    pub async fn close_doc(&self) -> Result<(), EngineError> {
        let Some(frame) = self.host.active_frame().await? else {
            debug!("close_doc: no active frame");
            return Ok(());
        };
        let Some(component) = self.host.frame_component(&frame).await? else {
            debug!("close_doc: active frame has no component");
            return Ok(());
        };
        self.host.dispose_component(&component).await?;

        let frames = self.host.frames().await?;
        if let Some(first) = frames.first() {
            self.host.activate_frame(first).await?;
        }
        Ok(())
    }

    /// Runs a document scenario and guarantees [`close_doc`](Self::close_doc)
    /// on exit. The scenario's failure wins over a cleanup failure.
    async fn run_with_doc<T, F, Fut>(
        &self,
        component: ComponentHandle,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ComponentHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let outcome = scenario(component).await;
        let closed = self.close_doc().await;
        match outcome {
            Ok(value) => {
                closed?;
                Ok(value)
            }
            Err(err) => {
                if let Err(cleanup_err) = closed {
                    warn!(error = %cleanup_err, "closing the document after a failed scenario also failed");
                }
                Err(err)
            }
        }
    }

    /// Marks the newest frame (last of the frame sequence) active.
    async fn activate_newest_frame(&self) -> Result<(), EngineError> {
        let frames = self.host.frames().await?;
        if let Some(newest) = frames.last() {
            self.host.set_active_frame(newest).await?;
        }
        Ok(())
    }

    async fn find_start_center_button(&self, app: &str) -> Result<ElementHandle, EngineError> {
        let name = format!("{app}_all");
        let start_center = self.host.top_focus_window().await?;
        match self.host.child(&start_center, &name).await {
            Ok(button) => Ok(button),
            Err(lookup_err) => {
                if self.dismiss_crash_reporter().await? {
                    let window = self.host.top_focus_window().await?;
                    Ok(self.host.child(&window, &name).await?)
                } else {
                    Err(lookup_err.into())
                }
            }
        }
    }

    /// Checks whether the focused window is the crash-report dialog and
    /// cancels it if so. Returns whether a dialog was dismissed.
    async fn dismiss_crash_reporter(&self) -> Result<bool, EngineError> {
        let window = self.host.top_focus_window().await?;
        let state = self.host.state(&window).await?;
        if state.id() != Some(CRASH_REPORT_DIALOG_ID) {
            return Ok(false);
        }
        warn!("crash-report dialog interposed; cancelling it");
        let cancel = self.host.child(&window, CRASH_REPORT_CANCEL).await?;
        self.close_dialog_through_button(&cancel).await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Dialog lifecycle
    // -----------------------------------------------------------------------

    /// Executes a dialog-opening command, waits for the dialog to be
    /// announced, runs `scenario` on the focused dialog, and dismisses the
    /// dialog per `options` on every exit path.
    ///
    /// Fails with [`EngineError::CommandExecution`] before any wait when the
    /// host rejects the command: the event would never fire.
    pub async fn execute_dialog_through_command<T, F, Fut>(
        &self,
        command: &str,
        options: DialogOptions,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ElementHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let scope = self.bus.subscribe(options.event_names.clone(), options.log_all);
        if !self.host.execute_dialog(command).await? {
            return Err(EngineError::CommandExecution(command.to_string()));
        }
        self.wait_for_event(&scope).await?;
        let dialog = self.host.top_focus_window().await?;
        self.run_with_dialog(dialog, &options, true, scenario).await
    }

    /// Like [`execute_dialog_through_command`](Self::execute_dialog_through_command)
    /// for modeless dialogs, which the host announces via
    /// [`EVENT_MODELESS_DIALOG_VISIBLE`].
    pub async fn execute_modeless_dialog_through_command<T, F, Fut>(
        &self,
        command: &str,
        options: DialogOptions,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ElementHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let options = options.with_event(EVENT_MODELESS_DIALOG_VISIBLE);
        self.execute_dialog_through_command(command, options, scenario)
            .await
    }

    /// Opens a dialog by invoking `action` on `element`, waits for it to be
    /// announced, runs `scenario` on the focused dialog, and clicks the
    /// configured close button on every exit path.
    pub async fn execute_dialog_through_action<T, F, Fut>(
        &self,
        element: &ElementHandle,
        action: &str,
        args: &[String],
        options: DialogOptions,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ElementHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let scope = self.bus.subscribe(options.event_names.clone(), options.log_all);
        self.host.execute_action(element, action, args).await?;
        self.wait_for_event(&scope).await?;
        let dialog = self.host.top_focus_window().await?;
        self.run_with_dialog(dialog, &options, false, scenario).await
    }

    /// Clicks a button that closes a dialog and waits for the
    /// [`EVENT_DIALOG_CLOSED`] notification, followed by the settle delay.
    pub async fn close_dialog_through_button(
        &self,
        button: &ElementHandle,
    ) -> Result<(), EngineError> {
        let scope = self.bus.subscribe([EVENT_DIALOG_CLOSED], false);
        self.host.execute_action(button, ACTION_CLICK, &[]).await?;
        self.wait_for_event(&scope).await?;
        sleep(self.config.settle_delay).await;
        Ok(())
    }

    /// Runs a dialog scenario and guarantees dismissal on exit.
    ///
    /// A configured close button is clicked exactly once, success or
    /// failure. With no close button and a failed scenario, a `cancel`
    /// child is clicked if present (only where `cancel_fallback` applies).
    /// The scenario's failure wins over a cleanup failure.
    async fn run_with_dialog<T, F, Fut>(
        &self,
        dialog: ElementHandle,
        options: &DialogOptions,
        cancel_fallback: bool,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ElementHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let outcome = scenario(dialog.clone()).await;
        let dismissed = self
            .dismiss_dialog(&dialog, options, cancel_fallback && outcome.is_err())
            .await;
        match outcome {
            Ok(value) => {
                dismissed?;
                Ok(value)
            }
            Err(err) => {
                if let Err(cleanup_err) = dismissed {
                    warn!(error = %cleanup_err, "dismissing the dialog after a failed scenario also failed");
                }
                Err(err)
            }
        }
    }

    async fn dismiss_dialog(
        &self,
        dialog: &ElementHandle,
        options: &DialogOptions,
        try_cancel: bool,
    ) -> Result<(), EngineError> {
        if let Some(name) = &options.close_button {
            let button = self.host.child(dialog, name).await?;
            self.close_dialog_through_button(&button).await
        } else if try_cancel && self.host.has_child(dialog, CANCEL_BUTTON).await? {
            let cancel = self.host.child(dialog, CANCEL_BUTTON).await?;
            self.close_dialog_through_button(&cancel).await
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Blocking actions
    // -----------------------------------------------------------------------

    /// Executes an action that blocks while a dialog is shown.
    ///
    /// `action` runs on a worker thread and is expected to block until the
    /// dialog it provokes is closed again. The engine waits for the dialog
    /// to be announced (use [`DialogOptions::blocking`] for the full
    /// dialog-visible event family), runs `scenario` on it, dismisses it per
    /// `options`, and then joins the worker unconditionally, so the scope
    /// never returns while the worker is still running.
    ///
    /// A worker panic surfaces as [`EngineError::Worker`] only when the
    /// scenario itself succeeded; a scenario failure propagates unchanged.
    ///
    /// Note that the join is unconditional even when the dialog scope
    /// fails before the dialog was dismissed, e.g. on a configured
    /// [`EngineConfig::deadline`]. A worker that only unblocks once its
    /// dialog is closed will then keep this call waiting past the
    /// deadline. `action` must be written to terminate on its own in that
    /// situation.
    pub async fn execute_blocking_action<A, T, F, Fut>(
        &self,
        action: A,
        options: DialogOptions,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        A: FnOnce() + Send + 'static,
        F: FnOnce(ElementHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let scope = self.bus.subscribe(options.event_names.clone(), options.log_all);
        let worker = tokio::task::spawn_blocking(action);

        let outcome = self.blocking_dialog_scope(&scope, &options, scenario).await;

        // The worker must be gone before this scope returns, whether the
        // dialog scope succeeded or not.
        let joined = worker.await;
        match outcome {
            Err(err) => Err(err),
            Ok(value) => match joined {
                Ok(()) => Ok(value),
                Err(join_err) => Err(EngineError::Worker(join_err.to_string())),
            },
        }
    }

    async fn blocking_dialog_scope<T, F, Fut>(
        &self,
        scope: &EventScope,
        options: &DialogOptions,
        scenario: F,
    ) -> Result<T, EngineError>
    where
        F: FnOnce(ElementHandle) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        self.wait_for_event(scope).await?;
        let dialog = self.host.top_focus_window().await?;
        self.run_with_dialog(dialog, options, true, scenario).await
    }
}
