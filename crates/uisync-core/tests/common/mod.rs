//! Shared test helpers for uisync-core integration tests.
//!
//! This module provides a scriptable in-memory [`UiHost`] that mimics an
//! office-like host application: a focus stack of windows, a frame list,
//! document components behind frames, and click effects that mutate the fake
//! UI and announce the corresponding events on the bus, exactly the way the
//! real host's fire-and-forget actions behave.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use uisync_core::bus::EventBus;
use uisync_core::engine::{EngineConfig, SyncEngine};
use uisync_core::host::{
    ComponentHandle, ElementHandle, FrameHandle, HostError, StateSnapshot, UiHost,
};

/// Installs a test subscriber once; respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A window in the fake host's focus stack.
#[derive(Debug, Clone)]
pub struct MockWindow {
    pub id: String,
    pub children: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl MockWindow {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            children: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, name: &str) -> Self {
        self.children.push(name.to_string());
        self
    }
}

/// What clicking an element does to the fake host.
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Pop the focused window and announce `event`.
    CloseTopWindow { event: String },
    /// Push `window` onto the focus stack and announce `event`.
    OpenWindow { window: MockWindow, event: String },
    /// Create a frame + component pair and announce `event`.
    CreateDocument { event: String },
}

#[derive(Default)]
struct HostState {
    /// Focus stack; the last entry is the focused top-level window.
    windows: Vec<MockWindow>,
    /// Open frames, creation order (newest last).
    frames: Vec<FrameHandle>,
    active: Option<FrameHandle>,
    /// Frame id -> document component behind it.
    components: BTreeMap<String, ComponentHandle>,
    /// Element id -> properties reported by `state()`.
    element_props: BTreeMap<String, BTreeMap<String, String>>,
    /// Element id -> effect applied when the element is clicked.
    click_effects: BTreeMap<String, ClickEffect>,
    /// Command -> (dialog window, announced event).
    dialog_commands: BTreeMap<String, (MockWindow, String)>,
    next_doc: u32,
    loaded_urls: Vec<String>,
    disposed: Vec<String>,
    activated_frames: Vec<String>,
}

/// Scriptable fake host application.
pub struct MockHost {
    bus: Arc<EventBus>,
    state: Mutex<HostState>,
    clicks: Mutex<Vec<String>>,
    focus_queries: AtomicUsize,
    state_queries: AtomicUsize,
}

impl MockHost {
    pub fn new(bus: Arc<EventBus>) -> Arc<Self> {
        Arc::new(Self {
            bus,
            state: Mutex::new(HostState::default()),
            clicks: Mutex::new(Vec::new()),
            focus_queries: AtomicUsize::new(0),
            state_queries: AtomicUsize::new(0),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- scripting ---------------------------------------------------------

    pub fn push_window(&self, window: MockWindow) {
        self.lock().windows.push(window);
    }

    pub fn set_click_effect(&self, element_id: &str, effect: ClickEffect) {
        self.lock()
            .click_effects
            .insert(element_id.to_string(), effect);
    }

    pub fn register_dialog_command(&self, command: &str, window: MockWindow, event: &str) {
        self.lock()
            .dialog_commands
            .insert(command.to_string(), (window, event.to_string()));
    }

    pub fn set_element_property(&self, element_id: &str, key: &str, value: &str) {
        self.lock()
            .element_props
            .entry(element_id.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Adds a pre-existing frame/component pair, as if a document was
    /// already open before the test step started.
    pub fn add_open_document(&self) -> (FrameHandle, ComponentHandle) {
        let mut state = self.lock();
        Self::create_document_locked(&mut state)
    }

    /// Pushes a dialog window and announces `event`. Callable from a worker
    /// thread; this is how a blocking call's dialog shows up.
    pub fn open_dialog_now(&self, window: MockWindow, event: &str) {
        self.lock().windows.push(window);
        self.bus.publish(event);
    }

    // -- observations ------------------------------------------------------

    pub fn clicks(&self) -> Vec<String> {
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clicks_of(&self, element_id: &str) -> usize {
        self.clicks().iter().filter(|c| c.as_str() == element_id).count()
    }

    pub fn focus_queries(&self) -> usize {
        self.focus_queries.load(Ordering::SeqCst)
    }

    pub fn state_queries(&self) -> usize {
        self.state_queries.load(Ordering::SeqCst)
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.lock().loaded_urls.clone()
    }

    pub fn disposed(&self) -> Vec<String> {
        self.lock().disposed.clone()
    }

    pub fn activated_frames(&self) -> Vec<String> {
        self.lock().activated_frames.clone()
    }

    pub fn focused_window_id(&self) -> Option<String> {
        self.lock().windows.last().map(|w| w.id.clone())
    }

    pub fn open_frames(&self) -> Vec<FrameHandle> {
        self.lock().frames.clone()
    }

    // -- internals ---------------------------------------------------------

    fn create_document_locked(state: &mut HostState) -> (FrameHandle, ComponentHandle) {
        state.next_doc += 1;
        let frame = FrameHandle::new(format!("frame-{}", state.next_doc));
        let component = ComponentHandle::new(format!("doc-{}", state.next_doc));
        state.frames.push(frame.clone());
        state
            .components
            .insert(frame.id().to_string(), component.clone());
        (frame, component)
    }

    fn apply_click_effect(&self, element_id: &str) {
        let effect = self.lock().click_effects.get(element_id).cloned();
        let Some(effect) = effect else { return };
        match effect {
            ClickEffect::CloseTopWindow { event } => {
                self.lock().windows.pop();
                self.bus.publish(&event);
            }
            ClickEffect::OpenWindow { window, event } => {
                self.lock().windows.push(window);
                self.bus.publish(&event);
            }
            ClickEffect::CreateDocument { event } => {
                {
                    let mut state = self.lock();
                    Self::create_document_locked(&mut state);
                }
                self.bus.publish(&event);
            }
        }
    }

    fn window_by_element(state: &HostState, element: &ElementHandle) -> Option<MockWindow> {
        state.windows.iter().find(|w| w.id == element.id()).cloned()
    }
}

#[async_trait]
impl UiHost for MockHost {
    async fn top_focus_window(&self) -> Result<ElementHandle, HostError> {
        self.focus_queries.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .windows
            .last()
            .map(|w| ElementHandle::new(w.id.clone()))
            .ok_or_else(|| HostError::State("no focused window".to_string()))
    }

    async fn children(&self, window: &ElementHandle) -> Result<Vec<String>, HostError> {
        let state = self.lock();
        Self::window_by_element(&state, window)
            .map(|w| w.children)
            .ok_or_else(|| HostError::State(format!("'{}' is not a window", window.id())))
    }

    async fn child(&self, window: &ElementHandle, name: &str) -> Result<ElementHandle, HostError> {
        let state = self.lock();
        let win = Self::window_by_element(&state, window)
            .ok_or_else(|| HostError::State(format!("'{}' is not a window", window.id())))?;
        if win.children.iter().any(|c| c == name) {
            Ok(ElementHandle::new(format!("{}/{}", win.id, name)))
        } else {
            Err(HostError::ChildNotFound {
                window: win.id,
                name: name.to_string(),
            })
        }
    }

    async fn execute_action(
        &self,
        element: &ElementHandle,
        action: &str,
        _args: &[String],
    ) -> Result<(), HostError> {
        if action == "CLICK" {
            self.clicks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(element.id().to_string());
            self.apply_click_effect(element.id());
        }
        Ok(())
    }

    async fn state(&self, element: &ElementHandle) -> Result<StateSnapshot, HostError> {
        self.state_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if let Some(win) = Self::window_by_element(&state, element) {
            let mut snapshot = StateSnapshot::new().with("ID", win.id.clone());
            for (key, value) in &win.properties {
                snapshot = snapshot.with(key.clone(), value.clone());
            }
            return Ok(snapshot);
        }
        let props = state
            .element_props
            .get(element.id())
            .cloned()
            .unwrap_or_default();
        Ok(props.into_iter().collect())
    }

    async fn frames(&self) -> Result<Vec<FrameHandle>, HostError> {
        Ok(self.lock().frames.clone())
    }

    async fn components(&self) -> Result<Vec<ComponentHandle>, HostError> {
        let state = self.lock();
        Ok(state
            .frames
            .iter()
            .filter_map(|f| state.components.get(f.id()).cloned())
            .collect())
    }

    async fn active_frame(&self) -> Result<Option<FrameHandle>, HostError> {
        Ok(self.lock().active.clone())
    }

    async fn set_active_frame(&self, frame: &FrameHandle) -> Result<(), HostError> {
        self.lock().active = Some(frame.clone());
        Ok(())
    }

    async fn activate_frame(&self, frame: &FrameHandle) -> Result<(), HostError> {
        let mut state = self.lock();
        state.activated_frames.push(frame.id().to_string());
        state.active = Some(frame.clone());
        Ok(())
    }

    async fn frame_component(
        &self,
        frame: &FrameHandle,
    ) -> Result<Option<ComponentHandle>, HostError> {
        Ok(self.lock().components.get(frame.id()).cloned())
    }

    async fn dispose_component(&self, component: &ComponentHandle) -> Result<(), HostError> {
        let mut state = self.lock();
        let frame_id = state
            .components
            .iter()
            .find(|(_, c)| c.id() == component.id())
            .map(|(f, _)| f.clone());
        if let Some(frame_id) = frame_id {
            state.components.remove(&frame_id);
            state.frames.retain(|f| f.id() != frame_id);
            if state.active.as_ref().is_some_and(|f| f.id() == frame_id) {
                state.active = None;
            }
        }
        state.disposed.push(component.id().to_string());
        Ok(())
    }

    async fn load_component_from_url(&self, url: &str) -> Result<ComponentHandle, HostError> {
        let component = {
            let mut state = self.lock();
            state.loaded_urls.push(url.to_string());
            let (_, component) = Self::create_document_locked(&mut state);
            component
        };
        // New empty documents announce OnNew, URL loads announce OnLoad.
        if url.starts_with("private:factory/") {
            self.bus.publish("OnNew");
        } else {
            self.bus.publish("OnLoad");
        }
        Ok(component)
    }

    async fn execute_dialog(&self, command: &str) -> Result<bool, HostError> {
        let registered = self.lock().dialog_commands.get(command).cloned();
        match registered {
            Some((window, event)) => {
                self.lock().windows.push(window);
                self.bus.publish(&event);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Engine wired to a fresh bus and mock host, with fast test timings and a
/// safety deadline so a broken wait fails the test instead of hanging it.
pub fn test_engine() -> (SyncEngine, Arc<MockHost>, Arc<EventBus>) {
    init_tracing();
    let bus = Arc::new(EventBus::new());
    let host = MockHost::new(Arc::clone(&bus));
    let engine = SyncEngine::with_config(
        host.clone(),
        Arc::clone(&bus),
        EngineConfig {
            poll_interval: Duration::from_millis(5),
            deadline: Some(Duration::from_secs(5)),
            settle_delay: Duration::from_millis(5),
        },
    );
    (engine, host, bus)
}
