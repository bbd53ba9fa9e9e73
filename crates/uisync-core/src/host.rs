//! Host application API surface for backend-agnostic UI synchronization.
//!
//! This module defines the [`UiHost`] trait, the abstract contract the engine
//! needs from the host application's automation layer: focused-window lookup,
//! child-widget access, action execution, frame/component enumeration, and
//! state introspection. Concrete backends (an IPC bridge into a real
//! application, or an in-process fake for tests) implement this trait; the
//! engine never sees the transport.
//!
//! Handles returned by the host are opaque tokens. The engine treats them as
//! point-in-time references and re-queries the host rather than caching them
//! across waits, because the focused window and frame list can change at any
//! moment.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Property key under which a window reports its identity.
pub const ID_PROPERTY: &str = "ID";

/// Errors reported by a host backend.
///
/// This enum unifies failures from all backends behind a single type, so the
/// engine can handle them uniformly regardless of the underlying transport.
#[derive(Error, Debug)]
pub enum HostError {
    /// The queried state is unavailable, typically because the host is in an
    /// anomalous transitional state (e.g. while an unexpected dialog is
    /// being presented).
    #[error("host state unavailable: {0}")]
    State(String),

    /// A child widget lookup failed.
    #[error("window '{window}' has no child named '{name}'")]
    ChildNotFound {
        /// Identity of the window that was searched.
        window: String,
        /// The child name that was requested.
        name: String,
    },

    /// An action invocation was rejected by the host.
    #[error("action '{action}' failed on element '{element}': {reason}")]
    ActionFailed {
        /// Identity of the target element.
        element: String,
        /// The action name (e.g. "CLICK").
        action: String,
        /// Backend-specific failure description.
        reason: String,
    },

    /// Loading a component from a URL failed outright.
    #[error("failed to load component from '{url}': {reason}")]
    LoadFailed {
        /// The component URL that was requested.
        url: String,
        /// Backend-specific failure description.
        reason: String,
    },

    /// An I/O error occurred while talking to the backend.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque reference to a UI element (a top-level window, a dialog, a button,
/// or any other widget).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Creates a handle from a backend-specific identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The backend-specific identity of this element.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to an open document window.
///
/// Frames are enumerable via [`UiHost::frames`] in creation order; the last
/// element of the sequence is the most recently created frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(String);

impl FrameHandle {
    /// Creates a handle from a backend-specific identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The backend-specific identity of this frame.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to a document model component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentHandle(String);

impl ComponentHandle {
    /// Creates a handle from a backend-specific identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The backend-specific identity of this component.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Immutable key-value snapshot of a UI element's state at a point in time.
///
/// Produced by [`UiHost::state`] and used for all state-based polling
/// (focused-window identity, property convergence). A snapshot is never
/// updated in place; polling always takes a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot(BTreeMap<String, String>);

impl StateSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a property, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the element's identity (the `"ID"` property), if reported.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_PROPERTY)
    }

    /// Adds a property to the snapshot, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Number of properties in the snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot has no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for StateSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Trait for backend-agnostic access to the host application's UI.
///
/// All methods are async so both in-process fakes and remote transports can
/// implement them. Actions are fire-and-forget on the host side: their
/// effects become observable only later, through [`state`](Self::state)
/// polling or through events on the notification bus. The engine layers the
/// wait protocol on top; implementors only report what the host exposes
/// right now.
#[async_trait]
pub trait UiHost: Send + Sync {
    /// Returns the currently focused top-level surface (main window or
    /// dialog).
    ///
    /// May fail with [`HostError::State`] in anomalous states, e.g. while a
    /// crash-report dialog is being presented.
    async fn top_focus_window(&self) -> Result<ElementHandle, HostError>;

    /// Returns the names of the direct children of a window.
    async fn children(&self, window: &ElementHandle) -> Result<Vec<String>, HostError>;

    /// Resolves a child widget of a window by name.
    async fn child(&self, window: &ElementHandle, name: &str) -> Result<ElementHandle, HostError>;

    /// Whether a window currently has a child with the given name.
    ///
    /// The default implementation scans [`children`](Self::children).
    async fn has_child(&self, window: &ElementHandle, name: &str) -> Result<bool, HostError> {
        Ok(self.children(window).await?.iter().any(|c| c == name))
    }

    /// Invokes an action (e.g. `"CLICK"`) on an element. Fire-and-forget:
    /// success means the host accepted the invocation, not that its effects
    /// are visible yet.
    async fn execute_action(
        &self,
        element: &ElementHandle,
        action: &str,
        args: &[String],
    ) -> Result<(), HostError>;

    /// Takes a fresh state snapshot of an element.
    async fn state(&self, element: &ElementHandle) -> Result<StateSnapshot, HostError>;

    /// Returns all open frames, in creation order (newest last).
    async fn frames(&self) -> Result<Vec<FrameHandle>, HostError>;

    /// Returns all open document components.
    async fn components(&self) -> Result<Vec<ComponentHandle>, HostError>;

    /// Returns the frame the host currently treats as active, if any.
    async fn active_frame(&self) -> Result<Option<FrameHandle>, HostError>;

    /// Marks a frame as the active one.
    async fn set_active_frame(&self, frame: &FrameHandle) -> Result<(), HostError>;

    /// Brings a frame to the foreground.
    async fn activate_frame(&self, frame: &FrameHandle) -> Result<(), HostError>;

    /// Returns the document component behind a frame, if it still has one.
    async fn frame_component(
        &self,
        frame: &FrameHandle,
    ) -> Result<Option<ComponentHandle>, HostError>;

    /// Disposes a document component, closing its document.
    async fn dispose_component(&self, component: &ComponentHandle) -> Result<(), HostError>;

    /// Starts loading a component from a URL and returns its handle.
    ///
    /// The load completes asynchronously; completion is announced on the
    /// notification bus (`OnLoad` / `OnNew`).
    async fn load_component_from_url(&self, url: &str) -> Result<ComponentHandle, HostError>;

    /// Asks the host to execute a dialog-opening command.
    ///
    /// Returns `false` when the command is rejected immediately; in that
    /// case no dialog event will ever fire.
    async fn execute_dialog(&self, command: &str) -> Result<bool, HostError>;
}
