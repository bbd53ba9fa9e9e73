//! # uisync-core
//!
//! Synchronization layer for driving a host application's asynchronous UI
//! from test code without races.
//!
//! UI actions on the host (open a document, show a dialog, click a button)
//! are fire-and-forget: their effects become observable only some
//! indeterminate time later, through polled state queries or named event
//! notifications. This crate provides the primitives that bridge that gap:
//!
//! - [`bus`] - Scoped subscriptions to the host's named event notifications
//! - [`poll`] - The fixed-interval polling combinator behind every wait
//! - [`host`] - The abstract host-application API the engine drives
//! - [`engine`] - The wait/orchestration engine: polling primitives and
//!   scoped document/dialog lifecycle helpers with guaranteed cleanup
//!
//! The host automation backend and the notification source are external
//! collaborators: backends implement [`host::UiHost`] and deliver events
//! into a [`bus::EventBus`]; everything else is transport-agnostic.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use uisync_core::bus::EventBus;
//! use uisync_core::engine::SyncEngine;
//! use uisync_core::host::UiHost;
//!
//! # async fn example(host: Arc<dyn UiHost>) -> Result<(), uisync_core::engine::EngineError> {
//! let bus = Arc::new(EventBus::new());
//! let engine = SyncEngine::new(host, Arc::clone(&bus));
//!
//! // Open a document, operate on it, and close it on every exit path.
//! engine
//!     .load_file("file:///tmp/hello.odt", |component| async move {
//!         let _ = component;
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod engine;
pub mod host;
pub mod poll;
