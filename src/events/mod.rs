//! Event system for session lifecycle actions.
//!
//! Events are fired from all actions. If no listeners are registered,
//! dispatch is a no-op.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use warden::register_event_listeners;
//! use warden::events::listeners::LoggingListener;
//!
//! fn main() {
//!     // register listeners at startup
//!     register_event_listeners(|registry| {
//!         registry.listen(LoggingListener::new());
//!     });
//! }
//! ```
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait to handle events yourself:
//!
//! ```rust,ignore
//! use warden::events::{Listener, SessionEvent};
//! use async_trait::async_trait;
//!
//! struct MetricsListener;
//!
//! #[async_trait]
//! impl Listener for MetricsListener {
//!     async fn handle(&self, event: &SessionEvent) {
//!         if let SessionEvent::SessionsPruned { disabled, deleted, .. } = event {
//!             // update gauges
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::SessionEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
