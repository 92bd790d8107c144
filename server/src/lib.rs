//! Host for the Sacred Recitations notification worker.
//!
//! Serves pages over HTTP/WebSocket, provides the worker's platform (window
//! clients, notification tray, cache storage, durable schedule) and routes
//! platform events into it.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod events;
pub mod platform;
pub mod server;
pub mod shutdown;

pub use bootstrap::{init_foundation, start_worker};
