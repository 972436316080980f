//! voltab engine — audio device registry synchronization
//!
//! Keeps a settings panel's view of audio devices in sync with the external
//! audio server. The server pushes "object appeared / object disappeared"
//! notifications through its registry; this crate bridges that stream into
//! the host application's single-threaded cooperative event loop, classifies
//! audio-capable objects, and fans lifecycle events out to registered
//! consumers.
//!
//! # Architecture
//!
//! ```text
//! audio server → EventSourceBridge → RegistryEventProcessor → ObserverRegistry → consumers
//!                  (wake + drain)        (classify)              (fan-out)
//! ```
//!
//! The connection itself is an ordered chain of five dependent resources
//! (loop handle → context → connection → registry → listener) owned by
//! [`ConnectionChain`] and torn down in exact reverse order.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use voltab_engine::{AudioRegistry, EngineConfig};
//!
//! let engine = AudioRegistry::connect(backend, EngineConfig::default())?;
//! engine.add_observer(mirror.clone());
//!
//! // Hand the bridge to the host loop: poll `pollable()`, call `drain()`
//! // whenever it reports readable.
//! let bridge = engine.bridge();
//! host_loop.watch_readable(bridge.pollable(), move || { bridge.drain(); });
//! ```
//!
//! # Concurrency
//!
//! Strictly single-threaded cooperative: all protocol progress happens
//! inside the host's dispatch callback, on the thread that owns the UI.
//! Nothing blocks, nothing locks; a multi-threaded extension would need
//! explicit synchronization around consumers and is out of scope.

pub mod backend;
pub mod bridge;
pub mod chain;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod observers;
pub mod processor;

mod engine;

// Mock server backend, for this crate's tests and downstream test suites
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use backend::{LoopHandle, RegistryHandler, ServerBackend};
pub use bridge::EventSourceBridge;
pub use chain::{ConnectionChain, LifecycleState};
pub use config::EngineConfig;
pub use device::{keys, DeviceId, DeviceKind, GlobalObject};
pub use engine::AudioRegistry;
pub use error::{BackendError, EngineError, Result};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use observers::{DeviceObserver, ObserverRegistry};
pub use processor::RegistryEventProcessor;
