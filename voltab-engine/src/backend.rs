//! Abstraction over the external audio server
//!
//! The server is a black-box collaborator: it owns the authoritative set of
//! audio objects and pushes "object appeared / object disappeared"
//! notifications through a registry. This module defines the seam the engine
//! drives it through, so the connection chain and event processing can be
//! exercised against a mock server in tests while production wires in the
//! real protocol library.
//!
//! Resource dependency order, which the connection chain enforces:
//!
//! ```text
//! loop handle → protocol context → server connection → registry → listener
//! ```

use std::os::fd::BorrowedFd;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::device::GlobalObject;
use crate::error::BackendError;

/// The server's event-waiting handle, embedded into the host loop
///
/// The handle is level-readable whenever the server has queued events for
/// this client. Dispatching them is explicitly non-blocking: one `iterate`
/// drains what is currently queued and returns, never waiting for more.
pub trait LoopHandle {
    /// The descriptor the host loop should poll for readability
    fn pollable(&self) -> BorrowedFd<'_>;

    /// Dispatch all currently queued server events without blocking
    ///
    /// Returns the number of events dispatched. Registry callbacks fire
    /// synchronously from inside this call, on the calling thread.
    fn iterate(&self) -> std::result::Result<usize, BackendError>;
}

/// Callbacks a registry listener delivers during a drain
///
/// Both entry points are invoked only from within a [`LoopHandle::iterate`]
/// call, never concurrently and never re-entrantly.
pub trait RegistryHandler {
    /// A new object was announced by the server
    fn object_appeared(&self, object: &GlobalObject);

    /// A previously announced object is gone; its id may be reassigned later
    fn object_disappeared(&self, id: u32);
}

/// Factory for the five connection-chain resources
///
/// Each method acquires exactly one resource and may only be called with the
/// resources it depends on already alive. Implementations report failures as
/// [`BackendError`] with the server's raw result code; the connection chain
/// translates those into fatal bring-up errors.
pub trait ServerBackend {
    /// Event loop handle, the root of the resource chain
    type Loop: LoopHandle;
    /// Protocol context bound to the loop
    type Context;
    /// Live connection to the server
    type Connection;
    /// Handle onto the server's object registry
    type Registry;
    /// Registered listener hook; dropping it detaches the callbacks
    type Listener;

    /// Create the event loop handle
    fn create_loop(&mut self, config: &EngineConfig) -> Result<Self::Loop, BackendError>;

    /// Create a protocol context on the loop
    fn create_context(&mut self, main_loop: &Self::Loop) -> Result<Self::Context, BackendError>;

    /// Connect to the server (honoring `config.remote` passed at loop creation)
    fn connect(&mut self, context: &Self::Context) -> Result<Self::Connection, BackendError>;

    /// Bind the object registry of a live connection
    fn bind_registry(&mut self, connection: &Self::Connection)
        -> Result<Self::Registry, BackendError>;

    /// Attach registry callbacks; events start flowing on the next drain
    fn add_listener(
        &mut self,
        registry: &Self::Registry,
        handler: Rc<dyn RegistryHandler>,
    ) -> Result<Self::Listener, BackendError>;
}
