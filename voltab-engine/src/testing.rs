//! Mock audio server backend for tests
//!
//! Stands in for the external server so the connection chain, bridge and
//! event processing can be exercised without a running audio daemon. The
//! mock queues raw registry events and delivers them on `iterate`, injects
//! acquisition and drain failures on demand, and keeps an acquire/release
//! audit trail so tests can assert the exact resource ordering contract.
//!
//! Available to downstream crates through the `test-support` feature.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::UdpSocket;
use std::os::fd::{AsFd, BorrowedFd};
use std::rc::Rc;

use crate::backend::{LoopHandle, RegistryHandler, ServerBackend};
use crate::config::EngineConfig;
use crate::device::{keys, GlobalObject};
use crate::error::BackendError;

/// One of the five connection-chain resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Loop,
    Context,
    Connection,
    Registry,
    Listener,
}

/// Entry in the mock's resource audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    Acquired(Resource),
    Released(Resource),
}

enum QueuedEvent {
    Appeared(GlobalObject),
    Disappeared(u32),
}

struct MockState {
    pending: VecDeque<QueuedEvent>,
    handlers: Vec<Rc<dyn RegistryHandler>>,
    fail_on: Option<Resource>,
    next_drain_error: Option<i32>,
    audit: Vec<AuditEvent>,
    /// Write half for waking the pollable descriptor; set at loop creation
    wake: Option<UdpSocket>,
    /// Remote name captured from the config at loop creation
    remote: Option<String>,
}

impl MockState {
    fn check_acquire(&mut self, resource: Resource) -> Result<(), BackendError> {
        if self.fail_on == Some(resource) {
            return Err(BackendError::new(-5, "injected acquisition failure"));
        }
        self.audit.push(AuditEvent::Acquired(resource));
        Ok(())
    }
}

/// In-process stand-in for the external audio server
///
/// Clones share the same underlying server state, so tests keep one handle
/// for pushing events and inspecting the audit trail while the engine owns
/// another as its backend.
#[derive(Clone)]
pub struct MockServer {
    shared: Rc<RefCell<MockState>>,
}

impl MockServer {
    /// Create a mock server with no queued events
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(MockState {
                pending: VecDeque::new(),
                handlers: Vec::new(),
                fail_on: None,
                next_drain_error: None,
                audit: Vec::new(),
                wake: None,
                remote: None,
            })),
        }
    }

    /// Queue a raw "object appeared" announcement
    pub fn push_appeared(&self, object: GlobalObject) {
        let mut state = self.shared.borrow_mut();
        state.pending.push_back(QueuedEvent::Appeared(object));
        Self::wake(&state);
    }

    /// Queue a node announcement with the given class and name
    pub fn push_device(&self, id: u32, media_class: &str, name: &str) {
        self.push_appeared(
            GlobalObject::new(id, keys::INTERFACE_NODE, 3)
                .with_prop(keys::MEDIA_CLASS, media_class)
                .with_prop(keys::NODE_NAME, name),
        );
    }

    /// Queue an "object disappeared" announcement
    pub fn push_disappeared(&self, id: u32) {
        let mut state = self.shared.borrow_mut();
        state.pending.push_back(QueuedEvent::Disappeared(id));
        Self::wake(&state);
    }

    /// Make the next drain fail with the given negative result code
    pub fn inject_drain_error(&self, code: i32) {
        self.shared.borrow_mut().next_drain_error = Some(code);
    }

    /// Make acquisition of the given resource fail during bring-up
    pub fn fail_acquisition(&self, resource: Resource) {
        self.shared.borrow_mut().fail_on = Some(resource);
    }

    /// Snapshot of the acquire/release audit trail, in event order
    pub fn audit(&self) -> Vec<AuditEvent> {
        self.shared.borrow().audit.clone()
    }

    /// Number of events queued but not yet drained
    pub fn pending_events(&self) -> usize {
        self.shared.borrow().pending.len()
    }

    /// Remote name the engine asked to connect to, if bring-up ran
    pub fn connected_remote(&self) -> Option<String> {
        self.shared.borrow().remote.clone()
    }

    fn wake(state: &MockState) {
        if let Some(wake) = &state.wake {
            // Self-addressed datagram; makes the pollable handle readable.
            let _ = wake.send(&[1]);
        }
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock event loop handle with a genuinely pollable descriptor
pub struct MockLoop {
    shared: Rc<RefCell<MockState>>,
    socket: UdpSocket,
}

impl LoopHandle for MockLoop {
    fn pollable(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }

    fn iterate(&self) -> Result<usize, BackendError> {
        // Consume wake datagrams so the descriptor goes quiet again.
        let mut buf = [0u8; 8];
        while self.socket.recv(&mut buf).is_ok() {}

        if let Some(code) = self.shared.borrow_mut().next_drain_error.take() {
            return Err(BackendError::new(code, "injected drain failure"));
        }

        let mut dispatched = 0;
        loop {
            // Pop one event at a time and release the borrow before
            // dispatching, so handlers may queue follow-up events.
            let (event, handlers) = {
                let mut state = self.shared.borrow_mut();
                match state.pending.pop_front() {
                    Some(event) => (event, state.handlers.clone()),
                    None => break,
                }
            };

            for handler in &handlers {
                match &event {
                    QueuedEvent::Appeared(object) => handler.object_appeared(object),
                    QueuedEvent::Disappeared(id) => handler.object_disappeared(*id),
                }
            }
            dispatched += 1;
        }

        Ok(dispatched)
    }
}

impl Drop for MockLoop {
    fn drop(&mut self) {
        let mut state = self.shared.borrow_mut();
        state.wake = None;
        state.audit.push(AuditEvent::Released(Resource::Loop));
    }
}

macro_rules! mock_resource {
    ($name:ident, $resource:expr) => {
        pub struct $name {
            shared: Rc<RefCell<MockState>>,
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.shared
                    .borrow_mut()
                    .audit
                    .push(AuditEvent::Released($resource));
            }
        }
    };
}

mock_resource!(MockContext, Resource::Context);
mock_resource!(MockConnection, Resource::Connection);
mock_resource!(MockRegistry, Resource::Registry);

/// Listener hook; dropping it detaches the registered callbacks
pub struct MockListener {
    shared: Rc<RefCell<MockState>>,
}

impl Drop for MockListener {
    fn drop(&mut self) {
        let mut state = self.shared.borrow_mut();
        state.handlers.clear();
        state.audit.push(AuditEvent::Released(Resource::Listener));
    }
}

impl ServerBackend for MockServer {
    type Loop = MockLoop;
    type Context = MockContext;
    type Connection = MockConnection;
    type Registry = MockRegistry;
    type Listener = MockListener;

    fn create_loop(&mut self, config: &EngineConfig) -> Result<Self::Loop, BackendError> {
        self.shared.borrow_mut().check_acquire(Resource::Loop)?;

        let socket = UdpSocket::bind("127.0.0.1:0")
            .map_err(|err| BackendError::new(-5, format!("mock wake socket: {err}")))?;
        let addr = socket
            .local_addr()
            .map_err(|err| BackendError::new(-5, format!("mock wake socket: {err}")))?;
        socket
            .connect(addr)
            .map_err(|err| BackendError::new(-5, format!("mock wake socket: {err}")))?;
        socket
            .set_nonblocking(true)
            .map_err(|err| BackendError::new(-5, format!("mock wake socket: {err}")))?;
        let wake = socket
            .try_clone()
            .map_err(|err| BackendError::new(-5, format!("mock wake socket: {err}")))?;

        let mut state = self.shared.borrow_mut();
        state.wake = Some(wake);
        state.remote = config.remote.clone();

        Ok(MockLoop {
            shared: Rc::clone(&self.shared),
            socket,
        })
    }

    fn create_context(&mut self, _main_loop: &Self::Loop) -> Result<Self::Context, BackendError> {
        self.shared.borrow_mut().check_acquire(Resource::Context)?;
        Ok(MockContext {
            shared: Rc::clone(&self.shared),
        })
    }

    fn connect(&mut self, _context: &Self::Context) -> Result<Self::Connection, BackendError> {
        self.shared.borrow_mut().check_acquire(Resource::Connection)?;
        Ok(MockConnection {
            shared: Rc::clone(&self.shared),
        })
    }

    fn bind_registry(
        &mut self,
        _connection: &Self::Connection,
    ) -> Result<Self::Registry, BackendError> {
        self.shared.borrow_mut().check_acquire(Resource::Registry)?;
        Ok(MockRegistry {
            shared: Rc::clone(&self.shared),
        })
    }

    fn add_listener(
        &mut self,
        _registry: &Self::Registry,
        handler: Rc<dyn RegistryHandler>,
    ) -> Result<Self::Listener, BackendError> {
        let mut state = self.shared.borrow_mut();
        state.check_acquire(Resource::Listener)?;
        state.handlers.push(handler);
        Ok(MockListener {
            shared: Rc::clone(&self.shared),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler {
        seen: Rc<RefCell<Vec<u32>>>,
    }

    impl RegistryHandler for CountingHandler {
        fn object_appeared(&self, object: &GlobalObject) {
            self.seen.borrow_mut().push(object.id);
        }

        fn object_disappeared(&self, id: u32) {
            self.seen.borrow_mut().push(id);
        }
    }

    #[test]
    fn test_iterate_dispatches_in_emission_order() {
        let mut server = MockServer::new();
        let main_loop = server.create_loop(&EngineConfig::default()).unwrap();
        let context = server.create_context(&main_loop).unwrap();
        let connection = server.connect(&context).unwrap();
        let registry = server.bind_registry(&connection).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _listener = server
            .add_listener(
                &registry,
                Rc::new(CountingHandler {
                    seen: Rc::clone(&seen),
                }),
            )
            .unwrap();

        server.push_device(1, "Audio/Sink", "a");
        server.push_device(2, "Audio/Source", "b");
        server.push_disappeared(1);

        assert_eq!(main_loop.iterate().unwrap(), 3);
        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
        assert_eq!(server.pending_events(), 0);

        // A second drain finds nothing queued.
        assert_eq!(main_loop.iterate().unwrap(), 0);
    }

    #[test]
    fn test_injected_drain_error_is_one_shot() {
        let mut server = MockServer::new();
        let main_loop = server.create_loop(&EngineConfig::default()).unwrap();

        server.inject_drain_error(-32);
        let err = main_loop.iterate().unwrap_err();
        assert_eq!(err.code, -32);

        assert!(main_loop.iterate().is_ok());
    }

    #[test]
    fn test_wake_socket_signals_readable() {
        let mut server = MockServer::new();
        let main_loop = server.create_loop(&EngineConfig::default()).unwrap();

        server.push_device(1, "Audio/Sink", "a");

        // The wake datagram is waiting on the pollable descriptor.
        let mut buf = [0u8; 8];
        assert!(main_loop.socket.recv(&mut buf).is_ok());
    }
}
