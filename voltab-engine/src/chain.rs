//! Connection lifecycle management
//!
//! The link to the audio server is an ordered chain of five resources, each
//! depending on the previous one's successful creation:
//!
//! ```text
//! loop handle → protocol context → server connection → registry → listener
//! ```
//!
//! The chain is brought up one resource per state transition and torn down
//! in the exact reverse order. Both directions are expressed through scoped
//! ownership: a bring-up failure unwinds the locals acquired so far (locals
//! drop in reverse declaration order), and full teardown is the struct's own
//! drop (fields drop in declaration order). No resource is ever tracked
//! outside the chain.

use std::fmt;
use std::rc::Rc;

use crate::backend::{RegistryHandler, ServerBackend};
use crate::config::EngineConfig;
use crate::error::{BackendError, EngineError, Result};

/// States of the connection lifecycle
///
/// Linear with no cycles: each forward transition acquires exactly one
/// resource. `Failed` is terminal and reachable from any non-terminal state;
/// `Closed` is the only exit from `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing acquired yet
    Uninitialized,
    /// Event loop handle created
    LoopReady,
    /// Protocol context created on the loop
    ContextReady,
    /// Connected to the server
    Connected,
    /// Registry handle bound
    RegistryBound,
    /// Listener attached; events flow on every drain
    Running,
    /// Bring-up failed; partial chain already released
    Failed,
    /// Explicitly torn down
    Closed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::LoopReady => "loop-ready",
            LifecycleState::ContextReady => "context-ready",
            LifecycleState::Connected => "connected",
            LifecycleState::RegistryBound => "registry-bound",
            LifecycleState::Running => "running",
            LifecycleState::Failed => "failed",
            LifecycleState::Closed => "closed",
        };
        write!(f, "{name}")
    }
}

/// The fully constructed resource chain, alive while the engine runs
///
/// Field order is the teardown contract: fields drop in declaration order,
/// so the listener hook is released first and the loop handle last.
pub struct ConnectionChain<B: ServerBackend> {
    _listener: B::Listener,
    _registry: B::Registry,
    _connection: B::Connection,
    _context: B::Context,
    main_loop: B::Loop,
    /// Kept alive until after the loop is released (owns library-level init)
    _backend: B,
    state: LifecycleState,
}

impl<B: ServerBackend> ConnectionChain<B> {
    /// Bring up the full chain, one resource per lifecycle transition
    ///
    /// On failure at any stage the resources acquired so far are released in
    /// reverse order before the error is returned; the caller may try again
    /// with a fresh backend but no retry happens here.
    pub fn establish(
        mut backend: B,
        config: &EngineConfig,
        handler: Rc<dyn RegistryHandler>,
    ) -> Result<Self> {
        let main_loop = backend
            .create_loop(config)
            .map_err(|err| Self::fail(LifecycleState::LoopReady, err))?;
        tracing::debug!(state = %LifecycleState::LoopReady, "connection chain advanced");

        let context = backend
            .create_context(&main_loop)
            .map_err(|err| Self::fail(LifecycleState::ContextReady, err))?;
        tracing::debug!(state = %LifecycleState::ContextReady, "connection chain advanced");

        let connection = backend
            .connect(&context)
            .map_err(|err| Self::fail(LifecycleState::Connected, err))?;
        tracing::debug!(state = %LifecycleState::Connected, "connection chain advanced");

        let registry = backend
            .bind_registry(&connection)
            .map_err(|err| Self::fail(LifecycleState::RegistryBound, err))?;
        tracing::debug!(state = %LifecycleState::RegistryBound, "connection chain advanced");

        let listener = backend
            .add_listener(&registry, handler)
            .map_err(|err| Self::fail(LifecycleState::Running, err))?;
        tracing::debug!(state = %LifecycleState::Running, "connection chain advanced");

        Ok(Self {
            _listener: listener,
            _registry: registry,
            _connection: connection,
            _context: context,
            main_loop,
            _backend: backend,
            state: LifecycleState::Running,
        })
    }

    /// The loop handle the event source bridge drains through
    pub fn main_loop(&self) -> &B::Loop {
        &self.main_loop
    }

    /// Current lifecycle state (`Running` for any live chain)
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Tear the chain down: listener, registry, connection, context, loop
    ///
    /// Release is drop-based and therefore infallible and cannot
    /// early-return; every remaining resource is released even if one
    /// backend misbehaves on the way down.
    pub fn close(mut self) {
        self.state = LifecycleState::Closed;
        // Drop of `self` performs the ordered release.
    }

    fn fail(stage: LifecycleState, source: BackendError) -> EngineError {
        tracing::error!(
            state = %LifecycleState::Failed,
            %stage,
            error = %source,
            "connection bring-up failed; releasing partially constructed chain"
        );
        EngineError::acquire(stage, source)
    }
}

impl<B: ServerBackend> Drop for ConnectionChain<B> {
    fn drop(&mut self) {
        tracing::debug!(
            state = %self.state,
            "releasing connection chain resources in reverse acquisition order"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::GlobalObject;
    use crate::testing::{AuditEvent, MockServer, Resource};

    struct NullHandler;

    impl RegistryHandler for NullHandler {
        fn object_appeared(&self, _object: &GlobalObject) {}
        fn object_disappeared(&self, _id: u32) {}
    }

    fn establish(server: &MockServer) -> Result<ConnectionChain<MockServer>> {
        ConnectionChain::establish(server.clone(), &EngineConfig::default(), Rc::new(NullHandler))
    }

    #[test]
    fn test_acquisition_order() {
        let server = MockServer::new();
        let chain = establish(&server).unwrap();

        assert_eq!(chain.state(), LifecycleState::Running);
        assert_eq!(
            server.audit(),
            vec![
                AuditEvent::Acquired(Resource::Loop),
                AuditEvent::Acquired(Resource::Context),
                AuditEvent::Acquired(Resource::Connection),
                AuditEvent::Acquired(Resource::Registry),
                AuditEvent::Acquired(Resource::Listener),
            ]
        );
    }

    #[test]
    fn test_close_releases_in_reverse_order() {
        let server = MockServer::new();
        let chain = establish(&server).unwrap();

        chain.close();

        let released: Vec<AuditEvent> = server
            .audit()
            .into_iter()
            .filter(|event| matches!(event, AuditEvent::Released(_)))
            .collect();
        assert_eq!(
            released,
            vec![
                AuditEvent::Released(Resource::Listener),
                AuditEvent::Released(Resource::Registry),
                AuditEvent::Released(Resource::Connection),
                AuditEvent::Released(Resource::Context),
                AuditEvent::Released(Resource::Loop),
            ]
        );
    }

    #[test]
    fn test_implicit_drop_matches_close_order() {
        let server = MockServer::new();
        {
            let _chain = establish(&server).unwrap();
        }

        let released: Vec<AuditEvent> = server
            .audit()
            .into_iter()
            .filter(|event| matches!(event, AuditEvent::Released(_)))
            .collect();
        assert_eq!(
            released,
            vec![
                AuditEvent::Released(Resource::Listener),
                AuditEvent::Released(Resource::Registry),
                AuditEvent::Released(Resource::Connection),
                AuditEvent::Released(Resource::Context),
                AuditEvent::Released(Resource::Loop),
            ]
        );
    }

    #[test]
    fn test_connect_failure_unwinds_partial_chain() {
        let server = MockServer::new();
        server.fail_acquisition(Resource::Connection);

        let err = establish(&server).err().expect("bring-up must fail");
        match err {
            EngineError::Acquire { stage, .. } => {
                assert_eq!(stage, LifecycleState::Connected);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Loop and context were acquired, then released in reverse order;
        // nothing past the failure point was ever touched.
        assert_eq!(
            server.audit(),
            vec![
                AuditEvent::Acquired(Resource::Loop),
                AuditEvent::Acquired(Resource::Context),
                AuditEvent::Released(Resource::Context),
                AuditEvent::Released(Resource::Loop),
            ]
        );
    }

    #[test]
    fn test_loop_failure_reports_first_stage() {
        let server = MockServer::new();
        server.fail_acquisition(Resource::Loop);

        let err = establish(&server).err().expect("bring-up must fail");
        match err {
            EngineError::Acquire { stage, .. } => {
                assert_eq!(stage, LifecycleState::LoopReady);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(server.audit().is_empty());
    }

    #[test]
    fn test_remote_name_reaches_backend() {
        let server = MockServer::new();
        let config = EngineConfig::new().with_remote("pipewire-1");
        let _chain =
            ConnectionChain::establish(server.clone(), &config, Rc::new(NullHandler)).unwrap();

        assert_eq!(server.connected_remote().as_deref(), Some("pipewire-1"));
    }
}
