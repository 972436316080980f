//! Bridging the server's event queue into the host event loop
//!
//! The host application runs a single-threaded cooperative dispatcher (the
//! GTK main loop in the settings panel). Rather than spinning a protocol
//! thread, the server's wait handle is registered with that dispatcher and
//! drained in place whenever it becomes readable. The bridge is the adapter
//! for exactly that: one pollable descriptor out, one non-blocking drain in.

use std::os::fd::BorrowedFd;

use crate::backend::LoopHandle;

/// Adapter between the server's event queue and the host dispatcher
///
/// Stateless between drains; borrows the connection chain's loop handle for
/// as long as the host needs it. Typical host wiring:
///
/// ```rust,ignore
/// let bridge = engine.bridge();
/// host_loop.watch_readable(bridge.pollable(), move || {
///     bridge.drain();
/// });
/// ```
pub struct EventSourceBridge<'l, L: LoopHandle> {
    source: &'l L,
}

impl<'l, L: LoopHandle> EventSourceBridge<'l, L> {
    /// Wrap a loop handle for host-loop integration
    pub fn new(source: &'l L) -> Self {
        Self { source }
    }

    /// The descriptor the host loop should poll for readability
    pub fn pollable(&self) -> BorrowedFd<'_> {
        self.source.pollable()
    }

    /// Perform exactly one non-blocking drain of pending server events
    ///
    /// Registry callbacks and observer broadcasts run synchronously inside
    /// this call. Returns the number of events dispatched. Drain failures
    /// are transient: they are logged as warnings and the connection is
    /// assumed still usable, so the return value is simply 0.
    pub fn drain(&self) -> usize {
        match self.source.iterate() {
            Ok(dispatched) => dispatched,
            Err(err) => {
                tracing::warn!(error = %err, "event source drain failed; connection kept");
                0
            }
        }
    }
}
