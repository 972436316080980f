//! Engine facade tying the chain, processor and observer registry together
//!
//! This is the surface a settings tab talks to: bring the connection up
//! once, register an observer per consumer, hand the bridge to the host
//! loop, and tear everything down when the tab goes away.

use std::rc::Rc;

use crate::backend::ServerBackend;
use crate::bridge::EventSourceBridge;
use crate::chain::{ConnectionChain, LifecycleState};
use crate::config::EngineConfig;
use crate::device::{DeviceId, DeviceKind};
use crate::error::Result;
use crate::observers::{DeviceObserver, ObserverRegistry};
use crate::processor::RegistryEventProcessor;

/// Live registry synchronization engine
///
/// Owns the connection chain and the observer registry; the registry event
/// processor sits between them as the attached listener. All methods run on
/// the dispatch thread; nothing here blocks.
pub struct AudioRegistry<B: ServerBackend> {
    observers: Rc<ObserverRegistry>,
    chain: ConnectionChain<B>,
}

impl<B: ServerBackend> AudioRegistry<B> {
    /// Bring up the full connection chain and start listening for events
    ///
    /// Fails fatally if any chain resource cannot be acquired; the partial
    /// chain is released before this returns. A tab that gets an error here
    /// should not offer the affected controls at all.
    pub fn connect(backend: B, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let observers = Rc::new(ObserverRegistry::new());
        let processor = Rc::new(RegistryEventProcessor::new(
            Rc::clone(&observers),
            config.fallback_device_name.clone(),
        ));

        let chain = ConnectionChain::establish(backend, &config, processor)?;
        tracing::info!(remote = config.remote.as_deref(), "registry engine running");

        Ok(Self { observers, chain })
    }

    /// Register a consumer; effective for every subsequent broadcast
    pub fn add_observer(&self, observer: Rc<dyn DeviceObserver>) {
        self.observers.add(observer);
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Current lifecycle state of the connection chain
    pub fn state(&self) -> LifecycleState {
        self.chain.state()
    }

    /// The bridge the host loop polls and drains
    pub fn bridge(&self) -> EventSourceBridge<'_, B::Loop> {
        EventSourceBridge::new(self.chain.main_loop())
    }

    /// Ask for a device's volume to be set
    ///
    /// Fire-and-forget: the request is broadcast to observers and picked up
    /// by whichever one fronts the external command-issuing layer. No
    /// synchronous confirmation; a later [`report_volume`](Self::report_volume)
    /// reflects the change once observed.
    pub fn request_volume(&self, kind: DeviceKind, id: DeviceId, volume: f32) {
        tracing::debug!(%kind, %id, volume, "volume set requested");
        self.observers.notify_volume_set_request(kind, id, volume);
    }

    /// Report a volume change observed out-of-band
    ///
    /// Called by the command layer when it learns a device's volume moved;
    /// broadcast so mirrors can refresh their last-known values.
    pub fn report_volume(&self, kind: DeviceKind, id: DeviceId, volume: f32) {
        self.observers.notify_volume_changed(kind, id, volume);
    }

    /// Tear down the connection chain in reverse acquisition order
    ///
    /// Dropping the engine does the same; this spelling exists for call
    /// sites that want the shutdown to read explicitly.
    pub fn close(self) {
        tracing::info!("registry engine shutting down");
        self.chain.close();
    }
}
