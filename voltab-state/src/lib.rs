//! voltab state — per-tab device state mirrors
//!
//! Consumers of the registry engine keep their own authoritative cache of
//! currently known devices. [`DeviceMirror`] is that cache: one map per
//! device kind, keyed by server id, fed entirely by observer callbacks and
//! queried by the owning tab when it refreshes its widgets.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use voltab_state::DeviceMirror;
//!
//! let mirror = Rc::new(DeviceMirror::new());
//! engine.add_observer(mirror.clone());
//!
//! // After each drain the tab re-renders from the mirror:
//! for (id, record) in mirror.devices(DeviceKind::Sink) {
//!     println!("{id}: {} ({:.0}%)", record.name, record.volume * 100.0);
//! }
//! ```

pub mod mirror;
pub mod record;

pub use mirror::DeviceMirror;
pub use record::DeviceRecord;
