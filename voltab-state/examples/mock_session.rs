//! Minimal end-to-end session against the mock server backend
//!
//! Shows the wiring a settings tab performs: bring the engine up, register a
//! mirror, drain the bridge as events arrive, render from the mirror.
//!
//! ```bash
//! cargo run -p voltab-state --example mock_session
//! ```

use std::rc::Rc;

use voltab_engine::testing::MockServer;
use voltab_engine::{AudioRegistry, DeviceKind, EngineConfig, LoggingMode};
use voltab_state::DeviceMirror;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    voltab_engine::init_logging(LoggingMode::Development)?;

    let server = MockServer::new();
    let engine = AudioRegistry::connect(server.clone(), EngineConfig::default())?;

    let mirror = Rc::new(DeviceMirror::new());
    engine.add_observer(mirror.clone());

    // A real host loop would poll `engine.bridge().pollable()` and drain on
    // readiness; here the server is scripted and drained directly.
    server.push_device(40, "Audio/Sink", "Built-in Speakers");
    server.push_device(41, "Audio/Sink", "HDMI Output");
    server.push_device(50, "Audio/Source", "Internal Mic");
    engine.bridge().drain();

    server.push_disappeared(41);
    engine.bridge().drain();

    for kind in [DeviceKind::Sink, DeviceKind::Source] {
        println!("{kind}s:");
        for (id, record) in mirror.devices(kind) {
            println!("  {id}: {} ({:.0}%)", record.name, record.volume * 100.0);
        }
    }

    engine.close();
    Ok(())
}
