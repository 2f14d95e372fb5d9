use std::sync::Arc;

use log::{error, info, warn, LevelFilter};
use tokio::runtime::Handle;

use holosync_shared::{
    select_adapter, time_placeholder, PacketSink, Settings, StartupError, VersionAdapter,
};

use crate::{pinger::StatusTracker, sync::EntitySyncManager};

/// An activated holosync instance: the sync manager plus the status tracker,
/// built once at startup from explicit settings.
pub struct Runtime {
    settings: Arc<Settings>,
    manager: EntitySyncManager,
    tracker: StatusTracker,
}

impl Runtime {
    /// Picks the adapter for `revision` and activates on it
    pub fn activate(
        revision: &str,
        settings: Settings,
        sink: Arc<dyn PacketSink>,
    ) -> Result<Self, StartupError> {
        let adapter = select_adapter(revision).inspect_err(report)?;
        Self::activate_with(adapter, settings, sink)
    }

    /// Activates on an adapter the host built itself.
    ///
    /// Runs the adapter's setup (custom entity registration and capability
    /// check). On failure nothing is started and the operator banner is
    /// logged. With `debug` set, the `log` max level is raised to `Debug`.
    pub fn activate_with(
        mut adapter: Box<dyn VersionAdapter>,
        settings: Settings,
        sink: Arc<dyn PacketSink>,
    ) -> Result<Self, StartupError> {
        adapter.setup().inspect_err(report)?;

        if settings.debug && log::max_level() < LevelFilter::Debug {
            log::set_max_level(LevelFilter::Debug);
            info!("Runtime: debug logging enabled");
        }

        let settings = Arc::new(settings);
        let revision = adapter.revision().to_string();
        let mut manager = EntitySyncManager::new(adapter, settings.clone(), sink);
        let tracker = StatusTracker::new(&settings);

        if let Err(error) = manager.register_placeholder(time_placeholder(settings.time.clone())) {
            warn!("Runtime: {}", error);
        }
        if settings.pinger.enabled {
            if let Err(error) = tracker.register_placeholders(manager.placeholders_mut()) {
                warn!("Runtime: {}", error);
            }
        }

        info!("Runtime: holosync activated on {}", revision);
        Ok(Self {
            settings,
            manager,
            tracker,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn manager(&self) -> &EntitySyncManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EntitySyncManager {
        &mut self.manager
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Starts polling remote servers on `runtime`, if the pinger is enabled
    pub fn start_pinger(&mut self, runtime: &Handle) {
        self.tracker.start(runtime);
    }

    pub fn shutdown(mut self) {
        self.tracker.stop();
        for handle in self.manager.handles() {
            if let Err(error) = self.manager.despawn(&handle) {
                warn!("Runtime: {}", error);
            }
        }
        self.manager.flush();
        info!("Runtime: holosync shut down");
    }
}

fn report(error: &StartupError) {
    error!("{}", error.operator_message());
}
