use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::{runtime::Handle, task::JoinHandle, time};

use holosync_shared::{
    Placeholder, PlaceholderError, PlaceholderRegistry, PingerSettings, Replacer, ServerAddress,
    Settings, BUILTIN_OWNER,
};

use super::{client::fetch_status, error::PingError, status::ServerStatus};

/// How often the server-status placeholders re-read the tracked status
pub const STATUS_PLACEHOLDER_REFRESH_SECONDS: f64 = 1.0;

#[derive(Clone, Default)]
struct StatusMap(Arc<RwLock<HashMap<String, ServerStatus>>>);

impl StatusMap {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ServerStatus>> {
        match self.0.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ServerStatus>> {
        match self.0.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn get(&self, name: &str) -> Option<ServerStatus> {
        self.read().get(name).cloned()
    }

    fn set(&self, name: &str, status: ServerStatus) {
        self.write().insert(name.to_string(), status);
    }
}

/// Polls every configured remote server on its own task and keeps the last
/// known status of each.
///
/// A target that is unreachable or answers garbage is marked offline; the
/// other targets are unaffected.
pub struct StatusTracker {
    pinger: PingerSettings,
    refresh_interval: Duration,
    statuses: StatusMap,
    tasks: Vec<JoinHandle<()>>,
}

impl StatusTracker {
    pub fn new(settings: &Settings) -> Self {
        let pinger = settings.pinger.clone();
        let statuses = StatusMap::default();
        for server in &pinger.servers {
            statuses.set(server.name(), ServerStatus::offline(&pinger.offline_motd));
        }
        Self {
            pinger,
            refresh_interval: settings.refresh_interval,
            statuses,
            tasks: Vec::new(),
        }
    }

    pub fn servers(&self) -> &[ServerAddress] {
        &self.pinger.servers
    }

    /// Last known status of a configured server
    pub fn status(&self, name: &str) -> Option<ServerStatus> {
        self.statuses.get(name)
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Starts one polling task per target on `runtime`. Does nothing if the
    /// pinger is disabled or already running.
    pub fn start(&mut self, runtime: &Handle) {
        if !self.pinger.enabled || self.is_running() {
            return;
        }
        for server in &self.pinger.servers {
            let target = Target::new(server.clone(), &self.pinger, self.statuses.clone());
            let interval = self.refresh_interval;
            self.tasks.push(runtime.spawn(async move {
                let mut ticker = time::interval(interval);
                loop {
                    ticker.tick().await;
                    target.ping().await.ok();
                }
            }));
        }
        info!(
            "StatusTracker: polling {} server(s) every {} s",
            self.tasks.len(),
            self.refresh_interval.as_secs()
        );
    }

    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Pings every target once, concurrently, and returns each outcome
    pub async fn ping_all(&self) -> Vec<(String, Result<ServerStatus, PingError>)> {
        let pending: Vec<(String, JoinHandle<Result<ServerStatus, PingError>>)> = self
            .pinger
            .servers
            .iter()
            .map(|server| {
                let target = Target::new(server.clone(), &self.pinger, self.statuses.clone());
                (
                    server.name().to_string(),
                    tokio::spawn(async move { target.ping().await }),
                )
            })
            .collect();

        let mut results = Vec::with_capacity(pending.len());
        for (name, task) in pending {
            match task.await {
                Ok(result) => results.push((name, result)),
                Err(error) => warn!("StatusTracker: ping task for {} failed: {}", name, error),
            }
        }
        results
    }

    /// Registers `{online: name}`, `{max_players: name}`, `{status: name}` and
    /// `{motd: name}` for every configured server
    pub fn register_placeholders(
        &self,
        registry: &mut PlaceholderRegistry,
    ) -> Result<(), PlaceholderError> {
        for server in &self.pinger.servers {
            let name = server.name();
            self.register(registry, format!("{{online: {}}}", name), name, |status, _| {
                status.players_online.to_string()
            })?;
            self.register(registry, format!("{{max_players: {}}}", name), name, |status, _| {
                status.players_max.to_string()
            })?;
            self.register(registry, format!("{{status: {}}}", name), name, |status, pinger| {
                if status.online {
                    pinger.status_online.clone()
                } else {
                    pinger.status_offline.clone()
                }
            })?;
            self.register(registry, format!("{{motd: {}}}", name), name, |status, _| {
                status.motd.clone()
            })?;
        }
        Ok(())
    }

    fn register(
        &self,
        registry: &mut PlaceholderRegistry,
        token: String,
        server: &str,
        render: fn(&ServerStatus, &PingerSettings) -> String,
    ) -> Result<(), PlaceholderError> {
        let statuses = self.statuses.clone();
        let pinger = self.pinger.clone();
        let server = server.to_string();
        registry.register(Placeholder::new(
            BUILTIN_OWNER,
            token,
            STATUS_PLACEHOLDER_REFRESH_SECONDS,
            Replacer::global(move || {
                let status = statuses
                    .get(&server)
                    .unwrap_or_else(|| ServerStatus::offline(&pinger.offline_motd));
                Ok(Some(render(&status, &pinger)))
            }),
        ))
    }
}

impl Drop for StatusTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything one polling task needs, owned so it can move into the task
struct Target {
    server: ServerAddress,
    timeout: Duration,
    trim_motd: bool,
    offline_motd: String,
    statuses: StatusMap,
}

impl Target {
    fn new(server: ServerAddress, pinger: &PingerSettings, statuses: StatusMap) -> Self {
        Self {
            server,
            timeout: pinger.timeout,
            trim_motd: pinger.trim_motd,
            offline_motd: pinger.offline_motd.clone(),
            statuses,
        }
    }

    async fn ping(&self) -> Result<ServerStatus, PingError> {
        let result = match fetch_status(&self.server, self.timeout).await {
            Ok(response) => ServerStatus::parse(&response.json, self.trim_motd),
            Err(error) => Err(error),
        };
        match &result {
            Ok(status) => self.statuses.set(self.server.name(), status.clone()),
            Err(error) => {
                debug!("StatusTracker: {} is offline: {}", self.server, error);
                self.statuses
                    .set(self.server.name(), ServerStatus::offline(&self.offline_motd));
            }
        }
        result
    }
}
