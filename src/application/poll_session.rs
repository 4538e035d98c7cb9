// Poll session - Owned timers driving the monitor service
use crate::application::monitor_service::MonitorService;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Repeating timer that fires a poll immediately and then every `period`.
///
/// Each poll runs as its own task, so a slow poll never delays the next
/// tick and polls may overlap.
pub struct PollTimer {
    name: &'static str,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl PollTimer {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            handle: None,
        }
    }

    pub fn start<F, Fut>(&mut self, poll: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let name = self.name;
        let period = self.period;
        tracing::info!("Starting {} timer every {:?}", name, period);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::trace!("{} tick", name);
                tokio::spawn(poll());
            }
        }));
    }

    /// Cancel the timer. Polls already in flight finish on their own timeout.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("Stopped {} timer", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The dashboard poll and the connectivity check, started and stopped together.
pub struct MonitorSession {
    service: MonitorService,
    dashboard: PollTimer,
    connectivity: PollTimer,
}

impl MonitorSession {
    pub fn new(
        service: MonitorService,
        dashboard_every: Duration,
        connectivity_every: Duration,
    ) -> Self {
        Self {
            service,
            dashboard: PollTimer::new("dashboard", dashboard_every),
            connectivity: PollTimer::new("connectivity", connectivity_every),
        }
    }

    pub fn start(&mut self) {
        let service = self.service.clone();
        self.dashboard.start(move || {
            let service = service.clone();
            async move {
                service.poll_dashboard().await;
            }
        });

        let service = self.service.clone();
        self.connectivity.start(move || {
            let service = service.clone();
            async move {
                service.check_connectivity().await;
            }
        });
    }

    pub fn stop(&mut self) {
        self.dashboard.stop();
        self.connectivity.stop();
    }

    pub fn is_running(&self) -> bool {
        self.dashboard.is_running() && self.connectivity.is_running()
    }
}
