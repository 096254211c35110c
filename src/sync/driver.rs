use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::config::SyncConfig;
use crate::http::mutation::MutationError;
use crate::http::transport::HttpTransport;
use crate::notify::NotificationStore;

use super::cache::SettingsCache;
use super::types::{SyncCommand, SyncEvent};
use super::SyncEngine;

#[derive(Debug)]
enum DriverEvent {
    Edit { field: String, value: Value },
    TimerFired { field: String },
    WriteFinished {
        field: String,
        result: Result<Value, MutationError>,
    },
    FetchFinished {
        result: Result<Map<String, Value>, MutationError>,
    },
    RefetchDue,
    Shutdown,
}

/// Cloneable entry point for UI edit events.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: UnboundedSender<DriverEvent>,
}

impl SyncHandle {
    /// Called once per user edit event; the driver debounces per field.
    pub fn schedule(&self, field: impl Into<String>, value: Value) {
        let _ = self.tx.send(DriverEvent::Edit {
            field: field.into(),
            value,
        });
    }

    /// Stops the event loop and cancels every outstanding timer.
    pub fn shutdown(&self) {
        let _ = self.tx.send(DriverEvent::Shutdown);
    }
}

/// Imperative shell around [`SyncEngine`].
///
/// Polls nothing itself; it reacts to events on one channel (edits from the
/// handle, its own timer and completion callbacks, the periodic refetch
/// tick) and executes the commands the engine emits: arming and cancelling
/// debounce timers, dispatching writes, refetching, and raising
/// notifications.
pub struct SyncDriver<T: HttpTransport + Clone + Send + Sync + 'static> {
    engine: SyncEngine,
    api: ApiClient<T>,
    campaign_id: u64,
    notifications: NotificationStore,
    cfg: SyncConfig,
    timers: HashMap<String, JoinHandle<()>>,
    tx: UnboundedSender<DriverEvent>,
    rx: UnboundedReceiver<DriverEvent>,
}

impl<T: HttpTransport + Clone + Send + Sync + 'static> SyncDriver<T> {
    pub fn new(
        api: ApiClient<T>,
        campaign_id: u64,
        notifications: NotificationStore,
        cfg: SyncConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine: SyncEngine::new(SettingsCache::new()),
            api,
            campaign_id,
            notifications,
            cfg,
            timers: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> SyncHandle {
        SyncHandle {
            tx: self.tx.clone(),
        }
    }

    /// Shared snapshot cache; clones stay valid after `run` takes ownership.
    pub fn cache(&self) -> SettingsCache {
        self.engine.cache()
    }

    /// The main event loop. Runs until `shutdown`; the driver keeps its own
    /// sender for internal task completions, so dropping the handles alone
    /// does not end the loop.
    pub async fn run(mut self) {
        log::info!("[DRIVER] starting settings sync for campaign {}", self.campaign_id);

        // First tick lands one full interval from now; tests priming the
        // cache by hand see no surprise fetch at t0.
        let poll_tick = {
            let tx = self.tx.clone();
            let period = self.cfg.poll_interval;
            tokio::spawn(async move {
                let start = tokio::time::Instant::now() + period;
                let mut interval = tokio::time::interval_at(start, period);
                loop {
                    interval.tick().await;
                    if tx.send(DriverEvent::RefetchDue).is_err() {
                        break;
                    }
                }
            })
        };

        while let Some(event) = self.rx.recv().await {
            if matches!(event, DriverEvent::Shutdown) {
                break;
            }
            self.dispatch(event);
        }

        poll_tick.abort();
        for (field, timer) in self.timers.drain() {
            log::debug!("[DRIVER] cancelling timer for {field} on teardown");
            timer.abort();
        }
        log::info!("[DRIVER] stopped");
    }

    fn dispatch(&mut self, event: DriverEvent) {
        let engine_event = match event {
            DriverEvent::Edit { field, value } => SyncEvent::Edit { field, value },
            DriverEvent::TimerFired { field } => {
                self.timers.remove(&field);
                SyncEvent::SettleElapsed { field }
            }
            DriverEvent::WriteFinished { field, result } => match result {
                Ok(_) => SyncEvent::WriteSucceeded { field },
                Err(e) => SyncEvent::WriteFailed {
                    field,
                    message: e.message,
                },
            },
            DriverEvent::FetchFinished { result } => match result {
                Ok(snapshot) => SyncEvent::SnapshotFetched { snapshot },
                Err(e) => {
                    // Background reconciliation failure: the next poll tick
                    // retries, so log instead of notifying.
                    log::warn!("[DRIVER] settings refetch failed: {}", e.message);
                    return;
                }
            },
            DriverEvent::RefetchDue => {
                self.spawn_fetch();
                return;
            }
            DriverEvent::Shutdown => return,
        };

        log::trace!("[DRIVER] engine.handle_event({engine_event:?})");
        let cmds = self.engine.handle_event(engine_event);
        for cmd in cmds {
            self.execute_command(cmd);
        }
    }

    fn execute_command(&mut self, cmd: SyncCommand) {
        log::trace!("[DRIVER] cmd: {cmd:?}");
        match cmd {
            SyncCommand::ArmTimer { field } => {
                let tx = self.tx.clone();
                let delay = self.cfg.settle_delay;
                let timer_field = field.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(DriverEvent::TimerFired { field: timer_field });
                });
                if let Some(old) = self.timers.insert(field, timer) {
                    old.abort();
                }
            }

            SyncCommand::CancelTimer { field } => {
                if let Some(timer) = self.timers.remove(&field) {
                    timer.abort();
                }
            }

            SyncCommand::SendWrite {
                field,
                wire_field,
                value,
            } => {
                let api = self.api.clone();
                let tx = self.tx.clone();
                let campaign_id = self.campaign_id;
                tokio::spawn(async move {
                    let result = api.update_setting(campaign_id, &wire_field, value).await;
                    let _ = tx.send(DriverEvent::WriteFinished { field, result });
                });
            }

            SyncCommand::Refetch => self.spawn_fetch(),

            SyncCommand::Notify { kind, message } => {
                self.notifications
                    .push(kind, message, Some(self.cfg.notification_duration));
            }
        }
    }

    fn spawn_fetch(&self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let campaign_id = self.campaign_id;
        tokio::spawn(async move {
            let result = api.fetch_settings(campaign_id).await;
            let _ = tx.send(DriverEvent::FetchFinished { result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;
    use crate::http::transport::{Method, RequestBody};
    use crate::notify::NotificationKind;
    use serde_json::json;
    use std::time::Duration;

    const SETTLE: Duration = Duration::from_millis(500);

    struct Rig {
        handle: SyncHandle,
        cache: SettingsCache,
        notifications: NotificationStore,
        mock: MockTransport,
    }

    fn start_rig() -> Rig {
        let mock = MockTransport::new();
        let api = ApiClient::new(mock.clone(), "http://backend");
        let notifications = NotificationStore::new();
        let driver = SyncDriver::new(api, 42, notifications.clone(), SyncConfig::default());

        let handle = driver.handle();
        let cache = driver.cache();
        cache.store_fetched(
            json!({
                "maxDailyPosts": 10,
                "engagementHours": {"start": "09:00", "end": "21:00", "timezone": "UTC"},
            })
            .as_object()
            .unwrap()
            .clone(),
        );

        tokio::spawn(driver.run());
        Rig {
            handle,
            cache,
            notifications,
            mock,
        }
    }

    /// Lets the driver and its spawned tasks drain everything that is ready.
    async fn settle_tasks() {
        for _ in 0..64 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(d: Duration) {
        settle_tasks().await;
        tokio::time::advance(d).await;
        settle_tasks().await;
    }

    fn put_requests(mock: &MockTransport) -> Vec<crate::http::transport::TransportRequest> {
        mock.requests()
            .into_iter()
            .filter(|r| r.method == Method::Put)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_sends_one_write_with_last_value() {
        let rig = start_rig();
        // PUT response, then the refetch snapshot.
        rig.mock.push_json(200, json!({"status": "updated"}));
        rig.mock.push_json(200, json!({"max_daily_posts": 12}));

        rig.handle.schedule("maxDailyPosts", json!(7));
        advance(Duration::from_millis(200)).await;
        rig.handle.schedule("maxDailyPosts", json!(12));
        advance(SETTLE).await;

        let puts = put_requests(&rig.mock);
        assert_eq!(puts.len(), 1, "burst must collapse to one write");
        assert_eq!(puts[0].url, "http://backend/api/campaigns/settings/42");
        match &puts[0].body {
            RequestBody::Json(body) => {
                assert_eq!(*body, json!({"fieldName": "max_daily_posts", "value": 12}))
            }
            other => panic!("expected json body, got {other:?}"),
        }

        // Refetch installed server truth and one success notification exists.
        assert_eq!(rig.cache.snapshot()["maxDailyPosts"], 12);
        let notes = rig.notifications.visible();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn fields_debounce_independently() {
        let rig = start_rig();

        rig.handle.schedule("maxDailyPosts", json!(3));
        advance(Duration::from_millis(300)).await;
        // Field B's edit must not delay field A's timer.
        rig.handle.schedule("autoReply", json!(true));
        advance(Duration::from_millis(200)).await;

        let puts = put_requests(&rig.mock);
        assert_eq!(puts.len(), 1, "only field A has settled");
        match &puts[0].body {
            RequestBody::Json(body) => assert_eq!(body["fieldName"], "max_daily_posts"),
            other => panic!("expected json body, got {other:?}"),
        }

        advance(Duration::from_millis(300)).await;
        assert_eq!(put_requests(&rig.mock).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn optimistic_patch_is_visible_before_write_resolves() {
        let rig = start_rig();
        // The write never resolves, so the cache shows the optimistic value.
        rig.mock.push_hang();

        rig.handle.schedule("maxDailyPosts", json!(55));
        advance(SETTLE).await;

        assert_eq!(rig.cache.snapshot()["maxDailyPosts"], 55);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_rolls_back_and_raises_one_error() {
        let rig = start_rig();
        rig.mock
            .push_json(500, json!({"detail": {"message": "db unavailable"}}));

        rig.handle.schedule("maxDailyPosts", json!(99));
        advance(SETTLE).await;

        assert_eq!(
            rig.cache.snapshot()["maxDailyPosts"], 10,
            "cache must revert to the last fetched value"
        );
        let notes = rig.notifications.visible();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(notes[0].message, "db unavailable");
    }

    #[tokio::test(start_paused = true)]
    async fn nested_field_write_merges_only_its_key() {
        let rig = start_rig();
        rig.mock.push_json(200, json!({"status": "updated"}));
        rig.mock.push_json(
            200,
            json!({"engagement_hours": {"start": "10:30", "end": "21:00", "timezone": "UTC"}}),
        );

        rig.handle.schedule("engagementHours.start", json!("10:30"));
        advance(SETTLE).await;

        let puts = put_requests(&rig.mock);
        match &puts[0].body {
            RequestBody::Json(body) => {
                assert_eq!(body["fieldName"], "engagement_hours.start")
            }
            other => panic!("expected json body, got {other:?}"),
        }

        let snap = rig.cache.snapshot();
        assert_eq!(snap["engagementHours"]["start"], "10:30");
        assert_eq!(snap["engagementHours"]["end"], "21:00");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_timers() {
        let rig = start_rig();

        rig.handle.schedule("maxDailyPosts", json!(8));
        advance(Duration::from_millis(100)).await;
        rig.handle.shutdown();
        advance(SETTLE).await;

        assert!(
            put_requests(&rig.mock).is_empty(),
            "no write may fire after teardown"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn background_poll_refetches_snapshot() {
        let rig = start_rig();
        rig.mock.push_json(200, json!({"max_daily_posts": 77}));

        advance(Duration::from_secs(10)).await;

        assert_eq!(rig.cache.snapshot()["maxDailyPosts"], 77);
    }
}
