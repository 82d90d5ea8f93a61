use crate::models::{IntakeEntry, Notification, Permission, Settings};
use crate::schedule::{at_local_time, is_within_schedule};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

pub trait NotificationSink: Send + Sync + 'static {
    fn deliver(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPlan {
    Disabled,
    NeedsPermission,
    Blocked(Permission),
    At(DateTime<Utc>),
}

impl ReminderPlan {
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(*at),
            _ => None,
        }
    }
}

/// A candidate outside the active window moves to `wake_start` on the
/// candidate's date, or on the following date when that moment is not in
/// the future.
pub fn plan_reminder<Tz: TimeZone>(
    settings: &Settings,
    log: &[IntakeEntry],
    permission: Permission,
    now: &DateTime<Tz>,
) -> ReminderPlan {
    if !settings.notifications_enabled {
        return ReminderPlan::Disabled;
    }
    match permission {
        Permission::Granted => {}
        Permission::Default => return ReminderPlan::NeedsPermission,
        other => return ReminderPlan::Blocked(other),
    }

    let tz = now.timezone();
    let base = log
        .last()
        .map(|entry| entry.timestamp.with_timezone(&tz))
        .unwrap_or_else(|| now.clone());
    let candidate = base + interval(settings);

    if is_within_schedule(&candidate, settings) {
        return ReminderPlan::At(candidate.with_timezone(&Utc));
    }

    let wake = settings.wake_start.as_naive();
    let date = candidate.date_naive();
    let clamped = match at_local_time(&tz, date, wake) {
        Some(at) if at > *now => Some(at),
        _ => date.succ_opt().and_then(|next| at_local_time(&tz, next, wake)),
    };
    trace!(candidate = %candidate.naive_local(), "candidate outside active window");

    match clamped {
        Some(at) => ReminderPlan::At(at.with_timezone(&Utc)),
        None => ReminderPlan::At(candidate.with_timezone(&Utc)),
    }
}

// Not clamped into the active window.
pub fn rearm_at(settings: &Settings, now: DateTime<Utc>) -> DateTime<Utc> {
    now + interval(settings)
}

fn interval(settings: &Settings) -> Duration {
    Duration::minutes(i64::from(settings.reminder_interval))
}

fn delay_until(target: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    (target - now).to_std().unwrap_or_default()
}

#[derive(Debug, Default)]
struct Shared {
    permission: Permission,
    next: Option<DateTime<Utc>>,
    // Bumped on every cancel so a timer that already woke up cannot act.
    generation: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ReminderTask {
    handle: JoinHandle<()>,
}

impl ReminderTask {
    fn spawn(
        first: DateTime<Utc>,
        settings: Settings,
        sink: Arc<dyn NotificationSink>,
        shared: Arc<Mutex<Shared>>,
    ) -> Self {
        let generation = lock(&shared).generation;
        let handle = tokio::spawn(async move {
            let mut due = first;
            loop {
                tokio::time::sleep(delay_until(due, Utc::now())).await;

                {
                    let mut state = lock(&shared);
                    if state.generation != generation {
                        return;
                    }
                    if state.permission == Permission::Granted {
                        info!(tag = crate::models::REMINDER_TAG, "delivering hydration reminder");
                        sink.deliver(Notification::reminder());
                    }
                    due = rearm_at(&settings, Utc::now());
                    state.next = Some(due);
                }
                debug!(next = %due, "reminder re-armed");
            }
        });

        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ReminderTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct Reminders {
    sink: Arc<dyn NotificationSink>,
    shared: Arc<Mutex<Shared>>,
    task: Option<ReminderTask>,
    plan: ReminderPlan,
}

impl Reminders {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            shared: Arc::new(Mutex::new(Shared::default())),
            task: None,
            plan: ReminderPlan::Disabled,
        }
    }

    pub fn permission(&self) -> Permission {
        lock(&self.shared).permission
    }

    pub fn set_permission(&mut self, permission: Permission) {
        lock(&self.shared).permission = permission;
    }

    pub fn plan(&self) -> ReminderPlan {
        self.plan
    }

    pub fn next_reminder(&self) -> Option<DateTime<Utc>> {
        lock(&self.shared).next
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn reschedule(&mut self, settings: &Settings, log: &[IntakeEntry]) -> ReminderPlan {
        self.reschedule_at(settings, log, &Local::now())
    }

    pub fn reschedule_at<Tz: TimeZone>(
        &mut self,
        settings: &Settings,
        log: &[IntakeEntry],
        now: &DateTime<Tz>,
    ) -> ReminderPlan {
        self.cancel();

        let plan = plan_reminder(settings, log, self.permission(), now);
        if let ReminderPlan::At(due) = plan {
            debug!(due = %due, "arming reminder");
            lock(&self.shared).next = Some(due);
            self.task = Some(ReminderTask::spawn(
                due,
                settings.clone(),
                Arc::clone(&self.sink),
                Arc::clone(&self.shared),
            ));
        } else {
            debug!(?plan, "no reminder armed");
        }

        self.plan = plan;
        plan
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        let mut shared = lock(&self.shared);
        shared.generation = shared.generation.wrapping_add(1);
        shared.next = None;
    }
}
