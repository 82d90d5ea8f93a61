use crate::models::{
    DashboardResponse, HydrationState, IntakeEntry, Permission, RECOMMENDED_DAILY_GOAL, Settings,
    SettingsPatch, TimeOfDay,
};
use crate::reminder::{NotificationSink, ReminderPlan, Reminders};
use crate::stats;
use crate::storage::{StateStorage, load_state, save_state};
use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const PERMISSION_DENIED_NOTICE: &str =
    "Izin notifikasi ditolak. Aktifkan melalui pengaturan browser.";
pub const UNSUPPORTED_NOTICE: &str = "Browser ini belum mendukung notifikasi.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    NonPositive(&'static str),
    InvalidTime(&'static str, String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive(field) => write!(f, "{field} must be a positive whole number"),
            Self::InvalidTime(field, raw) => write!(f, "{field} must be HH:MM, got '{raw}'"),
        }
    }
}

impl std::error::Error for SettingsError {}

pub struct HydrationTracker {
    state: HydrationState,
    storage: Arc<dyn StateStorage>,
    reminders: Reminders,
}

impl HydrationTracker {
    pub fn open(storage: Arc<dyn StateStorage>, sink: Arc<dyn NotificationSink>) -> Self {
        let state = load_state(storage.as_ref());
        info!(entries = state.log.len(), "hydration state loaded");
        let mut tracker = Self {
            state,
            storage,
            reminders: Reminders::new(sink),
        };
        tracker.reschedule();
        tracker
    }

    pub fn state(&self) -> &HydrationState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn permission(&self) -> Permission {
        self.reminders.permission()
    }

    pub fn reminder_plan(&self) -> ReminderPlan {
        self.reminders.plan()
    }

    pub fn next_reminder(&self) -> Option<DateTime<Utc>> {
        self.reminders.next_reminder()
    }

    pub fn today_total(&self) -> u64 {
        stats::today_total(&self.state.log)
    }

    pub fn add_intake(&mut self, amount: u32) -> io::Result<Option<IntakeEntry>> {
        self.add_intake_at(amount, Utc::now())
    }

    pub fn add_intake_at(
        &mut self,
        amount: u32,
        timestamp: DateTime<Utc>,
    ) -> io::Result<Option<IntakeEntry>> {
        if amount == 0 {
            return Ok(None);
        }
        let entry = IntakeEntry::new(amount, timestamp);
        let mut next = self.state.clone();
        next.log.push(entry.clone());
        self.commit(next)?;
        debug!(amount, id = %entry.id, "intake logged");
        Ok(Some(entry))
    }

    pub fn add_intake_value(&mut self, raw: &Value) -> io::Result<Option<IntakeEntry>> {
        match parse_amount(raw) {
            Some(amount) => self.add_intake(amount),
            None => {
                debug!(%raw, "ignoring invalid intake amount");
                Ok(None)
            }
        }
    }

    // A patch with any invalid field changes nothing.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<(), UpdateError> {
        let mut next = self.state.settings.clone();

        if let Some(goal) = patch.daily_goal {
            next.daily_goal = positive(goal).ok_or(SettingsError::NonPositive("dailyGoal"))?;
        }
        if let Some(interval) = patch.reminder_interval {
            next.reminder_interval =
                positive(interval).ok_or(SettingsError::NonPositive("reminderInterval"))?;
        }
        if let Some(raw) = &patch.wake_start {
            next.wake_start = parse_time("wakeStart", raw)?;
        }
        if let Some(raw) = &patch.wake_end {
            next.wake_end = parse_time("wakeEnd", raw)?;
        }
        if let Some(enabled) = patch.notifications_enabled {
            next.notifications_enabled = enabled;
        }

        let changed = next != self.state.settings;
        self.commit(HydrationState {
            settings: next,
            log: self.state.log.clone(),
        })?;
        if changed {
            info!(settings = ?self.state.settings, "settings updated");
        }
        Ok(())
    }

    pub fn apply_recommended_goal(&mut self) -> io::Result<()> {
        let mut next = self.state.clone();
        next.settings.daily_goal = RECOMMENDED_DAILY_GOAL;
        self.commit(next)
    }

    pub fn reset_today(&mut self) -> io::Result<usize> {
        self.reset_today_at(&Local::now())
    }

    pub fn reset_today_at(&mut self, now: &DateTime<Local>) -> io::Result<usize> {
        let mut next = self.state.clone();
        let removed = stats::reset_today(&mut next.log, now);
        self.commit(next)?;
        info!(removed, "today's entries reset");
        Ok(removed)
    }

    pub fn set_permission(&mut self, permission: Permission) {
        if self.reminders.permission() != permission {
            info!(?permission, "notification permission changed");
        }
        self.reminders.set_permission(permission);
        self.reschedule();
    }

    pub fn dashboard(&self) -> DashboardResponse {
        self.dashboard_at(&Local::now())
    }

    pub fn dashboard_at(&self, now: &DateTime<Local>) -> DashboardResponse {
        let settings = &self.state.settings;
        let total = stats::today_total_at(&self.state.log, now);
        let permission = self.permission();
        let next_reminder = self.next_reminder();

        DashboardResponse {
            date: now.date_naive().to_string(),
            settings: settings.clone(),
            today_total: total,
            goal_liters: stats::goal_liters(settings.daily_goal),
            progress: stats::progress_percent(total, settings.daily_goal),
            remaining: stats::remaining(total, settings.daily_goal),
            history: stats::history(&self.state.log, now),
            next_reminder,
            next_reminder_time: next_reminder
                .map(|at| at.with_timezone(&Local).format("%H:%M").to_string()),
            permission,
            request_permission: self.reminders.plan() == ReminderPlan::NeedsPermission,
            notice: permission_notice(permission).map(str::to_string),
        }
    }

    // `next` replaces the current state only once it is saved.
    fn commit(&mut self, next: HydrationState) -> io::Result<()> {
        if let Err(err) = save_state(self.storage.as_ref(), &next) {
            error!("failed to persist hydration state: {err}");
            return Err(err);
        }
        self.state = next;
        self.reschedule();
        Ok(())
    }

    fn reschedule(&mut self) {
        self.reminders.reschedule(&self.state.settings, &self.state.log);
    }
}

#[derive(Debug)]
pub enum UpdateError {
    Invalid(SettingsError),
    Storage(io::Error),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(err) => err.fmt(f),
            Self::Storage(err) => write!(f, "failed to save settings: {err}"),
        }
    }
}

impl std::error::Error for UpdateError {}

impl From<SettingsError> for UpdateError {
    fn from(err: SettingsError) -> Self {
        Self::Invalid(err)
    }
}

impl From<io::Error> for UpdateError {
    fn from(err: io::Error) -> Self {
        Self::Storage(err)
    }
}

pub fn permission_notice(permission: Permission) -> Option<&'static str> {
    match permission {
        Permission::Denied => Some(PERMISSION_DENIED_NOTICE),
        Permission::Unsupported => Some(UNSUPPORTED_NOTICE),
        Permission::Default | Permission::Granted => None,
    }
}

/// Reads an amount the way a number input does: the leading whole number of
/// a string, or the integer part of a JSON number.
pub fn parse_amount(raw: &Value) -> Option<u32> {
    let amount = match raw {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?,
        Value::String(text) => leading_integer(text)?,
        _ => return None,
    };
    positive(amount)
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|n| *n > 0)
}

fn parse_time(field: &'static str, raw: &str) -> Result<TimeOfDay, SettingsError> {
    raw.parse()
        .map_err(|_| SettingsError::InvalidTime(field, raw.to_string()))
}
