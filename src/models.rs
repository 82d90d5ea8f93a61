use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    pub fn minutes(self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    pub fn as_naive(self) -> NaiveTime {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimeOfDay(pub String);

impl fmt::Display for InvalidTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid HH:MM time", self.0)
    }
}

impl std::error::Error for InvalidTimeOfDay {}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDay;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTimeOfDay(value.to_string());
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub daily_goal: u32,
    pub reminder_interval: u32,
    pub wake_start: TimeOfDay,
    pub wake_end: TimeOfDay,
    pub notifications_enabled: bool,
}

pub const DEFAULT_DAILY_GOAL: u32 = 2000;
pub const DEFAULT_REMINDER_INTERVAL: u32 = 120;
pub const RECOMMENDED_DAILY_GOAL: u32 = 2100;
pub const QUICK_AMOUNTS: [u32; 4] = [120, 200, 250, 330];

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
            wake_start: TimeOfDay::new(7, 0).unwrap_or_default(),
            wake_end: TimeOfDay::new(22, 0).unwrap_or_default(),
            notifications_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEntry {
    pub id: String,
    pub amount: u32,
    pub timestamp: DateTime<Utc>,
}

impl IntakeEntry {
    pub fn new(amount: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HydrationState {
    pub settings: Settings,
    pub log: Vec<IntakeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
}

pub const REMINDER_TITLE: &str = "Waktunya minum air!";
pub const REMINDER_BODY: &str = "Jaga hidrasi tubuhmu dengan segelas air sekarang juga.";
pub const REMINDER_TAG: &str = "hydrate-plus-reminder";

impl Notification {
    pub fn reminder() -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: REMINDER_BODY.to_string(),
            tag: REMINDER_TAG.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub amount: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct IntakeForm {
    pub amount: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub daily_goal: Option<i64>,
    pub reminder_interval: Option<i64>,
    pub wake_start: Option<String>,
    pub wake_end: Option<String>,
    pub notifications_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub permission: Permission,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub amount: u32,
    pub time: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub date: String,
    pub settings: Settings,
    pub today_total: u64,
    pub goal_liters: String,
    pub progress: u32,
    pub remaining: u64,
    pub history: Vec<HistoryItem>,
    pub next_reminder: Option<DateTime<Utc>>,
    pub next_reminder_time: Option<String>,
    pub permission: Permission,
    pub request_permission: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}
