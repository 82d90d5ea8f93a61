use crate::models::{HydrationState, IntakeEntry, Settings, TimeOfDay};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, warn};

pub const STORAGE_KEY: &str = "hydrate_plus_state_v1";

pub trait StateStorage: Send + Sync + 'static {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

// Blocking std::fs: callers hold the tracker lock, so saves land in order
// and are on disk before the response is sent.
impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(tmp, path)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let values = self.values.lock().map_err(|_| io::Error::other("storage lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.values.lock().map_err(|_| io::Error::other("storage lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoStorage;

impl StateStorage for NoStorage {
    fn get(&self, _key: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
        Ok(())
    }
}

pub fn load_state(storage: &dyn StateStorage) -> HydrationState {
    match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) => match parse_state(&raw) {
            Ok(state) => state,
            Err(err) => {
                error!("failed to parse hydration state: {err}");
                HydrationState::default()
            }
        },
        Ok(None) => HydrationState::default(),
        Err(err) => {
            error!("failed to read hydration state: {err}");
            HydrationState::default()
        }
    }
}

pub fn save_state(storage: &dyn StateStorage, state: &HydrationState) -> io::Result<()> {
    let payload = serde_json::to_string(state).map_err(io::Error::other)?;
    storage.set(STORAGE_KEY, &payload)
}

#[derive(Debug, Default, Deserialize)]
struct StoredState {
    #[serde(default)]
    settings: Value,
    #[serde(default)]
    log: Value,
}

// Only a document that is not a JSON object is an error. Invalid fields keep
// their defaults and invalid log entries are skipped.
pub fn parse_state(raw: &str) -> Result<HydrationState, serde_json::Error> {
    let stored: StoredState = serde_json::from_str(raw)?;
    Ok(HydrationState {
        settings: parse_settings(&stored.settings),
        log: parse_log(&stored.log),
    })
}

fn parse_settings(value: &Value) -> Settings {
    let mut settings = Settings::default();
    let Some(fields) = value.as_object() else {
        if !value.is_null() {
            warn!("stored settings are not an object, using defaults");
        }
        return settings;
    };

    if let Some(goal) = field(fields, "dailyGoal", positive_u32) {
        settings.daily_goal = goal;
    }
    if let Some(interval) = field(fields, "reminderInterval", positive_u32) {
        settings.reminder_interval = interval;
    }
    if let Some(start) = field(fields, "wakeStart", time_of_day) {
        settings.wake_start = start;
    }
    if let Some(end) = field(fields, "wakeEnd", time_of_day) {
        settings.wake_end = end;
    }
    if let Some(enabled) = field(fields, "notificationsEnabled", Value::as_bool) {
        settings.notifications_enabled = enabled;
    }

    settings
}

fn field<T>(
    fields: &serde_json::Map<String, Value>,
    name: &str,
    decode: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = fields.get(name)?;
    let decoded = decode(value);
    if decoded.is_none() {
        warn!(field = name, %value, "ignoring invalid stored setting");
    }
    decoded
}

fn positive_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn time_of_day(value: &Value) -> Option<TimeOfDay> {
    value.as_str()?.parse().ok()
}

fn parse_log(value: &Value) -> Vec<IntakeEntry> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("stored log is not an array, starting empty");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let entry = parse_entry(item);
            if entry.is_none() {
                warn!(%item, "skipping invalid stored intake entry");
            }
            entry
        })
        .collect()
}

fn parse_entry(item: &Value) -> Option<IntakeEntry> {
    let id = item.get("id")?.as_str()?.to_string();
    let amount = positive_u32(item.get("amount")?)?;
    let timestamp = item
        .get("timestamp")?
        .as_str()?
        .parse::<DateTime<Utc>>()
        .ok()?;
    Some(IntakeEntry { id, amount, timestamp })
}
