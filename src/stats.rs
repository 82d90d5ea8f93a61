use crate::models::{HistoryItem, IntakeEntry};
use crate::schedule::start_of_day;
use chrono::{DateTime, Local, TimeZone, Utc};

pub fn today_total(log: &[IntakeEntry]) -> u64 {
    today_total_at(log, &Local::now())
}

pub fn today_total_at<Tz: TimeZone>(log: &[IntakeEntry], now: &DateTime<Tz>) -> u64 {
    let Some(start) = start_of_day(now) else {
        return 0;
    };
    let start = start.with_timezone(&Utc);

    log.iter()
        .filter(|entry| entry.timestamp >= start)
        .map(|entry| u64::from(entry.amount))
        .sum()
}

pub fn reset_today<Tz: TimeZone>(log: &mut Vec<IntakeEntry>, now: &DateTime<Tz>) -> usize {
    let tz = now.timezone();
    let today = now.date_naive();
    let before = log.len();
    log.retain(|entry| entry.timestamp.with_timezone(&tz).date_naive() != today);
    before - log.len()
}

pub fn progress_percent(total: u64, goal: u32) -> u32 {
    if goal == 0 {
        return 100;
    }
    let percent = (total as f64 / f64::from(goal) * 100.0).round();
    percent.min(100.0) as u32
}

pub fn remaining(total: u64, goal: u32) -> u64 {
    u64::from(goal).saturating_sub(total)
}

pub fn goal_liters(goal: u32) -> String {
    format!("{:.1}", f64::from(goal) / 1000.0)
}

pub fn history<Tz: TimeZone>(log: &[IntakeEntry], now: &DateTime<Tz>) -> Vec<HistoryItem>
where
    Tz::Offset: std::fmt::Display,
{
    let tz = now.timezone();
    let today = now.date_naive();
    log.iter()
        .rev()
        .map(|entry| (entry, entry.timestamp.with_timezone(&tz)))
        .filter(|(_, local)| local.date_naive() == today)
        .map(|(entry, local)| HistoryItem {
            id: entry.id.clone(),
            amount: entry.amount,
            time: local.format("%H:%M").to_string(),
            timestamp: entry.timestamp,
        })
        .collect()
}
