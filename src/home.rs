//! The home screen shown after login: greeting, three info cards and the
//! current user's activities.

use crate::config::HomeConfig;
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Day of month and full month name, e.g. "5 March"
pub fn format_date(now: &NaiveDateTime) -> String {
    now.format("%-d %B").to_string()
}

/// Zero-padded 24h clock, e.g. "09:04:07"
pub fn format_time(now: &NaiveDateTime) -> String {
    now.format("%H:%M:%S").to_string()
}

pub fn render(
    username: &str,
    activities: &[String],
    now: &NaiveDateTime,
    home: &HomeConfig,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hello {}!", username);
    let _ = writeln!(out, "I help you manage your activities :)");
    let _ = writeln!(out);
    let _ = writeln!(out, "  [{}°  {}]", home.temperature, home.city);
    let _ = writeln!(out, "  [{}  {}]", format_date(now), format_time(now));
    let _ = writeln!(out, "  [Built Using  {}]", home.built_using);
    let _ = writeln!(out);
    out.push_str(&render_activities(activities));
    out
}

pub fn render_activities(activities: &[String]) -> String {
    let mut out = String::from("Today's Activity\n");
    if activities.is_empty() {
        out.push_str("  No activities yet. Add some activities to get started!\n");
    } else {
        for (i, activity) in activities.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, activity);
        }
    }
    out
}
