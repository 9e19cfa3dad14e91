//! Output formatting utilities

use crate::domain::{ConnectivityState, JournalEntry};
use chrono::{Local, TimeZone};
use std::fmt::Display;

pub const OFFLINE_BANNER: &str = "The shared journal cannot be reached right now.\n\
    Entries are being read from and saved to this device only.";

/// Format entries grouped by the day they were written, in local time
pub fn format_entry_list(entries: &[JournalEntry]) -> String {
    format_entry_list_in(entries, &Local)
}

/// Format entries grouped by day in the given timezone.
///
/// Entries are expected newest-first; a new day header starts whenever the
/// date changes.
pub fn format_entry_list_in<Tz>(entries: &[JournalEntry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if entries.is_empty() {
        return "No entries yet".to_string();
    }

    let mut output = String::new();
    let mut current_day = None;

    for entry in entries {
        let local = entry.created_at.with_timezone(tz);
        let day = local.date_naive();

        if current_day != Some(day) {
            if current_day.is_some() {
                output.push('\n');
            }
            output.push_str(&format!("{}\n", day.format("%d/%m/%Y")));
            current_day = Some(day);
        }

        output.push_str(&format!(
            "  [{}] {}  {}: {}\n",
            entry.id,
            local.format("%H:%M"),
            entry.author,
            entry.title
        ));
        for line in entry.content.lines() {
            output.push_str(&format!("      {}\n", line));
        }
    }

    output
}

/// One-line summary of a single entry
pub fn format_entry(entry: &JournalEntry) -> String {
    format!("[{}] {} ({})", entry.id, entry.title, entry.author)
}

/// Online/offline indicator, followed by the banner when offline
pub fn format_status(state: ConnectivityState) -> String {
    match state {
        ConnectivityState::Online => "[online]".to_string(),
        ConnectivityState::Offline | ConnectivityState::Unknown => {
            format!("[{}]\n{}", state, OFFLINE_BANNER)
        }
    }
}
