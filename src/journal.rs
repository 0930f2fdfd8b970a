use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL log of account and activity events for one run.
/// Passwords are never written.
pub struct Journal {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Journal {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn register(&mut self, username: &str, ok: bool) -> Result<()> {
        self.log(
            "register",
            serde_json::json!({ "username": username, "ok": ok }),
        )
    }

    pub fn login(&mut self, username: &str, ok: bool) -> Result<()> {
        self.log(
            "login",
            serde_json::json!({ "username": username, "ok": ok }),
        )
    }

    pub fn logout(&mut self, username: Option<&str>) -> Result<()> {
        self.log("logout", serde_json::json!({ "username": username }))
    }

    pub fn activity_added(&mut self, username: &str, text: &str) -> Result<()> {
        self.log(
            "activity_added",
            serde_json::json!({ "username": username, "text": text }),
        )
    }

    /// Log a removal; `removed` is the number of matching entries dropped
    pub fn activity_removed(&mut self, username: &str, text: &str, removed: usize) -> Result<()> {
        self.log(
            "activity_removed",
            serde_json::json!({
                "username": username,
                "text": text,
                "removed": removed,
            }),
        )
    }
}
