//! Plain-text transcript export.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{AppError, Result};
use crate::message::Message;

pub fn render(title: &str, messages: &[Message], at: DateTime<Local>) -> String {
    let mut out = format!("Chat Export: {}\n", title);
    out.push_str(&format!("Date: {}\n", at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    for msg in messages {
        out.push_str(&format!("[{}] {}: {}\n", msg.time_label(), msg.author, msg.text));
    }
    out
}

/// `<title, whitespace runs as _>_<unix millis>.txt`
pub fn file_name(title: &str, at: DateTime<Local>) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    format!("{}_{}.txt", stem, at.timestamp_millis())
}

pub fn write(dir: &Path, title: &str, messages: &[Message], at: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))?;
    let path = dir.join(file_name(title, at));
    fs::write(&path, render(title, messages, at)).map_err(|e| AppError::io(&path, e))?;
    Ok(path)
}
