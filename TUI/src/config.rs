/// Application configuration and constants.

use std::path::PathBuf;

/// How long the assistant "types" before a reply lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDelay {
    /// Uniform in `[min_ms, max_ms)`
    Randomized { min_ms: u64, max_ms: u64 },
    Fixed(u64),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Main loop tick rate in milliseconds (target 60 FPS = ~16ms)
    pub tick_rate_ms: u64,

    /// Reply delay policy
    pub reply_delay: ReplyDelay,

    /// Sent -> Delivered, measured from send time
    pub delivered_after_ms: u64,

    /// Delivered -> Read, measured from send time
    pub read_after_ms: u64,

    /// Default toast lifetime
    pub toast_ms: u64,

    /// Unread badge fade-out before removal
    pub badge_fade_ms: u64,

    /// Simulated voice recording length
    pub voice_record_ms: u64,

    /// Delay before the notification prompt appears
    pub notify_prompt_delay_ms: u64,

    /// Show the notification prompt at all
    pub notify_prompt: bool,

    /// Viewports narrower than this (logical units) close the sidebar on select
    pub narrow_viewport_units: u32,

    /// Logical units per terminal column
    pub units_per_column: u32,

    /// Lines to scroll per key press
    pub scroll_step: usize,

    /// Width of the sidebar in characters
    pub sidebar_width: u16,

    /// Seed for the fallback reply picker; `None` seeds from the OS
    pub seed: Option<u64>,

    /// Where settings.json and exports live
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            reply_delay: ReplyDelay::Randomized {
                min_ms: 1500,
                max_ms: 2500,
            },
            delivered_after_ms: 300,
            read_after_ms: 800,
            toast_ms: 1400,
            badge_fade_ms: 300,
            voice_record_ms: 3000,
            notify_prompt_delay_ms: 3000,
            notify_prompt: true,
            narrow_viewport_units: 780,
            units_per_column: 8,
            scroll_step: 3,
            sidebar_width: 30,
            seed: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Viewport width in logical units for a terminal `columns` wide
    pub fn viewport_units(&self, columns: u16) -> u32 {
        columns as u32 * self.units_per_column
    }

    pub fn is_narrow(&self, columns: u16) -> bool {
        self.viewport_units(columns) < self.narrow_viewport_units
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("threadsim")
}

/// Global commands list
pub const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show available commands"),
    ("/new", "Start a new chat"),
    ("/delete", "Delete the active chat"),
    ("/clear", "Clear messages in this chat"),
    ("/export", "Export chat to a text file"),
    ("/sort", "Sort chats by recent activity"),
    ("/search", "Filter the chat list"),
    ("/theme", "Cycle or set theme"),
    ("/copy", "Copy an assistant message"),
    ("/like", "Like an assistant message"),
    ("/dislike", "Dislike an assistant message"),
    ("/more", "More message options"),
    ("/mute", "Mute this chat"),
    ("/archive", "Archive this chat"),
    ("/read", "Mark all chats read"),
    ("/notify", "Enable notifications"),
    ("/voice", "Record a voice message"),
    ("/settings", "Open settings"),
    ("/quit", "Exit threadsim"),
];

/// Emoji picker contents
pub const EMOJIS: &[&str] = &[
    "😀", "😂", "😊", "😍", "🤔", "😎", "👍", "👎", "🙏", "🎉", "🔥", "❤️",
];

/// Attachment picker contents
pub const ATTACHMENTS: &[&str] = &["Photo", "Document", "Location", "Contact"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = Config::default();
        assert_eq!(config.delivered_after_ms, 300);
        assert_eq!(config.read_after_ms, 800);
        assert_eq!(
            config.reply_delay,
            ReplyDelay::Randomized {
                min_ms: 1500,
                max_ms: 2500
            }
        );
    }

    #[test]
    fn test_narrow_threshold() {
        let config = Config::default();
        // 97 * 8 = 776 < 780
        assert!(config.is_narrow(97));
        // 98 * 8 = 784
        assert!(!config.is_narrow(98));
    }
}
