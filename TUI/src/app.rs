use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{Duration, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::chat_list::{ChatId, ChatList, SelectOutcome};
use crate::command::CommandParser;
use crate::config::{Config, COMMANDS};
use crate::export;
use crate::message::{DeliveryState, Message, MessageId, Origin, Reaction};
use crate::platform::{ClipboardSink, DesktopNotifier, Notifier, Permission, SystemClipboard};
use crate::reply::{self, ASSISTANT_NAME};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::sheet::{SheetId, Sheets};
use crate::theme::{Theme, ThemeStore};
use crate::ui_state::{Focus, Toast, UIState};

pub const TYPING_LABEL: &str = "Assistant is typing…";
pub const VOICE_TRANSCRIPT: &str = "Voice message transcribed text";

/// Deferred work, fired by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum Timer {
    Delivery {
        chat: ChatId,
        message: MessageId,
        state: DeliveryState,
    },
    Reply {
        chat: ChatId,
        prompt: String,
    },
    BadgeFade(ChatId),
    ToastExpire,
    VoiceDone,
    NotifyPrompt,
}

/// Transcript plus typing indicator for one chat.
#[derive(Debug, Default)]
pub struct Conversation {
    pub messages: Vec<Message>,
    pending_replies: usize,
}

impl Conversation {
    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    fn reset_typing(&mut self) {
        self.pending_replies = 0;
    }
}

/// Something waiting on a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    DeleteChat(ChatId),
    ClearChat(ChatId),
    ArchiveChat(ChatId),
}

impl Confirm {
    pub fn prompt(&self) -> &'static str {
        match self {
            Confirm::DeleteChat(_) => "Delete this chat?",
            Confirm::ClearChat(_) => "Clear all messages in this chat?",
            Confirm::ArchiveChat(_) => "Archive this chat?",
        }
    }
}

pub struct App {
    pub config: Config,
    pub ui: UIState,
    pub chats: ChatList,
    pub sheets: Sheets,
    pub theme: Theme,
    pub confirm: Option<Confirm>,
    pub permission: Permission,
    pub notify_prompt_visible: bool,
    pub animation_frame: usize,
    pub should_quit: bool,
    conversations: HashMap<ChatId, Conversation>,
    scheduler: Scheduler<Timer>,
    rng: StdRng,
    next_message_id: MessageId,
    voice: Option<TimerHandle>,
    theme_store: ThemeStore,
    clipboard: Box<dyn ClipboardSink>,
    notifier: Box<dyn Notifier>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::with_platform(config, Box::new(SystemClipboard), Box::new(DesktopNotifier))
    }

    pub fn with_platform(
        config: Config,
        clipboard: Box<dyn ClipboardSink>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let theme_store = ThemeStore::new(&config.data_dir);
        let theme = theme_store.load();
        info!("Loaded theme {} from {}", theme.as_str(), theme_store.path().display());

        let mut app = Self {
            ui: UIState::new(),
            chats: ChatList::demo(Local::now()),
            sheets: Sheets::new(),
            theme,
            confirm: None,
            permission: Permission::Default,
            notify_prompt_visible: false,
            animation_frame: 0,
            should_quit: false,
            conversations: HashMap::new(),
            scheduler: Scheduler::new(),
            rng,
            next_message_id: 0,
            voice: None,
            theme_store,
            clipboard,
            notifier,
            config,
        };
        app.seed_transcript();
        if app.config.notify_prompt {
            app.scheduler
                .schedule(app.config.notify_prompt_delay_ms, None, Timer::NotifyPrompt);
        }
        app
    }

    fn seed_transcript(&mut self) {
        let Some(chat) = self.chats.active_id() else {
            return;
        };
        let now = Local::now();
        let lines = [
            (Origin::Other, "Morning! I pushed the new chat layout. Thoughts?", 6),
            (Origin::Me, "Looks great. The bubbles read well.", 5),
            (Origin::Me, "Can we tune the palette a little?", 5),
            (Origin::Other, "Sure, ask me about color tokens or label sizes.", 4),
        ];
        for (origin, text, minutes_ago) in lines {
            let id = self.next_id();
            let at = now - Duration::minutes(minutes_ago);
            let mut msg = match origin {
                Origin::Me => Message::mine(id, text, at),
                Origin::Other => Message::theirs(id, ASSISTANT_NAME, text, at),
            };
            msg.delivery = DeliveryState::Read;
            self.conversation_mut(chat).messages.push(msg);
        }
    }

    fn next_id(&mut self) -> MessageId {
        self.next_message_id += 1;
        self.next_message_id
    }

    fn conversation_mut(&mut self, chat: ChatId) -> &mut Conversation {
        self.conversations.entry(chat).or_default()
    }

    /// Messages of the active chat.
    pub fn transcript(&self) -> &[Message] {
        self.chats
            .active_id()
            .and_then(|id| self.conversations.get(&id))
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Typing indicator label for the active chat.
    pub fn typing(&self) -> Option<&'static str> {
        self.chats
            .active_id()
            .and_then(|id| self.conversations.get(&id))
            .filter(|c| c.is_typing())
            .map(|_| TYPING_LABEL)
    }

    /// Thread header; mirrors the active entry.
    pub fn header_title(&self) -> &str {
        self.chats
            .active()
            .map(|e| e.title.as_str())
            .unwrap_or("No conversation")
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn is_recording(&self) -> bool {
        self.voice.is_some_and(|h| self.scheduler.is_pending(h))
    }

    /// Catch the clock up to `wall_ms` since startup. Whole milliseconds are
    /// taken from the running total so sub-millisecond frames never drift.
    pub fn tick_to(&mut self, wall_ms: u64) {
        let elapsed = wall_ms.saturating_sub(self.scheduler.now_ms());
        self.tick(elapsed);
    }

    /// Advance the clock by `elapsed_ms` and run whatever came due.
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.animation_frame = (self.animation_frame + 1) % 360;
        for timer in self.scheduler.advance(elapsed_ms) {
            self.fire(timer);
        }
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::Delivery {
                chat,
                message,
                state,
            } => {
                if let Some(msg) = self
                    .conversations
                    .get_mut(&chat)
                    .and_then(|c| c.messages.iter_mut().find(|m| m.id == message))
                {
                    msg.advance_delivery(state);
                }
            }
            Timer::Reply { chat, prompt } => self.deliver_reply(chat, &prompt),
            Timer::BadgeFade(chat) => self.chats.finish_fade(chat),
            Timer::ToastExpire => self.ui.toast = None,
            Timer::VoiceDone => {
                self.voice = None;
                self.ui.input = VOICE_TRANSCRIPT.to_string();
                self.show_toast("✓ Voice recorded");
            }
            Timer::NotifyPrompt => {
                if self.permission == Permission::Default {
                    self.notify_prompt_visible = true;
                }
            }
        }
    }

    // --- Composer -------------------------------------------------------

    /// Send whatever is in the composer, or run it as a slash command.
    pub fn submit_message(&mut self) {
        if self.ui.input.trim().is_empty() {
            return;
        }
        if self.ui.input.trim_start().starts_with('/') {
            self.handle_command();
            return;
        }
        let raw = std::mem::take(&mut self.ui.input);
        if self.submit(&raw).is_none() {
            // Nothing was sent; give the text back
            self.ui.input = raw;
        }
    }

    /// Append a self-authored message to the active chat and schedule its
    /// delivery ticks and the assistant's reply. Blank input is ignored.
    pub fn submit(&mut self, raw: &str) -> Option<MessageId> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let Some(chat) = self.chats.active_id() else {
            self.show_toast("Start a chat first");
            return None;
        };

        let id = self.next_id();
        let now = Local::now();
        self.conversation_mut(chat)
            .messages
            .push(Message::mine(id, text, now));
        self.ui.input.clear();
        self.sheets.close_all();
        self.ui.scroll_offset = 0;
        self.chats.touch(chat, now);
        debug!("Sent message {} in chat {}", id, chat);

        let delivered = self.config.delivered_after_ms;
        let read = self.config.read_after_ms;
        self.scheduler.schedule(
            delivered,
            Some(chat),
            Timer::Delivery {
                chat,
                message: id,
                state: DeliveryState::Delivered,
            },
        );
        self.scheduler.schedule(
            read,
            Some(chat),
            Timer::Delivery {
                chat,
                message: id,
                state: DeliveryState::Read,
            },
        );
        self.schedule_reply(chat, text);
        Some(id)
    }

    /// Show the typing indicator and queue an assistant reply to `prompt`.
    pub fn schedule_reply(&mut self, chat: ChatId, prompt: &str) {
        let delay = reply::reply_delay_ms(self.config.reply_delay, &mut self.rng);
        self.conversation_mut(chat).pending_replies += 1;
        self.scheduler.schedule(
            delay,
            Some(chat),
            Timer::Reply {
                chat,
                prompt: prompt.to_string(),
            },
        );
        debug!("Reply for chat {} due in {}ms", chat, delay);
    }

    fn deliver_reply(&mut self, chat: ChatId, prompt: &str) {
        let text = reply::smart_reply(prompt, &mut self.rng);
        let id = self.next_id();
        let now = Local::now();
        let conv = self.conversation_mut(chat);
        conv.pending_replies = conv.pending_replies.saturating_sub(1);
        conv.messages
            .push(Message::theirs(id, ASSISTANT_NAME, text.clone(), now));
        self.chats.touch(chat, now);
        if self.chats.active_id() == Some(chat) {
            self.ui.scroll_offset = 0;
        }

        let muted = self.chats.get(chat).map(|e| e.muted).unwrap_or(false);
        if self.permission == Permission::Granted && !muted {
            if let Err(e) = self.notifier.notify(ASSISTANT_NAME, &text) {
                warn!("Reply notification dropped: {}", e);
            }
        }
    }

    // --- Chat list ------------------------------------------------------

    pub fn select_chat(&mut self, id: ChatId) {
        match self.chats.select(id) {
            Ok(outcome) => self.on_selected(id, outcome),
            Err(e) => warn!("Select failed: {}", e),
        }
    }

    fn on_selected(&mut self, id: ChatId, outcome: SelectOutcome) {
        if let SelectOutcome::Changed {
            previous,
            badge_fading,
        } = outcome
        {
            if badge_fading {
                self.scheduler
                    .schedule(self.config.badge_fade_ms, None, Timer::BadgeFade(id));
            }
            self.after_switch(previous);
        }
    }

    /// Housekeeping after the active chat changed away from `previous`.
    fn after_switch(&mut self, previous: Option<ChatId>) {
        if let Some(prev) = previous {
            let dropped = self
                .scheduler
                .cancel_matching(prev, |t| matches!(t, Timer::Reply { .. }));
            if dropped > 0 {
                debug!("Dropped {} pending replies for chat {}", dropped, prev);
            }
            if let Some(conv) = self.conversations.get_mut(&prev) {
                conv.reset_typing();
            }
        }
        self.ui.list_cursor = self.chats.active_id();
        self.ui.scroll_offset = 0;
        if self.config.is_narrow(self.ui.viewport_columns) {
            self.ui.sidebar_open = false;
        }
    }

    pub fn create_chat(&mut self) -> ChatId {
        let previous = self.chats.active_id();
        let id = self.chats.create(Local::now());
        self.conversations.insert(id, Conversation::default());
        self.after_switch(previous);
        info!("Created chat {}", id);
        self.show_toast("✓ New chat created");
        id
    }

    pub fn request_delete(&mut self, id: ChatId) {
        if self.chats.get(id).is_some() {
            self.confirm = Some(Confirm::DeleteChat(id));
        }
    }

    pub fn request_clear(&mut self) {
        if let Some(id) = self.chats.active_id() {
            self.confirm = Some(Confirm::ClearChat(id));
        }
    }

    pub fn request_archive(&mut self) {
        if let Some(id) = self.chats.active_id() {
            self.confirm = Some(Confirm::ArchiveChat(id));
        }
    }

    /// Answer the pending confirmation. Declining does nothing.
    pub fn resolve_confirm(&mut self, accept: bool) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        if !accept {
            return;
        }
        match confirm {
            Confirm::DeleteChat(id) => {
                let cancelled = self.scheduler.cancel_scope(id);
                self.conversations.remove(&id);
                match self.chats.remove(id) {
                    Ok(removal) => {
                        info!(
                            "Deleted chat {} ({} timers cancelled)",
                            removal.entry.title, cancelled
                        );
                        if let Some((next, outcome)) = removal.activated {
                            self.on_selected(next, outcome);
                        }
                        self.ui.list_cursor = self.chats.active_id();
                        self.show_toast("Chat deleted");
                    }
                    Err(e) => warn!("Delete failed: {}", e),
                }
            }
            Confirm::ClearChat(id) => {
                let cancelled = self.scheduler.cancel_scope(id);
                if let Some(conv) = self.conversations.get_mut(&id) {
                    conv.messages.clear();
                    conv.reset_typing();
                }
                debug!("Cleared chat {} ({} timers cancelled)", id, cancelled);
                self.ui.scroll_offset = 0;
                self.show_toast("✓ Messages cleared");
            }
            Confirm::ArchiveChat(_) => self.show_toast("📦 Chat archived"),
        }
    }

    pub fn sort_chats(&mut self) {
        self.chats.sort();
        self.show_toast("✓ Chats sorted");
    }

    pub fn search(&mut self, query: &str) {
        self.ui.search = query.to_string();
        self.chats.search(query);
    }

    pub fn mark_all_read(&mut self) {
        for id in self.chats.mark_all_read() {
            self.scheduler
                .schedule(self.config.badge_fade_ms, None, Timer::BadgeFade(id));
        }
        self.show_toast("✓ All marked as read");
    }

    pub fn mute_chat(&mut self) {
        if let Some(id) = self.chats.active_id() {
            if let Err(e) = self.chats.set_muted(id, true) {
                warn!("Mute failed: {}", e);
            }
            self.show_toast("🔕 Chat muted for 1 hour");
        }
    }

    /// Move the keyboard cursor through visible chats.
    pub fn list_step(&mut self, forward: bool) {
        let from = self.ui.list_cursor.or(self.chats.active_id());
        self.ui.list_cursor = self.chats.step_visible(from, forward);
    }

    pub fn list_activate(&mut self) {
        if let Some(id) = self.ui.list_cursor {
            self.select_chat(id);
        }
    }

    // --- Export and message actions -------------------------------------

    pub fn export_chat(&mut self) -> Option<PathBuf> {
        let title = self.header_title().to_string();
        let dir = self.config.data_dir.clone();
        match export::write(&dir, &title, self.transcript(), Local::now()) {
            Ok(path) => {
                info!("Exported chat to {}", path.display());
                self.show_toast("✓ Chat exported");
                Some(path)
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.show_toast("Export failed");
                None
            }
        }
    }

    /// Position in the active transcript of the `index`-th assistant message
    /// (1-based), or of the newest when `index` is `None`.
    fn assistant_message(&self, index: Option<usize>) -> Option<usize> {
        let positions: Vec<usize> = self
            .transcript()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.origin == Origin::Other)
            .map(|(i, _)| i)
            .collect();
        match index {
            None => positions.last().copied(),
            Some(n) => positions.get(n.checked_sub(1)?).copied(),
        }
    }

    pub fn copy_message(&mut self, index: Option<usize>) {
        let Some(pos) = self.assistant_message(index) else {
            self.show_toast("Nothing to copy");
            return;
        };
        let text = self.transcript()[pos].text.clone();
        match self.clipboard.set_text(&text) {
            Ok(()) => self.show_toast("✓ Copied to clipboard"),
            Err(e) => {
                warn!("{}", e);
                self.show_toast("Clipboard unavailable");
            }
        }
    }

    /// Toggle `reaction` on an assistant message; like and dislike exclude each other.
    pub fn react(&mut self, index: Option<usize>, reaction: Reaction) {
        let Some(pos) = self.assistant_message(index) else {
            self.show_toast("No assistant message");
            return;
        };
        let Some(chat) = self.chats.active_id() else {
            return;
        };
        let msg = &mut self.conversation_mut(chat).messages[pos];
        msg.reaction = if msg.reaction == reaction {
            Reaction::None
        } else {
            reaction
        };
        let toast = match (reaction, msg.reaction) {
            (Reaction::Liked, Reaction::Liked) => "👍 Liked",
            (Reaction::Liked, _) => "Like removed",
            (Reaction::Disliked, Reaction::Disliked) => "👎 Disliked",
            (Reaction::Disliked, _) => "Dislike removed",
            (Reaction::None, _) => return,
        };
        self.show_toast(toast);
    }

    // --- Theme, voice, notifications ------------------------------------

    pub fn toggle_theme(&mut self) {
        self.change_theme(self.theme.next());
    }

    pub fn change_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.theme_store.save(theme) {
            warn!("Theme not saved: {}", e);
        }
        self.show_toast(&format!("✓ Theme: {}", theme.label()));
    }

    pub fn toggle_voice(&mut self) {
        match self.voice.take() {
            Some(handle) => {
                self.scheduler.cancel(handle);
                self.show_toast("Recording cancelled");
            }
            None => {
                let handle = self
                    .scheduler
                    .schedule(self.config.voice_record_ms, None, Timer::VoiceDone);
                self.voice = Some(handle);
                self.show_toast("🎤 Recording...");
            }
        }
    }

    pub fn allow_notifications(&mut self) {
        self.notify_prompt_visible = false;
        self.permission = self.notifier.request_permission();
        if self.permission == Permission::Granted {
            self.show_toast("✓ Notifications enabled");
            if let Err(e) = self
                .notifier
                .notify("threadsim", "You'll now receive notifications for new messages")
            {
                warn!("Welcome notification dropped: {}", e);
            }
        }
    }

    pub fn deny_notifications(&mut self) {
        self.notify_prompt_visible = false;
        self.permission = Permission::Denied;
    }

    // --- Sheets, toasts, sidebar ----------------------------------------

    pub fn toggle_sheet(&mut self, sheet: SheetId) {
        self.sheets.toggle(sheet);
    }

    /// Activate the focused control of the open sheet.
    pub fn pick_sheet_item(&mut self) {
        let Some((sheet, item)) = self.sheets.focused_item() else {
            return;
        };
        match sheet {
            SheetId::Emoji => {
                self.ui.input.push_str(item);
                self.ui.focus = Focus::Input;
            }
            SheetId::Attach => self.show_toast(&format!("📎 {} attached (simulated)", item)),
        }
        self.sheets.close_all();
    }

    pub fn show_toast(&mut self, text: &str) {
        if let Some(old) = self.ui.toast.take() {
            self.scheduler.cancel(old.expiry);
        }
        let expiry = self
            .scheduler
            .schedule(self.config.toast_ms, None, Timer::ToastExpire);
        self.ui.toast = Some(Toast {
            text: text.to_string(),
            expiry,
        });
    }

    pub fn toggle_sidebar(&mut self) {
        self.ui.sidebar_open = !self.ui.sidebar_open;
    }

    pub fn cycle_focus(&mut self) {
        self.ui.focus = self.ui.focus.next();
        if self.ui.focus == Focus::ChatList && self.ui.list_cursor.is_none() {
            self.ui.list_cursor = self.chats.active_id();
        }
    }

    // --- Commands -------------------------------------------------------

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Help => self.ui.show_help = true,
            Action::NewChat => {
                self.create_chat();
            }
            Action::DeleteChat => {
                if let Some(id) = self.chats.active_id() {
                    self.request_delete(id);
                }
            }
            Action::ClearChat => self.request_clear(),
            Action::ExportChat => {
                self.export_chat();
            }
            Action::SortChats => self.sort_chats(),
            Action::Search { query } => {
                self.search(&query);
            }
            Action::Theme { theme: None } => self.toggle_theme(),
            Action::Theme { theme: Some(t) } => self.change_theme(t),
            Action::Copy { index } => self.copy_message(index),
            Action::Like { index } => self.react(index, Reaction::Liked),
            Action::Dislike { index } => self.react(index, Reaction::Disliked),
            Action::More { .. } => self.show_toast("More options coming soon!"),
            Action::Mute => self.mute_chat(),
            Action::Archive => self.request_archive(),
            Action::MarkAllRead => self.mark_all_read(),
            Action::EnableNotifications => self.allow_notifications(),
            Action::ToggleVoice => self.toggle_voice(),
            Action::ToggleSheet(sheet) => self.toggle_sheet(sheet),
            Action::ToggleSidebar => self.toggle_sidebar(),
            Action::Settings => self.show_toast("Settings panel coming soon!"),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Handle slash commands locally
    fn handle_command(&mut self) {
        let input = std::mem::take(&mut self.ui.input);
        self.ui.command_selection = None;
        match CommandParser::parse(&input) {
            Ok(action) => self.dispatch(action),
            Err(e) => self.show_toast(&e),
        }
    }

    /// Check if command popup should be shown
    pub fn showing_command_popup(&self) -> bool {
        self.ui.input.starts_with('/') && !self.ui.input.contains(' ')
    }

    /// Get filtered commands based on current input
    pub fn get_filtered_commands(&self) -> Vec<(&'static str, &'static str)> {
        if !self.ui.input.starts_with('/') {
            return vec![];
        }
        let filter = &self.ui.input[1..];
        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd[1..].starts_with(filter))
            .copied()
            .collect()
    }

    /// Move selection up in command popup
    pub fn command_select_up(&mut self) {
        let filtered = self.get_filtered_commands();
        if filtered.is_empty() {
            return;
        }

        // Cycle: None -> last command -> ... -> 0 -> None
        self.ui.command_selection = match self.ui.command_selection {
            None => Some(filtered.len() - 1),
            Some(0) => None,
            Some(n) => Some(n - 1),
        };
    }

    /// Move selection down in command popup
    pub fn command_select_down(&mut self) {
        let filtered = self.get_filtered_commands();
        if filtered.is_empty() {
            return;
        }

        // Cycle: None -> 0 -> 1 -> ... -> last -> None
        self.ui.command_selection = match self.ui.command_selection {
            None => Some(0),
            Some(n) if n >= filtered.len() - 1 => None,
            Some(n) => Some(n + 1),
        };
    }

    /// Apply selected command to input
    pub fn apply_command_selection(&mut self) {
        if let Some(idx) = self.ui.command_selection {
            let filtered = self.get_filtered_commands();
            if let Some((cmd, _)) = filtered.get(idx) {
                self.ui.input = cmd.to_string();
            }
        }
        self.ui.command_selection = None;
    }

    /// Reset command selection when input changes
    pub fn reset_command_selection(&mut self) {
        self.ui.command_selection = None;
    }

    pub fn scroll_up(&mut self) {
        // Offset counts rendered lines; the view clamps it to the real height
        let max = self.transcript().len() * 4;
        self.ui.scroll_offset = (self.ui.scroll_offset + self.config.scroll_step).min(max);
    }

    pub fn scroll_down(&mut self) {
        self.ui.scroll_offset = self.ui.scroll_offset.saturating_sub(self.config.scroll_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_list::Unread;
    use crate::config::ReplyDelay;
    use crate::platform::fake::{FakeClipboard, FakeNotifier};
    use crate::reply::{COLOR_REPLY, FALLBACK_REPLIES};

    struct Harness {
        app: App,
        clipboard: FakeClipboard,
        notifier: FakeNotifier,
        _dir: tempfile::TempDir,
    }

    fn harness_with(config: impl FnOnce(&mut Config)) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config {
            seed: Some(42),
            notify_prompt: false,
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        config(&mut cfg);
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::granting();
        let app = App::with_platform(cfg, Box::new(clipboard.clone()), Box::new(notifier.clone()));
        Harness {
            app,
            clipboard,
            notifier,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(|_| {})
    }

    fn others(app: &App) -> Vec<&Message> {
        app.transcript()
            .iter()
            .filter(|m| m.origin == Origin::Other)
            .collect()
    }

    #[test]
    fn test_submit_appends_one_self_message() {
        let mut h = harness();
        let before = h.app.transcript().len();
        h.app.ui.input = "  hello there ".to_string();
        h.app.submit_message();
        let t = h.app.transcript();
        assert_eq!(t.len(), before + 1);
        let last = t.last().unwrap();
        assert_eq!(last.origin, Origin::Me);
        assert_eq!(last.text, "hello there");
        assert_eq!(last.delivery, DeliveryState::Sent);
        assert!(h.app.ui.input.is_empty());
    }

    #[test]
    fn test_submit_joins_trailing_self_group() {
        let mut h = harness();
        h.app.submit("one");
        h.app.submit("two");
        let groups = crate::message::groups(h.app.transcript());
        let last = groups.last().unwrap();
        assert_eq!(last.origin, Origin::Me);
        assert_eq!(last.len, 2);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut h = harness();
        let before = h.app.transcript().len();
        for blank in ["", "   ", "\t\n"] {
            assert_eq!(h.app.submit(blank), None);
        }
        h.app.ui.input = "   ".to_string();
        h.app.submit_message();
        assert_eq!(h.app.transcript().len(), before);
        assert_eq!(h.app.pending_timers(), 0);
    }

    #[test]
    fn test_submit_closes_sheet() {
        let mut h = harness();
        h.app.toggle_sheet(SheetId::Emoji);
        h.app.submit("hi");
        assert_eq!(h.app.sheets.open(), None);
    }

    #[test]
    fn test_color_scenario() {
        let mut h = harness();
        let before = others(&h.app).len();
        h.app.submit("What color tokens should I use?");
        assert!(h.app.typing().is_some());
        assert_eq!(others(&h.app).len(), before);

        h.app.tick(1499);
        assert_eq!(others(&h.app).len(), before);
        h.app.tick(1001);
        assert!(h.app.typing().is_none());
        let replies = others(&h.app);
        assert_eq!(replies.len(), before + 1);
        assert_eq!(replies.last().unwrap().text, COLOR_REPLY);
        assert_eq!(replies.last().unwrap().author, ASSISTANT_NAME);
    }

    #[test]
    fn test_fixed_reply_delay() {
        let mut h = harness_with(|c| c.reply_delay = ReplyDelay::Fixed(1100));
        let before = h.app.transcript().len();
        h.app.submit("ok");
        h.app.tick(1099);
        assert_eq!(h.app.transcript().len(), before + 1);
        h.app.tick(1);
        assert_eq!(h.app.transcript().len(), before + 2);
        let text = &h.app.transcript().last().unwrap().text;
        assert!(FALLBACK_REPLIES.contains(&text.as_str()));
    }

    #[test]
    fn test_delivery_ticks_are_monotonic() {
        let mut h = harness();
        let id = h.app.submit("ping").unwrap();
        let state = |app: &App| app.transcript().iter().find(|m| m.id == id).unwrap().delivery;

        let mut seen = vec![state(&h.app)];
        for _ in 0..100 {
            h.app.tick(10);
            let s = state(&h.app);
            if *seen.last().unwrap() != s {
                seen.push(s);
            }
        }
        assert_eq!(
            seen,
            vec![DeliveryState::Sent, DeliveryState::Delivered, DeliveryState::Read]
        );
    }

    #[test]
    fn test_delivery_timing() {
        let mut h = harness();
        let id = h.app.submit("ping").unwrap();
        let state = |app: &App| app.transcript().iter().find(|m| m.id == id).unwrap().delivery;
        h.app.tick(299);
        assert_eq!(state(&h.app), DeliveryState::Sent);
        h.app.tick(1);
        assert_eq!(state(&h.app), DeliveryState::Delivered);
        h.app.tick(499);
        assert_eq!(state(&h.app), DeliveryState::Delivered);
        h.app.tick(1);
        assert_eq!(state(&h.app), DeliveryState::Read);
    }

    #[test]
    fn test_select_idempotent() {
        let mut h = harness();
        let target = h.app.chats.entries()[2].id;
        h.app.select_chat(target);
        h.app.select_chat(target);
        assert_eq!(h.app.chats.active_id(), Some(target));
        assert_eq!(h.app.header_title(), "Typography Pass");
        assert_eq!(h.app.chats.select(target).unwrap(), SelectOutcome::Unchanged);
    }

    #[test]
    fn test_select_fades_badge_after_delay() {
        let mut h = harness();
        let target = h.app.chats.entries()[1].id;
        h.app.select_chat(target);
        assert_eq!(h.app.chats.get(target).unwrap().unread, crate::chat_list::Unread::Fading);
        h.app.tick(300);
        assert_eq!(h.app.chats.get(target).unwrap().unread, crate::chat_list::Unread::Hidden);
    }

    #[test]
    fn test_select_closes_sidebar_on_narrow_viewport() {
        let mut h = harness();
        h.app.ui.viewport_columns = 80;
        let target = h.app.chats.entries()[1].id;
        h.app.select_chat(target);
        assert!(!h.app.ui.sidebar_open);

        let mut wide = harness();
        wide.app.ui.viewport_columns = 160;
        let target = wide.app.chats.entries()[1].id;
        wide.app.select_chat(target);
        assert!(wide.app.ui.sidebar_open);
    }

    #[test]
    fn test_delete_declined_then_accepted() {
        let mut h = harness();
        let target = h.app.chats.entries()[1].id;
        h.app.request_delete(target);
        h.app.resolve_confirm(false);
        assert_eq!(h.app.chats.len(), 5);
        assert!(h.app.confirm.is_none());

        h.app.request_delete(target);
        assert_eq!(h.app.confirm, Some(Confirm::DeleteChat(target)));
        h.app.resolve_confirm(true);
        assert_eq!(h.app.chats.len(), 4);
        assert!(h.app.chats.get(target).is_none());
        h.app.select_chat(target);
        assert_ne!(h.app.chats.active_id(), Some(target));
        assert_eq!(h.app.ui.toast_text(), Some("Chat deleted"));
    }

    #[test]
    fn test_delete_active_keeps_one_active() {
        let mut h = harness();
        let active = h.app.chats.active_id().unwrap();
        h.app.request_delete(active);
        h.app.resolve_confirm(true);
        let now_active = h.app.chats.active().unwrap();
        assert_eq!(h.app.header_title(), now_active.title);
    }

    #[test]
    fn test_clear_cancels_pending_reply() {
        let mut h = harness();
        h.app.submit("What color tokens should I use?");
        h.app.request_clear();
        h.app.resolve_confirm(true);
        assert!(h.app.transcript().is_empty());
        assert!(h.app.typing().is_none());
        h.app.tick(5000);
        assert!(h.app.transcript().is_empty());
    }

    #[test]
    fn test_clear_declined_keeps_messages() {
        let mut h = harness();
        let before = h.app.transcript().len();
        h.app.request_clear();
        h.app.resolve_confirm(false);
        assert_eq!(h.app.transcript().len(), before);
    }

    #[test]
    fn test_switch_cancels_pending_reply() {
        let mut h = harness();
        let first = h.app.chats.active_id().unwrap();
        h.app.submit("hello");
        let other = h.app.chats.entries()[1].id;
        h.app.select_chat(other);
        h.app.tick(5000);
        assert!(h.app.transcript().is_empty());
        h.app.select_chat(first);
        let last = h.app.transcript().last().unwrap();
        assert_eq!(last.origin, Origin::Me);
        // delivery ticks still ran for the message itself
        assert_eq!(last.delivery, DeliveryState::Read);
        assert!(h.app.typing().is_none());
    }

    #[test]
    fn test_delete_cancels_scope() {
        let mut h = harness();
        let chat = h.app.chats.active_id().unwrap();
        h.app.submit("hello");
        assert!(h.app.pending_timers() >= 3);
        h.app.request_delete(chat);
        h.app.resolve_confirm(true);
        // toast expiry plus the badge fade of the chat that took over
        assert_eq!(h.app.pending_timers(), 2);
    }

    #[test]
    fn test_delete_active_fades_new_active_badge() {
        let mut h = harness_with(|c| c.units_per_column = 1);
        let active = h.app.chats.active_id().unwrap();
        h.app.request_delete(active);
        h.app.resolve_confirm(true);
        let now_active = h.app.chats.active().unwrap();
        assert_eq!(now_active.title, "Mesh Network");
        assert_eq!(now_active.unread, Unread::Fading);
        // narrow viewport rule applies as on a normal select
        assert!(!h.app.ui.sidebar_open);
        h.app.tick(300);
        assert_eq!(h.app.chats.active().unwrap().unread, Unread::Hidden);
    }

    #[test]
    fn test_tick_to_tracks_wall_clock() {
        let mut h = harness_with(|c| c.reply_delay = ReplyDelay::Fixed(2000));
        h.app.submit("hello");
        // frames of 16.6 ms, reported as whole-millisecond totals
        let mut wall = 0.0_f64;
        while wall < 1999.0 {
            wall += 16.6;
            h.app.tick_to(wall as u64);
            if (wall as u64) < 2000 {
                assert!(h.app.typing().is_some());
            }
        }
        h.app.tick_to(2000);
        assert!(h.app.typing().is_none());
    }

    #[test]
    fn test_create_chat() {
        let mut h = harness();
        let id = h.app.create_chat();
        assert_eq!(h.app.chats.entries()[0].id, id);
        assert_eq!(h.app.chats.active_id(), Some(id));
        assert_eq!(h.app.header_title(), "New Chat 1");
        assert!(h.app.transcript().is_empty());
    }

    #[test]
    fn test_search_hides_entries() {
        let mut h = harness();
        h.app.search("standup");
        assert_eq!(h.app.chats.len(), 5);
        assert_eq!(h.app.chats.visible().count(), 1);
    }

    #[test]
    fn test_toggle_sheets() {
        let mut h = harness();
        h.app.toggle_sheet(SheetId::Emoji);
        h.app.toggle_sheet(SheetId::Emoji);
        assert_eq!(h.app.sheets.open(), None);

        h.app.toggle_sheet(SheetId::Emoji);
        h.app.toggle_sheet(SheetId::Attach);
        assert_eq!(h.app.sheets.open(), Some(SheetId::Attach));
    }

    #[test]
    fn test_pick_emoji_appends_to_input() {
        let mut h = harness();
        h.app.ui.input = "nice ".to_string();
        h.app.toggle_sheet(SheetId::Emoji);
        h.app.pick_sheet_item();
        assert_eq!(h.app.ui.input, "nice 😀");
        assert_eq!(h.app.sheets.open(), None);
    }

    #[test]
    fn test_toast_expires_and_replaces() {
        let mut h = harness();
        h.app.show_toast("first");
        h.app.tick(1000);
        h.app.show_toast("second");
        h.app.tick(1000);
        assert_eq!(h.app.ui.toast_text(), Some("second"));
        h.app.tick(400);
        assert_eq!(h.app.ui.toast_text(), None);
    }

    #[test]
    fn test_theme_cycle_persists() {
        let mut h = harness();
        assert_eq!(h.app.theme, Theme::Dark);
        h.app.toggle_theme();
        assert_eq!(h.app.theme, Theme::Light);
        assert_eq!(h.app.ui.toast_text(), Some("✓ Theme: Light"));
        let store = ThemeStore::new(&h.app.config.data_dir);
        assert_eq!(store.load(), Theme::Light);
    }

    #[test]
    fn test_voice_simulation() {
        let mut h = harness();
        h.app.toggle_voice();
        assert!(h.app.is_recording());
        h.app.tick(3000);
        assert!(!h.app.is_recording());
        assert_eq!(h.app.ui.input, VOICE_TRANSCRIPT);
        assert_eq!(h.app.ui.toast_text(), Some("✓ Voice recorded"));
    }

    #[test]
    fn test_voice_cancel() {
        let mut h = harness();
        h.app.toggle_voice();
        h.app.toggle_voice();
        h.app.tick(5000);
        assert!(h.app.ui.input.is_empty());
    }

    #[test]
    fn test_copy_message() {
        let mut h = harness();
        h.app.copy_message(None);
        assert_eq!(
            h.clipboard.writes.borrow().as_slice(),
            ["Sure, ask me about color tokens or label sizes.".to_string()]
        );
        assert_eq!(h.app.ui.toast_text(), Some("✓ Copied to clipboard"));
        h.app.copy_message(Some(1));
        assert_eq!(h.clipboard.writes.borrow()[1], "Morning! I pushed the new chat layout. Thoughts?");
    }

    #[test]
    fn test_copy_failure_is_a_toast() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            seed: Some(1),
            notify_prompt: false,
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let clipboard = FakeClipboard {
            broken: true,
            ..FakeClipboard::default()
        };
        let mut app = App::with_platform(cfg, Box::new(clipboard), Box::new(FakeNotifier::granting()));
        app.copy_message(None);
        assert_eq!(app.ui.toast_text(), Some("Clipboard unavailable"));
    }

    #[test]
    fn test_like_dislike_exclusive() {
        let mut h = harness();
        h.app.react(None, Reaction::Liked);
        assert_eq!(h.app.transcript().last().unwrap().reaction, Reaction::Liked);
        h.app.react(None, Reaction::Disliked);
        assert_eq!(h.app.transcript().last().unwrap().reaction, Reaction::Disliked);
        h.app.react(None, Reaction::Disliked);
        assert_eq!(h.app.transcript().last().unwrap().reaction, Reaction::None);
        assert_eq!(h.app.ui.toast_text(), Some("Dislike removed"));
    }

    #[test]
    fn test_notifications_on_reply() {
        let mut h = harness();
        h.app.allow_notifications();
        assert_eq!(h.app.permission, Permission::Granted);
        assert_eq!(h.notifier.sent.borrow().len(), 1);
        h.app.submit("thanks");
        h.app.tick(2500);
        let sent = h.notifier.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].0, ASSISTANT_NAME);
    }

    #[test]
    fn test_muted_chat_does_not_notify() {
        let mut h = harness();
        h.app.allow_notifications();
        h.app.mute_chat();
        h.app.submit("thanks");
        h.app.tick(2500);
        assert_eq!(h.notifier.sent.borrow().len(), 1);
    }

    #[test]
    fn test_notify_prompt_appears_after_delay() {
        let mut h = harness_with(|c| c.notify_prompt = true);
        h.app.tick(2999);
        assert!(!h.app.notify_prompt_visible);
        h.app.tick(1);
        assert!(h.app.notify_prompt_visible);
        h.app.deny_notifications();
        assert!(!h.app.notify_prompt_visible);
        assert_eq!(h.app.permission, Permission::Denied);

        // /notify still asks again later
        h.app.dispatch(Action::EnableNotifications);
        assert_eq!(h.app.permission, Permission::Granted);
    }

    #[test]
    fn test_export_writes_file() {
        let mut h = harness();
        let path = h.app.export_chat().unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Design_Review_"));
        let body = std::fs::read_to_string(path).unwrap();
        assert!(body.contains("Assistant: Morning!"));
    }

    #[test]
    fn test_slash_command_is_not_sent() {
        let mut h = harness();
        let before = h.app.transcript().len();
        h.app.ui.input = "/new".to_string();
        h.app.submit_message();
        assert_eq!(h.app.header_title(), "New Chat 1");
        assert!(h.app.ui.input.is_empty());
        let original = h.app.chats.entries()[1].id;
        h.app.select_chat(original);
        assert_eq!(h.app.transcript().len(), before);
    }

    #[test]
    fn test_unknown_command_toasts() {
        let mut h = harness();
        h.app.ui.input = "/bogus".to_string();
        h.app.submit_message();
        assert!(h.app.ui.toast_text().unwrap().starts_with("Unknown command"));
    }

    #[test]
    fn test_more_options_toast() {
        let mut h = harness();
        h.app.dispatch(Action::More { index: None });
        assert_eq!(h.app.ui.toast_text(), Some("More options coming soon!"));
    }

    #[test]
    fn test_command_popup_filtering() {
        let mut h = harness();
        h.app.ui.input = "/s".to_string();
        assert!(h.app.showing_command_popup());
        let cmds: Vec<&str> = h.app.get_filtered_commands().iter().map(|(c, _)| *c).collect();
        assert_eq!(cmds, vec!["/sort", "/search", "/settings"]);
        h.app.command_select_down();
        h.app.apply_command_selection();
        assert_eq!(h.app.ui.input, "/sort");
    }

    #[test]
    fn test_mark_all_read() {
        let mut h = harness();
        h.app.mark_all_read();
        h.app.tick(300);
        assert!(h
            .app
            .chats
            .entries()
            .iter()
            .all(|e| e.unread == crate::chat_list::Unread::Hidden));
    }

    #[test]
    fn test_archive_requires_confirmation() {
        let mut h = harness();
        h.app.request_archive();
        h.app.resolve_confirm(false);
        assert_eq!(h.app.ui.toast_text(), None);
        h.app.request_archive();
        h.app.resolve_confirm(true);
        assert_eq!(h.app.ui.toast_text(), Some("📦 Chat archived"));
    }
}
