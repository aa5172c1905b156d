use crate::sheet::SheetId;
use crate::theme::Theme;

/// User actions that can be triggered by commands, shortcuts or mouse.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Show help message
    Help,
    /// Start a new chat
    NewChat,
    /// Ask to delete the active chat
    DeleteChat,
    /// Ask to clear the active transcript
    ClearChat,
    /// Write the transcript to a text file
    ExportChat,
    /// Reorder chats by activity
    SortChats,
    /// Filter the chat list
    Search { query: String },
    /// Cycle theme, or set one
    Theme { theme: Option<Theme> },
    /// Copy an assistant message (1-based, newest when omitted)
    Copy { index: Option<usize> },
    Like { index: Option<usize> },
    Dislike { index: Option<usize> },
    /// Further message options
    More { index: Option<usize> },
    Mute,
    /// Ask to archive the active chat
    Archive,
    MarkAllRead,
    /// Ask for notification permission
    EnableNotifications,
    ToggleVoice,
    ToggleSheet(SheetId),
    ToggleSidebar,
    Settings,
    /// Quit application
    Quit,
}
