use crate::chat_list::ChatId;
use crate::scheduler::TimerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    ChatList,
    Search,
    Thread,
    #[default]
    Input,
}

impl Focus {
    /// Tab order
    pub fn next(self) -> Focus {
        match self {
            Focus::ChatList => Focus::Thread,
            Focus::Thread => Focus::Input,
            Focus::Input => Focus::ChatList,
            Focus::Search => Focus::ChatList,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub expiry: TimerHandle,
}

#[derive(Debug)]
pub struct UIState {
    pub input: String,
    pub search: String,
    pub scroll_offset: usize,

    // Command popup state
    pub command_selection: Option<usize>,

    // Which panel is focused
    pub focus: Focus,

    // Keyboard cursor in the chat list
    pub list_cursor: Option<ChatId>,

    pub sidebar_open: bool,
    pub show_help: bool,
    pub toast: Option<Toast>,

    // Terminal width in columns, refreshed on resize
    pub viewport_columns: u16,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            input: String::new(),
            search: String::new(),
            scroll_offset: 0,
            command_selection: None,
            focus: Focus::Input,
            list_cursor: None,
            sidebar_open: true,
            show_help: false,
            toast: None,
            viewport_columns: 120,
        }
    }
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.text.as_str())
    }
}
