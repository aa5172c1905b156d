use crate::config::{ATTACHMENTS, EMOJIS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetId {
    Attach,
    Emoji,
}

impl SheetId {
    pub fn title(self) -> &'static str {
        match self {
            SheetId::Attach => " Attach ",
            SheetId::Emoji => " Emoji ",
        }
    }

    pub fn items(self) -> &'static [&'static str] {
        match self {
            SheetId::Attach => ATTACHMENTS,
            SheetId::Emoji => EMOJIS,
        }
    }
}

/// Which popup sheet is open, and the focused control inside it.
#[derive(Debug, Default)]
pub struct Sheets {
    open: Option<SheetId>,
    focus: usize,
}

impl Sheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) -> Option<SheetId> {
        self.open
    }

    pub fn is_open(&self, sheet: SheetId) -> bool {
        self.open == Some(sheet)
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Close `sheet` if it is open, otherwise close everything else and open it.
    pub fn toggle(&mut self, sheet: SheetId) {
        let was_open = self.is_open(sheet);
        self.close_all();
        if !was_open {
            self.open = Some(sheet);
            self.focus = 0;
        }
    }

    pub fn close_all(&mut self) -> bool {
        self.focus = 0;
        self.open.take().is_some()
    }

    /// A mouse press landed somewhere; `inside` tells whether it hit the open sheet.
    pub fn pointer_down(&mut self, inside: bool) -> bool {
        if inside {
            return false;
        }
        self.close_all()
    }

    pub fn move_focus(&mut self, delta: isize) {
        let Some(sheet) = self.open else {
            return;
        };
        let len = sheet.items().len() as isize;
        if len == 0 {
            return;
        }
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// The item under focus, if a sheet is open.
    pub fn focused_item(&self) -> Option<(SheetId, &'static str)> {
        let sheet = self.open?;
        sheet.items().get(self.focus).map(|item| (sheet, *item))
    }
}
