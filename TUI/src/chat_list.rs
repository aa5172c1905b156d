use chrono::{DateTime, Duration, Local};

use crate::error::{AppError, Result};

pub type ChatId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unread {
    Hidden,
    Visible(u32),
    /// Badge is on its way out; removed when the fade timer fires
    Fading,
}

#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: ChatId,
    pub title: String,
    pub activity_label: String,
    /// Ordering key behind `activity_label`
    pub activity_at: DateTime<Local>,
    pub unread: Unread,
    pub muted: bool,
    /// Filtered out by the current search
    pub hidden: bool,
}

impl ChatEntry {
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.activity_label.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Target was already active; nothing changed
    Unchanged,
    Changed {
        previous: Option<ChatId>,
        badge_fading: bool,
    },
}

/// Result of `ChatList::remove`.
#[derive(Debug)]
pub struct Removal {
    pub entry: ChatEntry,
    /// The entry that took over when the removed one was active
    pub activated: Option<(ChatId, SelectOutcome)>,
}

#[derive(Debug, Default)]
pub struct ChatList {
    entries: Vec<ChatEntry>,
    active: Option<ChatId>,
    next_id: ChatId,
    created: u32,
}

impl ChatList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample conversations shown on startup. The first one is active.
    pub fn demo(now: DateTime<Local>) -> Self {
        let mut list = Self::new();
        let seed: [(&str, &str, i64, u32); 5] = [
            ("Design Review", "2m", 2, 0),
            ("Mesh Network", "15m", 15, 2),
            ("Typography Pass", "1h", 60, 0),
            ("Team Standup", "Yesterday", 60 * 24, 1),
            ("Color Tokens", "Mon", 60 * 24 * 4, 0),
        ];
        for (title, label, minutes_ago, unread) in seed {
            list.push(ChatEntry {
                id: 0,
                title: title.to_string(),
                activity_label: label.to_string(),
                activity_at: now - Duration::minutes(minutes_ago),
                unread: if unread > 0 {
                    Unread::Visible(unread)
                } else {
                    Unread::Hidden
                },
                muted: false,
                hidden: false,
            });
        }
        list.active = list.entries.first().map(|e| e.id);
        list
    }

    /// Append an entry, assigning it a fresh id.
    pub fn push(&mut self, mut entry: ChatEntry) -> ChatId {
        self.next_id += 1;
        entry.id = self.next_id;
        let id = entry.id;
        self.entries.push(entry);
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn visible(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter().filter(|e| !e.hidden)
    }

    pub fn get(&self, id: ChatId) -> Option<&ChatEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ChatId) -> Option<&mut ChatEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn active_id(&self) -> Option<ChatId> {
        self.active
    }

    pub fn active(&self) -> Option<&ChatEntry> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: ChatId) -> Result<SelectOutcome> {
        if self.get(id).is_none() {
            return Err(AppError::UnknownChat(id));
        }
        if self.active == Some(id) {
            return Ok(SelectOutcome::Unchanged);
        }
        let previous = self.active.replace(id);
        let mut badge_fading = false;
        if let Some(entry) = self.get_mut(id) {
            if let Unread::Visible(_) = entry.unread {
                entry.unread = Unread::Fading;
                badge_fading = true;
            }
        }
        Ok(SelectOutcome::Changed {
            previous,
            badge_fading,
        })
    }

    /// Complete a badge fade started by `select` or `mark_all_read`.
    pub fn finish_fade(&mut self, id: ChatId) {
        if let Some(entry) = self.get_mut(id) {
            if entry.unread == Unread::Fading {
                entry.unread = Unread::Hidden;
            }
        }
    }

    /// Start fading every visible badge; returns the affected ids.
    pub fn mark_all_read(&mut self) -> Vec<ChatId> {
        let mut ids = Vec::new();
        for entry in &mut self.entries {
            if let Unread::Visible(_) = entry.unread {
                entry.unread = Unread::Fading;
                ids.push(entry.id);
            }
        }
        ids
    }

    /// Remove an entry permanently. If it was active, the first remaining
    /// entry is selected the same way `select` would.
    pub fn remove(&mut self, id: ChatId) -> Result<Removal> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(AppError::UnknownChat(id))?;
        let entry = self.entries.remove(idx);
        let mut activated = None;
        if self.active == Some(id) {
            self.active = None;
            if let Some(next) = self.entries.first().map(|e| e.id) {
                activated = Some((next, self.select(next)?));
            }
        }
        Ok(Removal { entry, activated })
    }

    /// Insert a fresh chat at the head of the list and make it active.
    pub fn create(&mut self, now: DateTime<Local>) -> ChatId {
        self.created += 1;
        self.next_id += 1;
        let id = self.next_id;
        let entry = ChatEntry {
            id,
            title: format!("New Chat {}", self.created),
            activity_label: "Just now".to_string(),
            activity_at: now,
            unread: Unread::Hidden,
            muted: false,
            hidden: false,
        };
        self.entries.insert(0, entry);
        self.active = Some(id);
        id
    }

    /// Most recent activity first. Ties keep their current order.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.activity_at.cmp(&a.activity_at));
    }

    /// Hide entries whose title and activity label both miss `query`.
    pub fn search(&mut self, query: &str) {
        let needle = query.trim().to_lowercase();
        for entry in &mut self.entries {
            entry.hidden = !needle.is_empty() && !entry.matches(&needle);
        }
    }

    pub fn touch(&mut self, id: ChatId, now: DateTime<Local>) {
        if let Some(entry) = self.get_mut(id) {
            entry.activity_label = "Just now".to_string();
            entry.activity_at = now;
        }
    }

    pub fn set_muted(&mut self, id: ChatId, muted: bool) -> Result<()> {
        let entry = self.get_mut(id).ok_or(AppError::UnknownChat(id))?;
        entry.muted = muted;
        Ok(())
    }

    /// Neighbouring visible entry for keyboard navigation. Clamps at the ends.
    pub fn step_visible(&self, from: Option<ChatId>, forward: bool) -> Option<ChatId> {
        let visible: Vec<ChatId> = self.visible().map(|e| e.id).collect();
        if visible.is_empty() {
            return None;
        }
        let pos = from.and_then(|id| visible.iter().position(|v| *v == id));
        let idx = match (pos, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(visible.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        Some(visible[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> ChatList {
        ChatList::demo(Local::now())
    }

    #[test]
    fn test_demo_has_one_active() {
        let l = list();
        assert_eq!(l.len(), 5);
        assert_eq!(l.active().map(|e| e.title.as_str()), Some("Design Review"));
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut l = list();
        let target = l.entries()[1].id;
        assert!(matches!(l.select(target).unwrap(), SelectOutcome::Changed { .. }));
        assert_eq!(l.select(target).unwrap(), SelectOutcome::Unchanged);
        assert_eq!(l.active_id(), Some(target));
    }

    #[test]
    fn test_select_fades_badge() {
        let mut l = list();
        let target = l.entries()[1].id;
        let outcome = l.select(target).unwrap();
        assert_eq!(
            outcome,
            SelectOutcome::Changed {
                previous: Some(l.entries()[0].id),
                badge_fading: true
            }
        );
        assert_eq!(l.get(target).unwrap().unread, Unread::Fading);
        l.finish_fade(target);
        assert_eq!(l.get(target).unwrap().unread, Unread::Hidden);
    }

    #[test]
    fn test_select_unknown() {
        let mut l = list();
        assert!(matches!(l.select(999), Err(AppError::UnknownChat(999))));
    }

    #[test]
    fn test_remove_active_moves_selection() {
        let mut l = list();
        let first = l.entries()[0].id;
        let second = l.entries()[1].id;
        let removal = l.remove(first).unwrap();
        assert_eq!(removal.entry.id, first);
        assert_eq!(
            removal.activated,
            Some((
                second,
                SelectOutcome::Changed {
                    previous: None,
                    badge_fading: true
                }
            ))
        );
        assert_eq!(l.len(), 4);
        assert_eq!(l.active_id(), Some(second));
        assert_eq!(l.get(second).unwrap().unread, Unread::Fading);
        assert!(l.select(first).is_err());
    }

    #[test]
    fn test_remove_last_leaves_none_active() {
        let mut l = ChatList::new();
        let now = Local::now();
        let id = l.create(now);
        assert!(l.remove(id).unwrap().activated.is_none());
        assert!(l.is_empty());
        assert_eq!(l.active_id(), None);
    }

    #[test]
    fn test_create_inserts_at_head_and_selects() {
        let mut l = list();
        let id = l.create(Local::now());
        assert_eq!(l.entries()[0].id, id);
        assert_eq!(l.entries()[0].title, "New Chat 1");
        assert_eq!(l.active_id(), Some(id));
        let id2 = l.create(Local::now());
        assert_eq!(l.get(id2).unwrap().title, "New Chat 2");
    }

    #[test]
    fn test_sort_by_activity_time() {
        let mut l = list();
        let now = Local::now();
        let oldest = l.entries()[4].id;
        l.touch(oldest, now + Duration::minutes(1));
        l.sort();
        assert_eq!(l.entries()[0].id, oldest);
        // "Yesterday" sorts after "1h" even though it is lexically larger
        let titles: Vec<&str> = l.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Color Tokens", "Design Review", "Mesh Network", "Typography Pass", "Team Standup"]
        );
    }

    #[test]
    fn test_search_hides_without_removing() {
        let mut l = list();
        l.search("MESH");
        assert_eq!(l.len(), 5);
        let visible: Vec<&str> = l.visible().map(|e| e.title.as_str()).collect();
        assert_eq!(visible, vec!["Mesh Network"]);
        l.search("yester");
        let visible: Vec<&str> = l.visible().map(|e| e.title.as_str()).collect();
        assert_eq!(visible, vec!["Team Standup"]);
        l.search("");
        assert_eq!(l.visible().count(), 5);
    }

    #[test]
    fn test_step_visible_skips_hidden() {
        let mut l = list();
        l.search("e");
        assert_eq!(l.visible().count(), 4);
        let ids: Vec<ChatId> = l.visible().map(|e| e.id).collect();
        assert_eq!(l.step_visible(None, true), Some(ids[0]));
        l.search("mesh");
        let only = l.visible().next().unwrap().id;
        assert_eq!(l.step_visible(Some(only), true), Some(only));
        assert_eq!(l.step_visible(Some(only), false), Some(only));
    }

    #[test]
    fn test_mark_all_read() {
        let mut l = list();
        let ids = l.mark_all_read();
        assert_eq!(ids.len(), 2);
        for id in ids {
            assert_eq!(l.get(id).unwrap().unread, Unread::Fading);
        }
    }
}
