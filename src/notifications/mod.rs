use crate::error::NoteResult;
use crate::models::{Notification, NotificationKind};
use crate::storage::{PersistenceGateway, NOTIFICATIONS_KEY};
use crate::util::new_id;

/// Newest-first notification history, persisted next to the notes.
pub struct NotificationLog {
    items: Vec<Notification>,
    gateway: PersistenceGateway,
}

impl NotificationLog {
    pub fn load(gateway: PersistenceGateway) -> Self {
        let items = gateway
            .load_json::<Vec<Notification>>(NOTIFICATIONS_KEY)
            .unwrap_or_default();
        Self { items, gateway }
    }

    fn save(&self) -> NoteResult<()> {
        self.gateway.save_json(NOTIFICATIONS_KEY, &self.items)
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn add(
        &mut self,
        title: &str,
        message: &str,
        kind: NotificationKind,
        now_ms: i64,
    ) -> NoteResult<String> {
        let id = new_id(now_ms);
        self.items.insert(
            0,
            Notification {
                id: id.clone(),
                title: title.to_string(),
                message: message.to_string(),
                kind,
                timestamp: now_ms,
                read: false,
            },
        );
        self.save()?;
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> NoteResult<()> {
        self.items.retain(|n| n.id != id);
        self.save()
    }

    pub fn clear_all(&mut self) -> NoteResult<()> {
        self.items.clear();
        self.save()
    }

    pub fn mark_all_read(&mut self) -> NoteResult<()> {
        for n in self.items.iter_mut() {
            n.read = true;
        }
        self.save()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }
}
