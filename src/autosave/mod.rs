/// Identity of one scheduled timer. A fire carrying a ticket that is no
/// longer current is stale and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SaveTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeupKind {
    /// Debounce elapsed: commit the draft.
    AutoSave,
    /// "Saved" display window elapsed: return the indicator to idle.
    ResetIndicator,
}

/// A delayed callback the host must arrange (e.g. `setTimeout`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wakeup {
    pub ticket: SaveTicket,
    pub kind: WakeupKind,
    pub delay_ms: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    /// Edits pending; a commit is scheduled.
    Saving,
    Saved {
        at_ms: i64,
    },
    Failed {
        message: String,
    },
}

/// Debounce state for auto-save.
///
/// The scheduler never runs anything itself. [`AutoSaveScheduler::arm`] and
/// friends hand back a [`Wakeup`]; the host delivers it later and the owner
/// checks it with [`AutoSaveScheduler::take_autosave`] /
/// [`AutoSaveScheduler::reset_indicator`]. Tickets come from a monotonically
/// increasing counter, so at most one auto-save is ever live.
#[derive(Clone, Debug)]
pub struct AutoSaveScheduler {
    delay_ms: u32,
    indicator_ms: u32,
    next_ticket: u64,
    pending: Option<SaveTicket>,
    indicator: Option<SaveTicket>,
    status: SaveStatus,
}

impl AutoSaveScheduler {
    pub fn new(delay_ms: u32, indicator_ms: u32) -> Self {
        Self {
            delay_ms,
            indicator_ms,
            next_ticket: 0,
            pending: None,
            indicator: None,
            status: SaveStatus::Idle,
        }
    }

    fn issue(&mut self) -> SaveTicket {
        self.next_ticket += 1;
        SaveTicket(self.next_ticket)
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// (Re)starts the quiet period, superseding any pending auto-save.
    pub fn arm(&mut self) -> Wakeup {
        let ticket = self.issue();
        self.pending = Some(ticket);
        self.status = SaveStatus::Saving;
        Wakeup {
            ticket,
            kind: WakeupKind::AutoSave,
            delay_ms: self.delay_ms,
        }
    }

    /// Drops the pending auto-save, if any. Status is left to the caller.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Claims the pending auto-save if `ticket` is still the current one.
    pub fn take_autosave(&mut self, ticket: SaveTicket) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Nothing to commit; back to idle.
    pub fn mark_idle(&mut self) {
        self.indicator = None;
        self.status = SaveStatus::Idle;
    }

    pub fn mark_saved(&mut self, now_ms: i64) -> Wakeup {
        let ticket = self.issue();
        self.indicator = Some(ticket);
        self.status = SaveStatus::Saved { at_ms: now_ms };
        Wakeup {
            ticket,
            kind: WakeupKind::ResetIndicator,
            delay_ms: self.indicator_ms,
        }
    }

    /// No retry is scheduled; the next edit re-arms normally.
    pub fn mark_failed(&mut self, message: &str) {
        self.indicator = None;
        self.status = SaveStatus::Failed {
            message: message.to_string(),
        };
    }

    /// Ends the "saved" display unless a newer save state replaced it.
    pub fn reset_indicator(&mut self, ticket: SaveTicket) -> bool {
        if self.indicator != Some(ticket) {
            return false;
        }
        self.indicator = None;
        if matches!(self.status, SaveStatus::Saved { .. }) {
            self.status = SaveStatus::Idle;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_returns_debounce_wakeup() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        let w = s.arm();
        assert_eq!(w.kind, WakeupKind::AutoSave);
        assert_eq!(w.delay_ms, 2000);
        assert_eq!(s.status(), &SaveStatus::Saving);
        assert!(s.is_pending());
    }

    #[test]
    fn test_rearm_makes_previous_ticket_stale() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        let first = s.arm();
        let second = s.arm();
        assert_ne!(first.ticket, second.ticket);

        assert!(!s.take_autosave(first.ticket));
        assert!(s.is_pending());
        assert!(s.take_autosave(second.ticket));
        assert!(!s.take_autosave(second.ticket));
    }

    #[test]
    fn test_cancel_invalidates_pending() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        let w = s.arm();
        s.cancel();
        assert!(!s.take_autosave(w.ticket));
    }

    #[test]
    fn test_saved_indicator_resets_after_window() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        let w = s.mark_saved(42);
        assert_eq!(w.kind, WakeupKind::ResetIndicator);
        assert_eq!(w.delay_ms, 3000);
        assert_eq!(s.status(), &SaveStatus::Saved { at_ms: 42 });

        assert!(s.reset_indicator(w.ticket));
        assert_eq!(s.status(), &SaveStatus::Idle);
    }

    #[test]
    fn test_new_edit_keeps_saving_state_over_stale_reset() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        let saved = s.mark_saved(1);
        s.arm();

        // The display window of the earlier save ends while a new save is pending.
        s.reset_indicator(saved.ticket);
        assert_eq!(s.status(), &SaveStatus::Saving);
    }

    #[test]
    fn test_older_saved_indicator_does_not_clear_newer_one() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        let first = s.mark_saved(1);
        let second = s.mark_saved(2);

        assert!(!s.reset_indicator(first.ticket));
        assert_eq!(s.status(), &SaveStatus::Saved { at_ms: 2 });
        assert!(s.reset_indicator(second.ticket));
        assert_eq!(s.status(), &SaveStatus::Idle);
    }

    #[test]
    fn test_failed_status_sticks_until_next_arm() {
        let mut s = AutoSaveScheduler::new(2000, 3000);
        s.mark_failed("disk full");
        assert_eq!(
            s.status(),
            &SaveStatus::Failed {
                message: "disk full".to_string()
            }
        );
        assert!(!s.is_pending());
        s.arm();
        assert_eq!(s.status(), &SaveStatus::Saving);
    }
}
