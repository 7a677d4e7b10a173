//! Edit dialog state for the detail screen.
//!
//! The form owns its three fields directly. The category picker and the date
//! picker write straight into the field they belong to, so there is never any
//! question of which input receives a picked value.

use chrono::{Duration, NaiveDateTime};

use crate::fields::{format_due, parse_due, Category};
use crate::presenter::{EditDraft, EditSubmission};
use crate::tui::input::InputField;

/// Field order within the dialog.
pub const TITLE_ORDER: usize = 0;
pub const DUE_ORDER: usize = 1;
pub const CATEGORY_ORDER: usize = 2;
pub const FIELD_COUNT: usize = 3;

/// Minutes moved by the fine date picker step.
pub const FINE_STEP_MINUTES: i64 = 15;

/// Edit dialog with title, due date and category fields.
pub struct EditForm {
    pub title: InputField,
    pub due: InputField,
    pub category: InputField,
    /// Last value chosen with the date picker.
    pub date_picker: NaiveDateTime,
    /// Index into [`Category::ALL`].
    pub category_picker: usize,
    pub current_field: usize,
}

impl EditForm {
    /// Create a form populated from the presenter's draft.
    pub fn from_draft(draft: &EditDraft) -> Self {
        let category_picker = draft
            .category
            .parse::<Category>()
            .map(Category::index)
            .unwrap_or(0);
        let mut form = Self {
            title: InputField::with_value(&draft.title),
            due: InputField::with_value(&draft.due),
            category: InputField::with_value(&draft.category),
            date_picker: draft.due_date,
            category_picker,
            current_field: TITLE_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Text submitted when the user confirms the dialog.
    pub fn submission(&self) -> EditSubmission {
        EditSubmission {
            title: Some(self.title.value.clone()),
            due_date: Some(self.due.value.clone()),
            category: Some(self.category.value.clone()),
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_ORDER;
        self.due.active = self.current_field == DUE_ORDER;
        self.category.active = self.current_field == CATEGORY_ORDER;
    }

    /// Handle character input for the currently active field.
    ///
    /// `[` and `]` step the date picker on the due field. The category field
    /// only changes through its picker.
    pub fn handle_char(&mut self, c: char) {
        match (self.current_field, c) {
            (TITLE_ORDER, _) => self.title.handle_char(c),
            (DUE_ORDER, '[') => self.step_due(Duration::minutes(-FINE_STEP_MINUTES)),
            (DUE_ORDER, ']') => self.step_due(Duration::minutes(FINE_STEP_MINUTES)),
            (DUE_ORDER, _) => self.due.handle_char(c),
            _ => {}
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        match self.current_field {
            TITLE_ORDER => self.title.handle_backspace(),
            DUE_ORDER => self.due.handle_backspace(),
            _ => {}
        }
    }

    /// Handle delete input for the currently active field.
    pub fn handle_delete(&mut self) {
        match self.current_field {
            TITLE_ORDER => self.title.handle_delete(),
            DUE_ORDER => self.due.handle_delete(),
            _ => {}
        }
    }

    /// Handle left/right arrow keys for cursor movement or picker changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TITLE_ORDER => if right { self.title.move_cursor_right() } else { self.title.move_cursor_left() },
            DUE_ORDER => if right { self.due.move_cursor_right() } else { self.due.move_cursor_left() },
            CATEGORY_ORDER => self.step_category(right),
            _ => {}
        }
    }

    /// Handle up/down: one day on the due field, one category on the picker.
    pub fn handle_up_down(&mut self, up: bool) {
        match self.current_field {
            DUE_ORDER => self.step_due(Duration::days(if up { 1 } else { -1 })),
            CATEGORY_ORDER => self.step_category(!up),
            _ => {}
        }
    }

    /// Handle page up/down: one hour on the due field.
    pub fn handle_page(&mut self, up: bool) {
        if self.current_field == DUE_ORDER {
            self.step_due(Duration::hours(if up { 1 } else { -1 }));
        }
    }

    /// Cycle the category picker and write the label into the category field.
    pub fn step_category(&mut self, forward: bool) {
        let len = Category::ALL.len();
        self.category_picker = if forward {
            (self.category_picker + 1) % len
        } else if self.category_picker == 0 {
            len - 1
        } else {
            self.category_picker - 1
        };
        self.category.set_value(Category::ALL[self.category_picker].label());
    }

    /// Move the date picker and write the formatted value into the due field.
    ///
    /// Steps start from the typed text when it parses, so typing and picking
    /// can be mixed.
    pub fn step_due(&mut self, step: Duration) {
        let base = parse_due(&self.due.value).unwrap_or(self.date_picker);
        if let Some(next) = base.checked_add_signed(step) {
            self.date_picker = next;
            self.due.set_value(&format_due(next));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> EditDraft {
        let due_date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(23, 30, 0).unwrap();
        EditDraft {
            title: "A".into(),
            due: format_due(due_date),
            category: "Work".into(),
            due_date,
        }
    }

    #[test]
    fn test_from_draft_prefills_and_selects_category() {
        let form = EditForm::from_draft(&draft());
        assert_eq!(form.title.value, "A");
        assert_eq!(form.due.value, "2024-01-31 23:30");
        assert_eq!(form.category.value, "Work");
        assert_eq!(Category::ALL[form.category_picker], Category::Work);
        assert!(form.title.active);
    }

    #[test]
    fn test_category_picker_writes_into_category_field() {
        let mut form = EditForm::from_draft(&draft());
        form.next_field();
        form.next_field();
        assert_eq!(form.current_field, CATEGORY_ORDER);

        form.handle_left_right(true);
        assert_eq!(form.category.value, "Home");
        form.handle_left_right(false);
        form.handle_left_right(false);
        assert_eq!(form.category.value, "Other");

        form.handle_char('x');
        assert_eq!(form.category.value, "Other");
        assert_eq!(form.title.value, "A");
    }

    #[test]
    fn test_date_picker_writes_into_due_field() {
        let mut form = EditForm::from_draft(&draft());
        form.next_field();

        form.handle_up_down(true);
        assert_eq!(form.due.value, "2024-02-01 23:30");
        form.handle_page(true);
        assert_eq!(form.due.value, "2024-02-02 00:30");
        form.handle_char('[');
        assert_eq!(form.due.value, "2024-02-02 00:15");
        assert_eq!(form.title.value, "A");
        assert_eq!(form.category.value, "Work");
    }

    #[test]
    fn test_date_picker_starts_from_typed_text() {
        let mut form = EditForm::from_draft(&draft());
        form.next_field();
        form.due.set_value("2030-06-01 08:00");
        form.handle_up_down(false);
        assert_eq!(form.due.value, "2030-05-31 08:00");

        form.due.set_value("garbage");
        form.handle_char(']');
        assert_eq!(form.due.value, "2030-05-31 08:15");
    }

    #[test]
    fn test_submission_carries_raw_text() {
        let mut form = EditForm::from_draft(&draft());
        form.handle_char('!');
        form.next_field();
        form.due.set_value("tomorrow");
        let sub = form.submission();
        assert_eq!(sub.title.as_deref(), Some("A!"));
        assert_eq!(sub.due_date.as_deref(), Some("tomorrow"));
        assert_eq!(sub.category.as_deref(), Some("Work"));
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = EditForm::from_draft(&draft());
        form.prev_field();
        assert_eq!(form.current_field, CATEGORY_ORDER);
        assert!(form.category.active && !form.title.active);
        form.next_field();
        assert_eq!(form.current_field, TITLE_ORDER);
    }
}
