//! Transient view state for a planning session.
//!
//! Nothing here is persisted: the selected day and any open add or edit form
//! live only as long as the [`Planner`]. All task changes go through the
//! [`WeekStore`].

use crate::calendar::{date_for_day, day_of};
use crate::error::AppError;
use crate::model::{Day, Priority, Task, TaskUpdate};
use crate::week_store::WeekStore;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub day: Day,
    pub task_id: String,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub day: Day,
    pub date: Date,
    pub completed: usize,
    pub total: usize,
    pub progress: f64,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planner {
    selected: Day,
    add_draft: Option<String>,
    edit: Option<EditForm>,
}

impl Planner {
    pub fn new(selected: Day) -> Self {
        Self {
            selected,
            add_draft: None,
            edit: None,
        }
    }

    pub fn selected_day(&self) -> Day {
        self.selected
    }

    /// Switches day. Open forms belong to the previous day and are discarded.
    pub fn select_day(&mut self, day: Day) {
        if day != self.selected {
            self.add_draft = None;
            self.edit = None;
        }
        self.selected = day;
    }

    pub fn select_next_day(&mut self) -> Day {
        self.select_day(self.selected.next());
        self.selected
    }

    pub fn select_previous_day(&mut self) -> Day {
        self.select_day(self.selected.previous());
        self.selected
    }

    pub fn is_adding(&self) -> bool {
        self.add_draft.is_some()
    }

    pub fn add_draft(&self) -> Option<&str> {
        self.add_draft.as_deref()
    }

    pub fn open_add(&mut self) {
        self.add_draft.get_or_insert_with(String::new);
    }

    pub fn cancel_add(&mut self) {
        self.add_draft = None;
    }

    /// Replaces the draft of the open form, the edit form taking precedence.
    pub fn set_draft<T: Into<String>>(&mut self, text: T) -> Result<(), AppError> {
        if let Some(edit) = self.edit.as_mut() {
            edit.draft = text.into();
            return Ok(());
        }
        match self.add_draft.as_mut() {
            Some(draft) => {
                *draft = text.into();
                Ok(())
            }
            None => Err(AppError::invalid_input("no form is open")),
        }
    }

    /// Adds the drafted task to the selected day and closes the form.
    ///
    /// A blank draft is rejected and the form stays open.
    pub fn submit_add(&mut self, store: &mut WeekStore, priority: Priority) -> Result<Task, AppError> {
        self.submit_add_to(store, self.selected, priority)
    }

    /// Like [`Planner::submit_add`], but files the task under `day` without
    /// moving the selection.
    pub fn submit_add_to(
        &mut self,
        store: &mut WeekStore,
        day: Day,
        priority: Priority,
    ) -> Result<Task, AppError> {
        let draft = self
            .add_draft
            .as_deref()
            .ok_or_else(|| AppError::invalid_input("add form is not open"))?;
        if draft.trim().is_empty() {
            return Err(AppError::invalid_input("text is required"));
        }

        let task = store.add_todo(day, draft, priority);
        self.add_draft = None;
        Ok(task)
    }

    pub fn editing(&self) -> Option<&EditForm> {
        self.edit.as_ref()
    }

    pub fn start_edit(&mut self, day: Day, task: &Task) {
        self.edit = Some(EditForm {
            day,
            task_id: task.id.clone(),
            draft: task.text.clone(),
        });
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Saves the edited text. Returns whether the stored task changed.
    pub fn submit_edit(&mut self, store: &mut WeekStore) -> Result<bool, AppError> {
        let edit = self
            .edit
            .as_ref()
            .ok_or_else(|| AppError::invalid_input("edit form is not open"))?;
        let text = edit.draft.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("text is required"));
        }

        let changed = store.update_todo(edit.day, &edit.task_id, &TaskUpdate::text(text));
        self.edit = None;
        Ok(changed)
    }

    /// One row per day, Monday first.
    pub fn day_summaries(&self, store: &WeekStore, today: Date) -> Vec<DaySummary> {
        let today_day = day_of(today.weekday());
        Day::ALL
            .into_iter()
            .map(|day| DaySummary {
                day,
                date: date_for_day(day, today),
                completed: store.completed_todos_for_day(day),
                total: store.total_todos_for_day(day),
                progress: store.day_progress(day),
                is_today: day == today_day,
                is_selected: day == self.selected,
            })
            .collect()
    }
}
