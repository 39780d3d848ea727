//! The session-scoped owner of the planning week.
//!
//! A [`WeekStore`] is built once per session around a persistence backend.
//! Reads are served from memory. Every applied mutation updates memory first,
//! then writes the whole week to the backend and notifies subscribers. Write
//! failures are logged and never undo the in-memory change.

use crate::error::AppError;
use crate::model::{Day, Priority, Task, TaskUpdate, WeekData};
use crate::storage::{PersistenceBackend, STORAGE_KEY, decode_week, encode_week};
use log::{debug, error, warn};
use std::cmp::Reverse;
use time::OffsetDateTime;

pub type Listener = Box<dyn FnMut(&WeekData)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct WeekStore {
    backend: Box<dyn PersistenceBackend>,
    week: WeekData,
    loading: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl WeekStore {
    /// Creates a store in the loading state holding an empty week.
    pub fn new(backend: Box<dyn PersistenceBackend>) -> Self {
        Self {
            backend,
            week: WeekData::empty(),
            loading: true,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Creates a store and loads the persisted week.
    pub fn open(backend: Box<dyn PersistenceBackend>) -> Self {
        let mut store = Self::new(backend);
        store.load();
        store
    }

    /// Reads the persisted week once.
    ///
    /// An absent document yields the empty week. An unreadable or malformed
    /// one is logged and also yields the empty week.
    pub fn load(&mut self) {
        self.week = match self.read_persisted() {
            Ok(Some(week)) => {
                debug!(
                    "event=week_load status=ok tasks={}",
                    week.total_tasks()
                );
                week
            }
            Ok(None) => {
                debug!("event=week_load status=empty");
                WeekData::empty()
            }
            Err(err) => {
                warn!("event=week_load status=fallback error={err}");
                WeekData::empty()
            }
        };
        self.loading = false;
        self.notify();
    }

    fn read_persisted(&self) -> Result<Option<WeekData>, AppError> {
        match self.backend.read(STORAGE_KEY)? {
            Some(content) => decode_week(&content).map(Some),
            None => Ok(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn week(&self) -> &WeekData {
        &self.week
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&WeekData) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was registered under `id`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Appends a new incomplete task to `day`.
    ///
    /// Text is trimmed but not validated; callers reject blank input.
    pub fn add_todo(&mut self, day: Day, text: &str, priority: Priority) -> Task {
        let task = Task::new(text, priority, OffsetDateTime::now_utc());
        self.week.day_mut(day).push(task.clone());
        self.commit();
        task
    }

    /// Applies `update` to the task `id` of `day`. Unknown ids are ignored.
    pub fn update_todo(&mut self, day: Day, id: &str, update: &TaskUpdate) -> bool {
        let changed = self
            .week
            .day_mut(day)
            .iter_mut()
            .find(|task| task.id == id)
            .is_some_and(|task| task.apply(update));
        if changed {
            self.commit();
        }
        changed
    }

    pub fn delete_todo(&mut self, day: Day, id: &str) -> bool {
        let tasks = self.week.day_mut(day);
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let changed = tasks.len() != before;
        if changed {
            self.commit();
        }
        changed
    }

    /// Flips the completion flag of task `id`. Unknown ids are ignored.
    pub fn toggle_todo(&mut self, day: Day, id: &str) -> bool {
        let Some(completed) = self.find_in_day(day, id).map(|task| task.completed) else {
            return false;
        };
        self.update_todo(day, id, &TaskUpdate::completed(!completed))
    }

    pub fn todos_for_day(&self, day: Day) -> &[Task] {
        self.week.day(day)
    }

    pub fn total_todos_for_day(&self, day: Day) -> usize {
        self.week.day(day).len()
    }

    pub fn completed_todos_for_day(&self, day: Day) -> usize {
        self.week.day(day).iter().filter(|task| task.completed).count()
    }

    pub fn clear_day(&mut self, day: Day) -> bool {
        let tasks = self.week.day_mut(day);
        if tasks.is_empty() {
            return false;
        }
        tasks.clear();
        self.commit();
        true
    }

    /// Drops completed tasks of `day`, keeping the rest in order.
    pub fn clear_all_completed(&mut self, day: Day) -> bool {
        let tasks = self.week.day_mut(day);
        let before = tasks.len();
        tasks.retain(|task| !task.completed);
        let changed = tasks.len() != before;
        if changed {
            self.commit();
        }
        changed
    }

    /// Tasks of `day` for display: incomplete first, newest first within each group.
    pub fn sorted_todos_for_day(&self, day: Day) -> Vec<Task> {
        let mut tasks = self.week.day(day).to_vec();
        tasks.sort_by_key(|task| (task.completed, Reverse(task.created_at)));
        tasks
    }

    /// Percentage of completed tasks, 0 for an empty day.
    pub fn day_progress(&self, day: Day) -> f64 {
        let total = self.total_todos_for_day(day);
        if total == 0 {
            return 0.0;
        }
        self.completed_todos_for_day(day) as f64 / total as f64 * 100.0
    }

    /// Mean of per-day progress where a day without tasks counts as done.
    pub fn week_progress(&self) -> f64 {
        let sum: f64 = Day::ALL
            .into_iter()
            .map(|day| {
                if self.total_todos_for_day(day) == 0 {
                    100.0
                } else {
                    self.day_progress(day)
                }
            })
            .sum();
        sum / Day::ALL.len() as f64
    }

    /// Looks a task up across the whole week.
    pub fn find_todo(&self, id: &str) -> Option<(Day, &Task)> {
        let day = self.week.locate(id)?;
        self.find_in_day(day, id).map(|task| (day, task))
    }

    fn find_in_day(&self, day: Day, id: &str) -> Option<&Task> {
        self.week.day(day).iter().find(|task| task.id == id)
    }

    fn commit(&mut self) {
        if !self.loading {
            self.persist();
        }
        self.notify();
    }

    fn persist(&self) {
        let result = encode_week(&self.week)
            .and_then(|content| self.backend.write(STORAGE_KEY, &content));
        match result {
            Ok(()) => debug!(
                "event=week_save status=ok tasks={}",
                self.week.total_tasks()
            ),
            Err(err) => error!("event=week_save status=error error={err}"),
        }
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.week);
        }
    }
}
