use super::{Day, Task};

/// All tasks of a planning week, partitioned by day.
///
/// Every day always has a slot; an unused day holds an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekData {
    days: [Vec<Task>; 7],
}

impl WeekData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Day) -> &[Task] {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: Day) -> &mut Vec<Task> {
        &mut self.days[day.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &[Task])> {
        Day::ALL.into_iter().map(|day| (day, self.day(day)))
    }

    pub fn total_tasks(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    /// Finds the day holding the task with `id`.
    pub fn locate(&self, id: &str) -> Option<Day> {
        self.iter()
            .find(|(_, tasks)| tasks.iter().any(|task| task.id == id))
            .map(|(day, _)| day)
    }
}
