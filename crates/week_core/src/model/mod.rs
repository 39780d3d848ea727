mod day;
mod task;
mod week;

pub use day::Day;
pub use task::{Priority, Task, TaskUpdate};
pub use week::WeekData;
