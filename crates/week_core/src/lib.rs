pub mod calendar;
pub mod config;
pub mod error;
pub mod model;
pub mod planner;
pub mod storage;
pub mod week_store;

pub use model::{Day, Priority, Task, TaskUpdate, WeekData};
pub use week_store::WeekStore;
