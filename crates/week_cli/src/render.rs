use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use week_core::config::Palette;
use week_core::error::AppError;
use week_core::model::{Day, Task, WeekData};
use week_core::planner::DaySummary;

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Done")]
    done: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

fn timestamp(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn task_json(day: Day, task: &Task) -> Result<serde_json::Value, AppError> {
    Ok(serde_json::json!({
        "id": task.id,
        "day": day,
        "text": task.text,
        "completed": task.completed,
        "priority": task.priority,
        "createdAt": timestamp(task.created_at)?,
    }))
}

pub fn tasks_json(day: Day, tasks: &[Task]) -> Result<serde_json::Value, AppError> {
    let payload = tasks
        .iter()
        .map(|task| task_json(day, task))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::Value::Array(payload))
}

pub fn task_line(task: &Task, palette: &Palette) -> Result<String, AppError> {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let line = format!(
        "{} {} | {} | {} | {}",
        mark,
        task.id,
        task.text,
        task.priority,
        timestamp(task.created_at)?
    );
    Ok(if task.completed {
        palette.mutedize(&line)
    } else {
        line
    })
}

pub fn day_header(day: Day, completed: usize, total: usize, palette: &Palette) -> String {
    palette.accentize(&format!("{} ({}/{})", day.label(), completed, total))
}

/// `(completed, total)` per day, indexed by [`Day::index`].
pub fn day_counts(week: &WeekData) -> [(usize, usize); 7] {
    let mut counts = [(0, 0); 7];
    for (day, tasks) in week.iter() {
        let completed = tasks.iter().filter(|task| task.completed).count();
        counts[day.index()] = (completed, tasks.len());
    }
    counts
}

/// Headers of the days whose counts differ between two snapshots.
pub fn changed_day_headers(
    before: &[(usize, usize); 7],
    after: &[(usize, usize); 7],
    palette: &Palette,
) -> Vec<String> {
    Day::ALL
        .into_iter()
        .filter(|day| before[day.index()] != after[day.index()])
        .map(|day| {
            let (completed, total) = after[day.index()];
            day_header(day, completed, total, palette)
        })
        .collect()
}

pub fn week_json(summaries: &[DaySummary], week_progress: f64) -> serde_json::Value {
    let days: Vec<_> = summaries
        .iter()
        .map(|summary| {
            serde_json::json!({
                "day": summary.day,
                "date": summary.date.to_string(),
                "completed": summary.completed,
                "total": summary.total,
                "progress": summary.progress,
                "today": summary.is_today,
                "selected": summary.is_selected,
            })
        })
        .collect();
    serde_json::json!({
        "days": days,
        "week_progress": week_progress,
    })
}

pub fn week_table(summaries: &[DaySummary], week_progress: f64) -> Result<String, AppError> {
    let date_format = format_description!("[month repr:short] [day padding:none]");
    let mut rows = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let mut day = summary.day.short().to_string();
        if summary.is_today {
            day.push_str(" *");
        }
        if summary.is_selected {
            day = format!("> {day}");
        }
        let date = summary
            .date
            .format(date_format)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        let done = if summary.total == 0 {
            "-".to_string()
        } else {
            format!("{}/{}", summary.completed, summary.total)
        };
        rows.push(DayRow {
            day,
            date,
            done,
            progress: format!("{:.0}%", summary.progress),
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    Ok(format!("{table}\nWeek progress: {:.0}%", week_progress))
}
