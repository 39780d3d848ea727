use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use flexi_logger::{Logger, LoggerHandle};
use log::warn;
use std::io::{self, BufRead};
use time::Date;
use week_cli::cli::{Cli, Command, ConfigOverrideTarget, parse_config_override, split_line};
use week_cli::render;
use week_core::calendar::{current_day, local_now};
use week_core::config::{self, Config, ConfigOverrides};
use week_core::error::AppError;
use week_core::model::{Day, Task, TaskUpdate};
use week_core::planner::Planner;
use week_core::storage::FileBackend;
use week_core::week_store::{SubscriptionId, WeekStore};

const LOG_ENV_VAR: &str = "WEEKPLAN_LOG";
const DEFAULT_LOG_LEVEL: &str = "warn";

struct Session {
    store: WeekStore,
    planner: Planner,
    config: Config,
    today: Date,
}

impl Session {
    fn open(config: Config) -> Result<Self, AppError> {
        let backend = FileBackend::from_env()?;
        let now = local_now();
        Ok(Self {
            store: WeekStore::open(Box::new(backend)),
            planner: Planner::new(current_day(now)),
            config,
            today: now.date(),
        })
    }

    /// Resolves the day holding task `id`, preferring an explicit `--day`.
    fn locate(&self, day: Option<Day>, id: &str) -> Result<(Day, Task), AppError> {
        let trimmed_id = id.trim();
        if trimmed_id.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        let found = match day {
            Some(day) => self
                .store
                .todos_for_day(day)
                .iter()
                .find(|task| task.id == trimmed_id)
                .map(|task| (day, task.clone())),
            None => self
                .store
                .find_todo(trimmed_id)
                .map(|(day, task)| (day, task.clone())),
        };
        found.ok_or_else(|| AppError::invalid_input("task not found"))
    }
}

fn init_logging(config: &Config) -> Option<LoggerHandle> {
    let level = config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let spec = std::env::var(LOG_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.to_string());

    match Logger::try_with_str(&spec).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("WARN: logging disabled: {err}");
            None
        }
    }
}

fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DefaultPriority(priority) => {
                overrides.default_priority = Some(priority)
            }
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn print_task(cli: &Cli, day: Day, task: &Task, verb: &str) -> Result<(), AppError> {
    if cli.json {
        println!("{}", render::task_json(day, task)?);
    } else {
        println!("{verb} task: {} ({}) on {}", task.text, task.id, day.label());
    }
    Ok(())
}

fn print_day(session: &Session, cli: &Cli, day: Day) -> Result<(), AppError> {
    let tasks = session.store.sorted_todos_for_day(day);
    if cli.json {
        println!("{}", render::tasks_json(day, &tasks)?);
        return Ok(());
    }

    let palette = session.config.palette();
    println!(
        "{}",
        render::day_header(
            day,
            session.store.completed_todos_for_day(day),
            session.store.total_todos_for_day(day),
            &palette,
        )
    );
    for task in &tasks {
        println!("{}", render::task_line(task, &palette)?);
    }
    Ok(())
}

fn print_count(cli: &Cli, day: Day, removed: usize, verb: &str) {
    if cli.json {
        println!("{}", serde_json::json!({ "day": day, "removed": removed }));
    } else {
        println!("{verb} {removed} task(s) from {}", day.label());
    }
}

fn run_command(session: &mut Session, cli: Cli) -> Result<(), AppError> {
    let overrides = collect_overrides(&cli.config_override)?;
    let saved_config = session.config.clone();
    session.config = config::merge_overrides(&saved_config, &overrides);
    let result = dispatch(session, &cli);
    session.config = saved_config;
    result
}

fn dispatch(session: &mut Session, cli: &Cli) -> Result<(), AppError> {
    let selected = cli.day.unwrap_or(session.planner.selected_day());

    match &cli.command {
        Command::Week => {
            let summaries = session.planner.day_summaries(&session.store, session.today);
            let week_progress = session.store.week_progress();
            if cli.json {
                println!("{}", render::week_json(&summaries, week_progress));
            } else {
                println!("{}", render::week_table(&summaries, week_progress)?);
            }
        }
        Command::List => print_day(session, cli, selected)?,
        Command::Add { text, priority } => {
            let text = text
                .as_deref()
                .ok_or_else(|| AppError::invalid_input("text is required"))?;
            let priority = priority.unwrap_or_else(|| session.config.priority());

            session.planner.open_add();
            session.planner.set_draft(text)?;
            let task = match session
                .planner
                .submit_add_to(&mut session.store, selected, priority)
            {
                Ok(task) => task,
                Err(err) => {
                    session.planner.cancel_add();
                    return Err(err);
                }
            };
            print_task(cli, selected, &task, "Added")?;
        }
        Command::Edit { id, text } => {
            let (day, task) = session.locate(cli.day, id)?;
            session.planner.start_edit(day, &task);
            session.planner.set_draft(text.as_str())?;
            if let Err(err) = session.planner.submit_edit(&mut session.store) {
                session.planner.cancel_edit();
                return Err(err);
            }
            let (_, updated) = session.locate(Some(day), &task.id)?;
            print_task(cli, day, &updated, "Updated")?;
        }
        Command::Priority { id, level } => {
            let (day, task) = session.locate(cli.day, id)?;
            session
                .store
                .update_todo(day, &task.id, &TaskUpdate::priority(*level));
            let (_, updated) = session.locate(Some(day), &task.id)?;
            print_task(cli, day, &updated, "Updated")?;
        }
        Command::Toggle { id } => {
            let (day, task) = session.locate(cli.day, id)?;
            session.store.toggle_todo(day, &task.id);
            let (_, updated) = session.locate(Some(day), &task.id)?;
            let verb = if updated.completed { "Completed" } else { "Reopened" };
            print_task(cli, day, &updated, verb)?;
        }
        Command::Delete { id } => {
            let (day, task) = session.locate(cli.day, id)?;
            session.store.delete_todo(day, &task.id);
            print_task(cli, day, &task, "Deleted")?;
        }
        Command::Clear => {
            let removed = session.store.total_todos_for_day(selected);
            session.store.clear_day(selected);
            print_count(cli, selected, removed, "Cleared");
        }
        Command::ClearCompleted => {
            let removed = session.store.completed_todos_for_day(selected);
            session.store.clear_all_completed(selected);
            print_count(cli, selected, removed, "Cleared");
        }
        Command::Select { target } => {
            session.planner.select_day(*target);
            print_day(session, cli, *target)?;
        }
        Command::Next => {
            let day = session.planner.select_next_day();
            print_day(session, cli, day)?;
        }
        Command::Prev => {
            let day = session.planner.select_previous_day();
            print_day(session, cli, day)?;
        }
    }

    Ok(())
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

/// Reprints the header of every day whose counts a mutation changed.
fn watch_day_headers(session: &mut Session) -> SubscriptionId {
    let palette = session.config.palette();
    let mut previous = render::day_counts(session.store.week());
    session.store.subscribe(move |week| {
        let current = render::day_counts(week);
        for header in render::changed_day_headers(&previous, &current, &palette) {
            println!("{header}");
        }
        previous = current;
    })
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let watcher = watch_day_headers(session);
    let result = interactive_loop(session);
    session.store.unsubscribe(watcher);
    result
}

fn interactive_loop(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("weekplan".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_informational(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(session, cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn exit_with(err: AppError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(1);
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    let interactive = args.next().is_none();

    let cli = if interactive {
        None
    } else {
        match Cli::try_parse() {
            Ok(cli) => Some(cli),
            Err(err) if is_informational(&err) => err.exit(),
            Err(err) => exit_with(normalize_parse_error(err)),
        }
    };

    let loaded = config::load_config_with_fallback();
    let base_config = match cli.as_ref() {
        Some(cli) => match collect_overrides(&cli.config_override) {
            Ok(overrides) => config::merge_overrides(&loaded.config, &overrides),
            Err(err) => exit_with(err),
        },
        None => loaded.config.clone(),
    };
    let _logger = init_logging(&base_config);
    if let Some(err) = loaded.error {
        warn!("event=config_load status=fallback error={err}");
    }

    let mut session = match Session::open(loaded.config) {
        Ok(session) => session,
        Err(err) => exit_with(err),
    };

    let result = match cli {
        Some(cli) => run_command(&mut session, cli),
        None => run_interactive(&mut session),
    };
    if let Err(err) = result {
        exit_with(err);
    }
}
