use clap::{Parser, Subcommand};
use week_core::config::{canonical_key, canonical_log_level};
use week_core::error::AppError;
use week_core::model::{Day, Priority};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan short tasks across the days of a week", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Day to act on (defaults to the selected day, initially today)
    #[arg(short, long, global = true, value_name = "DAY")]
    pub day: Option<Day>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the week with per-day progress
    ///
    /// Example: weekplan week
    Week,
    /// List the tasks of a day, pending first
    ///
    /// Example: weekplan list --day monday
    List,
    /// Add a task to a day
    ///
    /// Example: weekplan add "Buy milk" --day monday --priority low
    Add {
        text: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Replace a task's text
    ///
    /// Example: weekplan edit <id> "Buy oat milk"
    Edit { id: String, text: String },
    /// Change a task's priority
    ///
    /// Example: weekplan priority <id> high
    Priority { id: String, level: Priority },
    /// Mark a task done, or pending again
    ///
    /// Example: weekplan toggle <id>
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: weekplan delete <id>
    Delete { id: String },
    /// Remove every task of a day
    ///
    /// Example: weekplan clear --day sunday
    Clear,
    /// Remove the completed tasks of a day
    ///
    /// Example: weekplan clear-completed
    ClearCompleted,
    /// Select the day later commands act on
    ///
    /// Example: select friday
    Select {
        #[arg(value_name = "DAY")]
        target: Day,
    },
    /// Select the following day
    Next,
    /// Select the previous day
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DefaultPriority(Priority),
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field = canonical_key(key_raw);
    if field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "default_priority" | "priority" => {
            let priority = value.parse::<Priority>().map_err(|err| err.message().to_string())?;
            ConfigOverrideTarget::DefaultPriority(priority)
        }
        "log_level" => {
            if canonical_log_level(&value).is_none() {
                return Err(format!("unknown log level '{value}'"));
            }
            ConfigOverrideTarget::LogLevel
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Splits an interactive input line into arguments.
///
/// Double quotes group words. Inside quotes `\"` and `\\` are escapes; any
/// other backslash is kept as typed.
pub fn split_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            return Ok(args);
        }

        let mut word = String::new();
        let mut quoted = false;
        while let Some(ch) = chars.next() {
            match ch {
                '"' => quoted = !quoted,
                '\\' if quoted => match chars.next() {
                    Some(escaped @ ('"' | '\\')) => word.push(escaped),
                    Some(other) => {
                        word.push('\\');
                        word.push(other);
                    }
                    None => word.push('\\'),
                },
                ch if ch.is_whitespace() && !quoted => break,
                ch => word.push(ch),
            }
        }

        if quoted {
            return Err(AppError::invalid_input("unterminated quote in command"));
        }
        args.push(word);
    }
}
