//! `food-tracker` command arguments.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

use crate::domain::{MealDraft, default_meal_time, parse_meal_time};

/// `food-tracker` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "food-tracker",
    about = "Log a meal with a photo to Google Drive and Google Sheets",
    version
)]
pub struct CliArgs {
    /// Emit logs as JSON on stderr.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and save one meal entry.
    Log(LogArgs),
    /// Sign in once and save entries interactively until end of input.
    Session,
}

/// Form fields for a single entry.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Name of the food.
    #[arg(long, value_name = "name")]
    pub name: String,
    /// Optional description.
    #[arg(long, value_name = "text", default_value = "")]
    pub description: String,
    /// When the meal was eaten; defaults to now.
    #[arg(long = "meal-time", value_name = "YYYY-MM-DDTHH:MM", value_parser = parse_meal_time_arg)]
    pub meal_time: Option<NaiveDateTime>,
    /// Photo of the meal.
    #[arg(long, value_name = "path")]
    pub photo: PathBuf,
}

impl LogArgs {
    /// Draft built from the arguments, with the meal time defaulted to `now`.
    #[must_use]
    pub fn draft(&self, now: DateTime<Local>) -> MealDraft {
        MealDraft::new(
            self.name.clone(),
            self.description.clone(),
            self.meal_time.unwrap_or_else(|| default_meal_time(now)),
        )
    }
}

fn parse_meal_time_arg(raw: &str) -> Result<NaiveDateTime, String> {
    parse_meal_time(raw).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_log_command() {
        let args = CliArgs::try_parse_from([
            "food-tracker",
            "log",
            "--name",
            "Oatmeal",
            "--meal-time",
            "2024-01-01T08:00",
            "--photo",
            "oatmeal.jpg",
            "--log-json",
        ])
        .expect("arguments parse");

        assert!(args.log_json);
        let Command::Log(log) = args.command else {
            panic!("expected log command");
        };
        assert_eq!(log.name, "Oatmeal");
        assert_eq!(log.description, "");
        assert_eq!(log.photo, PathBuf::from("oatmeal.jpg"));
        assert_eq!(
            log.meal_time.map(|time| time.to_string()).as_deref(),
            Some("2024-01-01 08:00:00")
        );
    }

    #[test]
    fn meal_time_defaults_to_now_truncated() {
        let args = CliArgs::try_parse_from([
            "food-tracker",
            "log",
            "--name",
            "Toast",
            "--photo",
            "toast.png",
        ])
        .expect("arguments parse");
        let Command::Log(log) = args.command else {
            panic!("expected log command");
        };
        let now = Local
            .with_ymd_and_hms(2024, 3, 9, 12, 34, 56)
            .single()
            .expect("unambiguous local time");

        let draft = log.draft(now);

        assert_eq!(draft.meal_time.to_string(), "2024-03-09 12:34:00");
    }

    #[test]
    fn rejects_malformed_meal_time() {
        let error = CliArgs::try_parse_from([
            "food-tracker",
            "log",
            "--name",
            "Toast",
            "--meal-time",
            "noon",
            "--photo",
            "toast.png",
        ])
        .expect_err("meal time must be rejected");

        assert!(error.to_string().contains("must look like 2024-01-01T08:00"));
    }

    #[test]
    fn parses_session_command() {
        let args = CliArgs::try_parse_from(["food-tracker", "session"]).expect("arguments parse");

        assert!(matches!(args.command, Command::Session));
        assert!(!args.log_json);
    }
}
