use std::error::Error;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use clap::{Parser, error::ErrorKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::split::DEFAULT_TRAIN_RATIO;
use crate::dates::{add_business_days, business_days_between, unix_time};
use crate::field::{Categorical, Role, RoleSet};
use crate::matrix::Matrix;
use crate::registry::SchemaRegistry;
use crate::schema::{AnyRecord, Record, SchemaBuilder};
use crate::splits::{SplitLabel, split};
use crate::{ExtractionConfig, Extractor};

#[derive(Debug, Parser)]
#[command(
    name = "extraction_demo",
    disable_help_subcommand = true,
    about = "Vectorize synthetic sensor readings into feature and label matrices",
    long_about = "Generate seeded sensor readings, split them into train/test partitions, and print the input/output matrices built from their role-marked fields.",
    after_help = "Set RUST_LOG=featurekit=debug to see schema registration and matrix build logs."
)]
struct ExtractionDemoCli {
    #[arg(
        long,
        default_value_t = 12,
        help = "Number of synthetic readings to generate"
    )]
    rows: usize,
    #[arg(
        long,
        default_value_t = 42,
        help = "Seed for reading generation and the train/test draw"
    )]
    seed: u64,
    #[arg(
        long = "train-ratio",
        default_value_t = DEFAULT_TRAIN_RATIO,
        value_parser = parse_train_ratio_arg,
        help = "Share of readings drawn into the training split, strictly between 0 and 1"
    )]
    train_ratio: f64,
    #[arg(
        long = "show-rows",
        default_value_t = 3,
        help = "Rows printed per matrix"
    )]
    show_rows: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Weather {
    Clear,
    Cloudy,
    Rain,
}

impl Categorical for Weather {
    const MEMBERS: &'static [Self] = &[Weather::Clear, Weather::Cloudy, Weather::Rain];

    fn member_name(&self) -> &'static str {
        match self {
            Weather::Clear => "Clear",
            Weather::Cloudy => "Cloudy",
            Weather::Rain => "Rain",
        }
    }
}

#[derive(Clone, Debug)]
struct SensorReading {
    station: String,
    taken_at: NaiveDateTime,
    temperature: f64,
    humidity: Option<f64>,
    pressure_window: [f64; 3],
    weather: Weather,
    rain_next_hour: bool,
}

impl Record for SensorReading {
    fn describe(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        schema
            .named("SensorReading")
            .scalar("station", RoleSet::EMPTY, |r: &Self| r.station.clone())
            .writable(|src: &Self, dst: &mut Self| dst.station = src.station.clone())
            .scalar("taken_at", Role::Feature, |r: &Self| unix_time(r.taken_at))
            .scalar("temperature", Role::Feature, |r: &Self| r.temperature)
            .scalar("humidity", Role::Feature, |r: &Self| r.humidity)
            .array("pressure_window", Role::Feature, 3, |r: &Self| {
                r.pressure_window
            })
            .enumeration("weather", Role::Feature | Role::Label, |r: &Self| {
                r.weather
            })
            .scalar("rain_next_hour", Role::Label, |r: &Self| r.rain_next_hour)
    }
}

fn synthetic_readings(count: usize, start: NaiveDateTime, rng: &mut StdRng) -> Vec<SensorReading> {
    (0..count)
        .map(|idx| {
            let weather = Weather::MEMBERS[rng.random_range(0..Weather::MEMBERS.len())];
            let base_pressure = rng.random_range(995.0..1025.0);
            let humidity = rng.random_bool(0.85).then(|| rng.random_range(30.0..95.0));
            SensorReading {
                station: format!("station-{:02}", idx % 4),
                taken_at: start + TimeDelta::hours(idx as i64),
                temperature: rng.random_range(-5.0..30.0),
                humidity,
                pressure_window: [
                    base_pressure,
                    base_pressure + rng.random_range(-2.0..2.0),
                    base_pressure + rng.random_range(-4.0..4.0),
                ],
                weather,
                rain_next_hour: weather == Weather::Rain || rng.random_bool(0.1),
            }
        })
        .collect()
}

/// Run the extraction demo with the provided CLI args.
pub fn run_extraction_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<ExtractionDemoCli, _>(
        std::iter::once("extraction_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let registry = SchemaRegistry::new().with::<SensorReading>()?;
    let extractor = Extractor::with_config(registry, ExtractionConfig::default());
    let schema = extractor
        .registry()
        .schema_of::<SensorReading>()
        .ok_or("sensor reading schema missing after registration")?;

    let start = NaiveDate::from_ymd_opt(2025, 1, 3)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .ok_or("invalid demo start date")?;
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let readings = synthetic_readings(cli.rows, start, &mut rng);
    let parts = split(readings, cli.train_ratio, &mut rng);

    println!("=== extraction demo ===");
    println!("seed: {}", cli.seed);
    println!(
        "readings: {} (train={}, test={})",
        parts.len(),
        parts.train.len(),
        parts.test.len()
    );
    println!();

    println!("[SCHEMA]");
    for role in Role::ALL {
        println!(
            "  {role} columns ({}): {}",
            schema.width(role),
            schema.column_labels(role).join(", ")
        );
    }
    println!();

    for label in [SplitLabel::Train, SplitLabel::Test] {
        let records: Vec<&dyn AnyRecord> = parts
            .get(label)
            .iter()
            .map(|reading| reading as &dyn AnyRecord)
            .collect();
        let inputs = extractor.input_matrix(records.iter().copied());
        let outputs = extractor.output_matrix(records.iter().copied());
        println!("[{label:?}]");
        print_matrix("inputs", &inputs, cli.show_rows);
        print_matrix("outputs", &outputs, cli.show_rows);
    }

    if let Some(first) = parts.train.first() {
        let mut copy = first.clone();
        copy.station = String::new();
        let copied = extractor.clone_record(first, &mut copy)?;
        println!("[CLONE]");
        println!("  copied {copied} writable field(s): station={}", copy.station);
        println!();
    }

    let last = start + TimeDelta::hours(cli.rows.saturating_sub(1) as i64);
    let due = add_business_days(last, 3)?;
    println!("[CALENDAR]");
    println!("  first reading: {start}");
    println!("  last reading: {last}");
    println!(
        "  business days spanned: {:.2}",
        business_days_between(start, last)
    );
    println!("  report due (3 business days after last): {due}");
    Ok(())
}

fn print_matrix(name: &str, matrix: &Matrix, show_rows: usize) {
    let report = matrix.report();
    let width = matrix
        .width()
        .map_or_else(|| "ragged".to_string(), |width| width.to_string());
    println!("  {name}: {} rows x {width} columns", matrix.len());
    println!(
        "    degraded fields: {}, NaN values: {}, foreign rows: {}",
        report.degraded_fields, report.nan_values, report.foreign_rows
    );
    for row in matrix.iter().take(show_rows) {
        let cells: Vec<String> = row.iter().map(|value| format!("{value:.2}")).collect();
        println!("    [{}]", cells.join(", "));
    }
    if matrix.len() > show_rows {
        println!("    ... {} more", matrix.len() - show_rows);
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_train_ratio_arg(raw: &str) -> Result<f64, String> {
    let ratio = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid train ratio '{raw}'"))?;
    if ratio > 0.0 && ratio < 1.0 {
        Ok(ratio)
    } else {
        Err("--train-ratio must be strictly between 0 and 1".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parse_cli_applies_defaults() {
        let cli = parse_cli::<ExtractionDemoCli, _>(["extraction_demo"])
            .unwrap()
            .unwrap();
        assert_eq!(cli.rows, 12);
        assert_eq!(cli.seed, 42);
        assert_eq!(cli.train_ratio, DEFAULT_TRAIN_RATIO);
        assert_eq!(cli.show_rows, 3);
    }

    #[test]
    fn parse_cli_handles_help_without_error() {
        let parsed = parse_cli::<ExtractionDemoCli, _>(["extraction_demo", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn train_ratio_parser_rejects_out_of_range_values() {
        assert_eq!(parse_train_ratio_arg(" 0.25 "), Ok(0.25));
        assert!(parse_train_ratio_arg("1.0").is_err());
        assert!(parse_train_ratio_arg("0").is_err());
        assert!(parse_train_ratio_arg("NaN").is_err());
        assert!(parse_train_ratio_arg("half").is_err());
    }

    #[test]
    fn synthetic_readings_vectorize_to_full_width() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let readings = synthetic_readings(20, start, &mut rng);
        let extractor = Extractor::new(SchemaRegistry::new().with::<SensorReading>().unwrap());

        let inputs = extractor.input_matrix(&readings);
        assert_eq!(inputs.len(), 20);
        assert_eq!(inputs.width(), Some(1 + 1 + 1 + 3 + 3));
        assert_eq!(inputs.row(1).unwrap()[0], unix_time(start) as f64 + 3600.0);

        let outputs = extractor.output_matrix(&readings);
        assert_eq!(outputs.width(), Some(3 + 1));
        assert!(outputs.report().is_clean());
        for row in outputs.iter() {
            assert_eq!(row[..3].iter().sum::<f64>(), 1.0);
        }
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_extraction_demo(args(&["--rows", "9", "--seed", "7", "--show-rows", "1"])).unwrap();
        run_extraction_demo(args(&["--rows", "0"])).unwrap();
        assert!(run_extraction_demo(args(&["--train-ratio", "2"])).is_err());
    }
}
