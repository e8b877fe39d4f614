use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use api_shared::{TimelineRes, TreatmentRes};
use biotrack_core::config::{
    data_file_from_env_value, grouping_from_env_value, zoom_from_env_value,
};
use biotrack_core::treatment::parse_calendar_date;
use biotrack_core::{
    build_timeline, AntibioticType, CoreConfig, NewTreatment, StatusChange, TrackGrouping,
    TreatmentId, TreatmentRecord, TreatmentStore, ZoomLevel, NO_DATA_MESSAGE,
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "biotrack")]
#[command(about = "BioTrack antibiotic treatment tracker CLI")]
struct Cli {
    /// Treatment store file (defaults to BIOTRACK_DATA_FILE, then biotrack_data/treatments.json)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the timeline for a JSON file of treatment records
    Timeline {
        /// JSON array of records, or an object with a `treatments` array
        file: PathBuf,
        /// Axis granularity: day, week or month
        #[arg(long)]
        zoom: Option<String>,
        /// Group tracks by trimmed, lower-cased antibiotic name
        #[arg(long)]
        normalise_names: bool,
    },
    /// List a patient's stored treatments
    List { patient_id: String },
    /// Start a new treatment
    Add {
        patient_id: String,
        /// Antibiotic name
        name: String,
        /// antibiotic or corticoide
        antibiotic_type: String,
        /// Start date (YYYY-MM-DD)
        start: String,
        /// Programmed days
        days: u32,
    },
    /// Suspend an active treatment
    Suspend { id: String },
    /// Finish an active treatment
    Finish { id: String },
    /// Record one applied dose
    Dose { id: String },
    /// Extend a treatment by a number of days
    Extend { id: String, days: u32 },
}

/// Records accepted by `biotrack timeline`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimelineInput {
    List(Vec<TreatmentRecord>),
    Wrapped { treatments: Vec<TreatmentRecord> },
}

impl TimelineInput {
    fn into_records(self) -> Vec<TreatmentRecord> {
        match self {
            TimelineInput::List(records) | TimelineInput::Wrapped { treatments: records } => {
                records
            }
        }
    }
}

fn read_records(path: &Path) -> anyhow::Result<Vec<TreatmentRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input: TimelineInput = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a list of treatment records", path.display()))?;
    Ok(input.into_records())
}

fn load_config(data_file: Option<PathBuf>) -> anyhow::Result<CoreConfig> {
    let data_file = match data_file {
        Some(path) => path,
        None => data_file_from_env_value(std::env::var("BIOTRACK_DATA_FILE").ok()),
    };
    Ok(CoreConfig::new(
        data_file,
        zoom_from_env_value(std::env::var("BIOTRACK_DEFAULT_ZOOM").ok())?,
        grouping_from_env_value(std::env::var("BIOTRACK_TRACK_GROUPING").ok())?,
    )?)
}

fn print_treatment(record: TreatmentRecord) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&TreatmentRes::from(record))?
    );
    Ok(())
}

fn day_count(days: Option<i64>) -> String {
    days.map_or_else(|| "?".to_string(), |d| d.to_string())
}

fn change(store: &TreatmentStore, id: &str, change: StatusChange) -> anyhow::Result<()> {
    let id = TreatmentId::parse(id)?;
    print_treatment(store.apply_change(&id, change)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("biotrack_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'biotrack --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(load_config(cli.data_file)?);
    let store = TreatmentStore::new(cfg.clone());

    match command {
        Commands::Timeline {
            file,
            zoom,
            normalise_names,
        } => {
            let zoom = zoom.map(|z| z.parse::<ZoomLevel>()).transpose()?;
            let grouping = normalise_names.then_some(TrackGrouping::Normalised);
            let options = cfg.timeline_options(zoom, grouping);

            let timeline = build_timeline(&read_records(&file)?, &options);
            if timeline.is_no_data() {
                println!("{NO_DATA_MESSAGE}.");
                for excluded in TimelineRes::from(&timeline).excluded {
                    eprintln!("excluded {}: {}", excluded.id, excluded.reason);
                }
            } else {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&TimelineRes::from(&timeline))?
                );
            }
        }
        Commands::List { patient_id } => {
            let treatments = store.list_for_patient(&patient_id)?;
            if treatments.is_empty() {
                println!("No treatments found.");
            }
            for t in treatments {
                println!(
                    "ID: {}, {} ({}), start {}, {}/{} days, {}",
                    t.id,
                    t.antibiotic_name,
                    t.antibiotic_type,
                    t.start_date,
                    day_count(t.days_applied),
                    day_count(t.programmed_days),
                    t.status
                );
            }
        }
        Commands::Add {
            patient_id,
            name,
            antibiotic_type,
            start,
            days,
        } => {
            let antibiotic_type = antibiotic_type.parse::<AntibioticType>()?;
            let start_date = parse_calendar_date(&start)
                .with_context(|| format!("start date is not a calendar date: '{start}'"))?;
            let record = store.create(
                &patient_id,
                NewTreatment {
                    antibiotic_name: name,
                    antibiotic_type,
                    start_date,
                    programmed_days: days,
                },
            )?;
            print_treatment(record)?;
        }
        Commands::Suspend { id } => change(&store, &id, StatusChange::Suspend)?,
        Commands::Finish { id } => change(&store, &id, StatusChange::Finish)?,
        Commands::Dose { id } => change(&store, &id, StatusChange::RecordDose)?,
        Commands::Extend { id, days } => change(
            &store,
            &id,
            StatusChange::Extend {
                additional_days: days,
            },
        )?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn timeline_command_parses_flags() {
        let cli = Cli::try_parse_from([
            "biotrack",
            "timeline",
            "records.json",
            "--zoom",
            "month",
            "--normalise-names",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Timeline {
                zoom,
                normalise_names,
                ..
            }) => {
                assert_eq!(zoom.as_deref(), Some("month"));
                assert!(normalise_names);
            }
            _ => panic!("expected timeline command"),
        }
    }

    #[test]
    fn read_records_accepts_both_layouts() {
        let dir = TempDir::new().unwrap();
        let record = r#"{"id":"a","antibioticName":"Amoxicillin","antibioticType":"antibiotic",
            "startDate":"2024-01-01","daysApplied":2,"programmedDays":5,"status":"active"}"#;

        let list = dir.path().join("list.json");
        std::fs::write(&list, format!("[{record}]")).unwrap();
        assert_eq!(read_records(&list).unwrap().len(), 1);

        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(&wrapped, format!(r#"{{"treatments":[{record},{record}]}}"#)).unwrap();
        assert_eq!(read_records(&wrapped).unwrap().len(), 2);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{\"patients\": []}").unwrap();
        assert!(read_records(&broken).is_err());
    }

    #[test]
    fn null_start_date_is_read_and_left_for_the_timeline_to_exclude() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","antibioticName":"Amoxicillin","antibioticType":"antibiotic",
                "startDate":null,"programmedDays":5,"status":"active"}]"#,
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records[0].start_date, "");
        assert_eq!(day_count(records[0].days_applied), "?");
        assert_eq!(day_count(records[0].programmed_days), "5");
    }

    #[test]
    fn explicit_data_file_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let cfg = load_config(Some(path.clone())).unwrap();
        assert_eq!(cfg.data_file(), path.as_path());
    }
}
