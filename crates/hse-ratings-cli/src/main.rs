use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use hse_ratings::{ProgramCatalog, ScraperConfig};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "hse-ratings")]
#[command(about = "An HSE bachelor program and student rating scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        short = 'c',
        long = "config",
        global = true,
        help = "TOML file overriding the default scraper configuration"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List faculties together with the programs they run
    Faculties {
        #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List programs and the codes their rating pages are keyed by
    Programs {
        #[arg(long, help = "Only programs of this faculty")]
        faculty: Option<String>,

        #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the rating views and courses available for a program
    Options {
        #[arg(help = "Program name as shown on the program list")]
        program: String,

        #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Fetch a rating table for a program, rating view and course
    Ratings {
        #[arg(help = "Program name as shown on the program list")]
        program: String,

        #[arg(short = 'r', long, help = "Rating name, e.g. \"Рейтинг 1 курса\"")]
        rating: String,

        #[arg(
            short = 'k',
            long,
            help = "Course number",
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        course: u32,

        #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn exit_on_error<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
    result.unwrap_or_else(|e| {
        log::error!("{}: {}", context, e);
        process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let config = match &cli.config {
        Some(path) => exit_on_error(
            ScraperConfig::from_toml_file(path),
            "Error loading configuration",
        ),
        None => ScraperConfig::default(),
    };

    let catalog = exit_on_error(
        ProgramCatalog::with_config(config),
        "Error creating scraper",
    );

    match cli.command {
        Commands::Faculties { format } => {
            let data = exit_on_error(catalog.get(), "Error fetching program list");
            match format {
                OutputFormat::Json => serialize_json(&data.faculties),
                OutputFormat::Text => print!("{}", data),
            }
        }

        Commands::Programs { faculty, format } => {
            let data = exit_on_error(catalog.get(), "Error fetching program list");
            let programs: BTreeMap<&String, &String> = match &faculty {
                Some(faculty) => {
                    let Some(names) = data.programs_of(faculty) else {
                        log::error!("Unknown faculty '{}'", faculty);
                        process::exit(1);
                    };
                    data.programs
                        .iter()
                        .filter(|(name, _)| names.contains(*name))
                        .collect()
                }
                None => data.programs.iter().collect(),
            };

            match format {
                OutputFormat::Json => serialize_json(&programs),
                OutputFormat::Text => {
                    if programs.is_empty() {
                        println!("No programs to display.");
                    }
                    for (i, (name, code)) in programs.iter().enumerate() {
                        println!("{:>3}. {} [{}]", i + 1, name, code);
                    }
                }
            }
        }

        Commands::Options { program, format } => {
            let fetcher = exit_on_error(catalog.ratings(&program), "Error resolving program");
            let options = exit_on_error(fetcher.options(), "Error fetching rating options");
            match format {
                OutputFormat::Json => serialize_json(&options),
                OutputFormat::Text => print!("{}", options),
            }
        }

        Commands::Ratings {
            program,
            rating,
            course,
            format,
        } => {
            let fetcher = exit_on_error(catalog.ratings(&program), "Error resolving program");
            let table = exit_on_error(
                fetcher.fetch(&rating, course),
                "Error fetching rating table",
            );
            match format {
                OutputFormat::Json => serialize_json(&table),
                OutputFormat::Text => {
                    if table.is_empty() {
                        println!("No entries to display.");
                    } else {
                        print!("{}", table);
                    }
                }
            }
        }
    }
}
