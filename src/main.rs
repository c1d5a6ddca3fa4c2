use clap::{Parser, Subcommand};
use std::path::PathBuf;

use studrank::ranking::{apply_highlight, rank_students, HighlightSpec, RankMode};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive browser: faculty -> speciality -> course -> ranking
    /// (default if no subcommand)
    Tui,
    /// List all faculties
    Faculties,
    /// List specialities within a faculty
    Specialities {
        /// Faculty id (see `faculties`)
        #[arg(long)]
        faculty: i64,
    },
    /// List course years for a faculty and speciality
    Courses {
        #[arg(long)]
        faculty: i64,
        #[arg(long)]
        speciality: i64,
    },
    /// Show the roster table for a speciality and course
    Roster {
        #[arg(long)]
        speciality: i64,
        #[arg(long)]
        course: u32,
    },
    /// List the subjects (with lesson types) seen across a roster
    Subjects {
        #[arg(long)]
        speciality: i64,
        #[arg(long)]
        course: u32,
    },
    /// Rank a roster's students by their marks for one subject
    Rank {
        #[arg(long)]
        speciality: i64,
        #[arg(long)]
        course: u32,
        /// Subject name, exactly as `subjects` lists it
        #[arg(long)]
        subject: String,
        /// Only count marks from this lesson type (e.g. ЛК, ПЗ)
        #[arg(long)]
        lesson_type: Option<String>,
        /// Rank by mark total instead of average
        #[arg(long)]
        by_sum: bool,
        /// Highlight the top N percent (1-100) of rows in the id range
        #[arg(long)]
        top: Option<f64>,
        /// Lower card-number bound for --top (default: unbounded)
        #[arg(long, requires = "top")]
        from: Option<f64>,
        /// Upper card-number bound for --top (default: unbounded)
        #[arg(long, requires = "top")]
        to: Option<f64>,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "studrank")]
#[command(about = "BSUIR student rating browser and ranking CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/studrank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match studrank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = studrank::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!("API base URL: {}", config.base_url);
    }

    let client = match studrank::api::create_client(&config.base_url, config.request_timeout_secs)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create API client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let use_colors = studrank::output::should_use_colors();

    match command {
        Commands::Tui => {
            let app = studrank::tui::App::new(config, cli.verbose);
            if let Err(e) = studrank::tui::run_tui(app, client).await {
                eprintln!("TUI error: {}", e);
                std::process::exit(EXIT_NETWORK);
            }
        }
        Commands::Faculties => {
            let faculties = fetch_or_exit(studrank::api::faculties(&client).await);
            println!(
                "{}",
                studrank::output::format_faculties(&faculties, use_colors)
            );
        }
        Commands::Specialities { faculty } => {
            let specialities = fetch_or_exit(studrank::api::specialities(&client, faculty).await);
            println!(
                "{}",
                studrank::output::format_specialities(&specialities, use_colors)
            );
        }
        Commands::Courses {
            faculty,
            speciality,
        } => {
            let courses = fetch_or_exit(studrank::api::courses(&client, faculty, speciality).await);
            println!("{}", studrank::output::format_courses(&courses, use_colors));
        }
        Commands::Roster { speciality, course } => {
            let roster = fetch_or_exit(studrank::api::roster(&client, speciality, course).await);
            println!("{}", studrank::output::format_roster(&roster, use_colors));
        }
        Commands::Subjects { speciality, course } => {
            let data = fetch_or_exit(
                studrank::fetch::fetch_roster_data(
                    &client,
                    speciality,
                    course,
                    config.max_concurrent_fetches,
                    cli.verbose,
                )
                .await,
            );
            println!(
                "{}",
                studrank::output::format_subjects(&data.catalog, use_colors)
            );
        }
        Commands::Rank {
            speciality,
            course,
            subject,
            lesson_type,
            by_sum,
            top,
            from,
            to,
            tsv,
        } => {
            let data = fetch_or_exit(
                studrank::fetch::fetch_roster_data(
                    &client,
                    speciality,
                    course,
                    config.max_concurrent_fetches,
                    cli.verbose,
                )
                .await,
            );

            if cli.verbose && !data.catalog.subjects().contains(&subject.as_str()) {
                eprintln!(
                    "Note: subject '{}' was not seen in any student's records",
                    subject
                );
            }

            let mode = if by_sum {
                RankMode::BySum
            } else {
                RankMode::ByAverage
            };
            let ranked = rank_students(
                &data.roster,
                &data.details,
                &subject,
                lesson_type.as_deref(),
                mode,
            );

            let display = top.map(|percent| {
                let from = from.unwrap_or(f64::NEG_INFINITY);
                let to = to.unwrap_or(f64::INFINITY);
                if from > to {
                    eprintln!("Invalid range: --from {} is greater than --to {}", from, to);
                    std::process::exit(EXIT_CONFIG);
                }
                apply_highlight(&ranked, &HighlightSpec::new(percent, from, to))
            });

            if tsv {
                println!("{}", studrank::output::format_ranked_tsv(&ranked));
            } else {
                println!(
                    "{}",
                    studrank::output::format_ranked(&ranked, display.as_deref(), use_colors)
                );
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn fetch_or_exit<T>(result: anyhow::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_NETWORK);
        }
    }
}
