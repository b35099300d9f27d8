use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use repcoach_lib::commands::{self, ReportQuery};
use repcoach_lib::export::ExportFormat;
use repcoach_lib::models::{KpiSnapshot, NewReport, NewUser, ReportStatus, ReportUpdate, UserRole};
use repcoach_lib::recommendations::{summarize_report, RecommendationStatus, RecommendationType};
use repcoach_lib::{AppState, CommandError, RunOptions};

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 4;

/// KPI values for ad-hoc scoring
#[derive(Args, Debug, Clone, Copy)]
struct KpiArgs {
    /// Sales revenue in dollars
    #[arg(long)]
    sales: f64,
    /// Number of calls made
    #[arg(long)]
    calls: u32,
    /// Number of appointments booked
    #[arg(long)]
    appointments: u32,
    /// Conversion rate as a fraction (0.17 = 17%)
    #[arg(long)]
    conversion_rate: f64,
}

impl From<KpiArgs> for KpiSnapshot {
    fn from(args: KpiArgs) -> Self {
        KpiSnapshot::new(args.sales, args.calls, args.appointments, args.conversion_rate)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert the demo manager, reps and reports
    Seed,
    /// Check credentials and print a session token
    Login { email: String, password: String },
    /// Register a manager or rep
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        /// manager or rep
        #[arg(long, default_value = "rep")]
        role: UserRole,
        /// Manager the new rep reports to
        #[arg(long)]
        manager: Option<String>,
    },
    /// List the reps reporting to a manager
    Team {
        #[arg(long)]
        manager: String,
    },
    /// List reports for a manager or a rep
    Reports {
        #[arg(long)]
        manager: Option<String>,
        #[arg(long)]
        reportee: Option<String>,
    },
    /// Show a single report
    Report { id: String },
    /// Open a new report for a rep
    NewReport {
        #[arg(long)]
        reportee: String,
        #[arg(long)]
        manager: String,
    },
    /// Record a period's KPIs on a report
    RecordKpi {
        id: String,
        /// Period label, e.g. 2025-01
        #[arg(long)]
        period: String,
        #[command(flatten)]
        kpi: KpiArgs,
    },
    /// Show the recorded KPI history of a report
    History { id: String },
    /// Generate and store recommendations for a report
    Analyze { id: String },
    /// Show stored recommendations for a report
    Recommendations {
        id: String,
        /// Only pending recommendations
        #[arg(long)]
        pending: bool,
        /// Filter by type (training, mentoring, review)
        #[arg(long = "type")]
        types: Vec<RecommendationType>,
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Accept a pending recommendation
    Accept { id: String },
    /// Ignore a pending recommendation
    Ignore { id: String },
    /// Set the feedback text on a report
    Feedback { id: String, text: String },
    /// Mark a report completed
    Complete { id: String },
    /// Score ad-hoc KPI values
    Score {
        #[command(flatten)]
        kpi: KpiArgs,
    },
    /// Recommend coaching for ad-hoc KPI values
    Recommend {
        #[command(flatten)]
        kpi: KpiArgs,
        #[arg(long, default_value = "adhoc")]
        report_id: String,
    },
    /// Headline numbers for a manager
    Dashboard {
        #[arg(long)]
        manager: String,
    },
    /// Preview recommendations across a manager's ongoing reports
    Coach {
        #[arg(long)]
        manager: String,
    },
    /// Export a manager's reports
    Export {
        #[arg(long)]
        manager: String,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Output file (defaults to a timestamped file in Downloads)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "repcoach")]
#[command(about = "Sales rep coaching dashboard backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the SQLite database (defaults to the local data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to a JSON file overriding KPI thresholds
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CommandError::Internal(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn execute(state: &AppState, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::Seed => {
            let summary = commands::seed_demo_data(state)?;
            print_json(&serde_json::json!({
                "users": summary.users,
                "reports": summary.reports,
            }))
        }
        Commands::Login { email, password } => {
            print_json(&commands::login(state, &email, &password)?)
        }
        Commands::Register {
            username,
            email,
            password,
            name,
            role,
            manager,
        } => {
            let new_user = NewUser {
                username,
                email,
                password,
                name,
                role,
                manager_id: manager,
            };
            print_json(&commands::create_user(state, new_user)?)
        }
        Commands::Team { manager } => print_json(&commands::get_team_members(state, &manager)?),
        Commands::Reports { manager, reportee } => {
            let query = ReportQuery {
                manager_id: manager,
                reportee_id: reportee,
            };
            print_json(&commands::get_reports(state, &query)?)
        }
        Commands::Report { id } => print_json(&commands::get_report(state, &id)?),
        Commands::NewReport { reportee, manager } => {
            let new_report = NewReport {
                reportee_id: reportee,
                manager_id: manager,
                date_started: None,
                kpi_data: None,
            };
            print_json(&commands::create_report(state, new_report)?)
        }
        Commands::RecordKpi { id, period, kpi } => {
            print_json(&commands::record_kpi_metric(state, &id, kpi.into(), &period)?)
        }
        Commands::History { id } => print_json(&commands::get_kpi_history(state, &id)?),
        Commands::Analyze { id } => print_json(&commands::analyze_report(state, &id)?),
        Commands::Recommendations {
            id,
            pending,
            types,
            limit,
        } => {
            let mut summary = commands::get_report_recommendations(state, &id)?;
            if pending {
                summary = summary.pending_only();
            }
            if !types.is_empty() {
                summary = summary.with_types(&types);
            }
            if let Some(n) = limit {
                summary = summary.limit(n);
            }
            print_json(&summary)
        }
        Commands::Accept { id } => print_json(&commands::update_recommendation_status(
            state,
            &id,
            RecommendationStatus::Accepted,
        )?),
        Commands::Ignore { id } => print_json(&commands::update_recommendation_status(
            state,
            &id,
            RecommendationStatus::Ignored,
        )?),
        Commands::Feedback { id, text } => {
            let update = ReportUpdate {
                feedback: Some(text),
                ..Default::default()
            };
            print_json(&commands::update_report(state, &id, update)?)
        }
        Commands::Complete { id } => {
            let update = ReportUpdate {
                status: Some(ReportStatus::Completed),
                ..Default::default()
            };
            print_json(&commands::update_report(state, &id, update)?)
        }
        Commands::Score { kpi } => {
            print_json(&commands::analyze_snapshot(state, kpi.into(), "adhoc"))
        }
        Commands::Recommend { kpi, report_id } => {
            let snapshot: KpiSnapshot = kpi.into();
            print_json(&summarize_report(&snapshot, &report_id, &state.thresholds))
        }
        Commands::Dashboard { manager } => {
            print_json(&commands::get_dashboard_summary(state, &manager)?)
        }
        Commands::Coach { manager } => {
            print_json(&commands::get_team_recommendations(state, &manager)?)
        }
        Commands::Export {
            manager,
            format,
            output,
        } => {
            let path = commands::export_reports(state, &manager, format, output)?;
            print_json(&serde_json::json!({ "path": path.display().to_string() }))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let options = RunOptions {
        db_path: cli.db,
        thresholds_path: cli.thresholds,
        verbose: cli.verbose,
    };

    let state = match repcoach_lib::run(&options) {
        Ok(state) => state,
        Err(e @ CommandError::Config(_)) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
        Err(e) => {
            eprintln!("Startup failed: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    if let Err(e) = execute(&state, cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_FAILURE);
    }
}
