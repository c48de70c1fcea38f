use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod dashboard;
mod diagnostics;
mod error;
mod flow;
mod input;
mod model;
mod records;
mod render;

#[cfg(test)]
mod fixtures;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "lobby-flow")]
#[command(about = "Lobbying report aggregation and drill-down dashboard", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Actors table (`.csv` with a header row, or a JSON array of rows).
    #[arg(long)]
    actors: PathBuf,

    /// Private sector-weight table.
    #[arg(long)]
    privates: PathBuf,

    /// Public category table.
    #[arg(long)]
    publics: PathBuf,

    /// Reports table.
    #[arg(long)]
    reports: PathBuf,

    /// Sectors kept in the initial flow view.
    #[arg(long, default_value_t = dashboard::DEFAULT_TOP_SECTORS)]
    top_sectors: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the HTML dashboard (validates inputs while running).
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Write the dashboard datasets as JSON (stdout unless -o is given).
    Dataset {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// Replay flow-diagram clicks and print the resulting view as JSON.
    Navigate {
        #[command(flatten)]
        input: InputArgs,

        /// Event to apply, in order: private:SECTOR, public:CATEGORY,
        /// link:SECTOR|CATEGORY or reset.
        #[arg(short = 'e', long = "event", value_name = "EVENT")]
        events: Vec<flow::FlowEvent>,
    },
}

fn load(input: &InputArgs) -> Result<records::RawTables> {
    input::load_tables(&input::InputPaths {
        actors: &input.actors,
        privates: &input.privates,
        publics: &input.publics,
        reports: &input.reports,
    })
}

fn config(input: &InputArgs) -> dashboard::DashboardConfig {
    dashboard::DashboardConfig {
        top_sectors: input.top_sectors,
    }
}

fn build(input: &InputArgs) -> Result<dashboard::DashboardData> {
    // 1) Load raw tables.
    let tables = load(input)?;

    // 2) Normalize + aggregate + explore views. Any integrity error aborts.
    Ok(dashboard::build_dashboard(&tables, &config(input))?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init(cli.verbose);

    match cli.cmd {
        Commands::Report { input, out } => {
            let data = build(&input)?;
            let html = render::render_html_report(&data)?;
            std::fs::write(&out, html)?;
            println!("Wrote {}", out.display());
        }
        Commands::Dataset { input, out } => {
            let data = build(&input)?;
            let json = serde_json::to_string_pretty(&data)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Navigate { input, events } => {
            let tables = load(&input)?;
            let replay = dashboard::replay(&tables, &config(&input), &events)?;
            println!("{}", serde_json::to_string_pretty(&replay)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_command() {
        let cli = Cli::try_parse_from([
            "lobby-flow", "-v", "report", "--actors", "a.json", "--privates", "p.json",
            "--publics", "u.json", "--reports", "r.json", "-o", "out.html",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.cmd {
            Commands::Report { input, out } => {
                assert_eq!(input.top_sectors, dashboard::DEFAULT_TOP_SECTORS);
                assert_eq!(out, PathBuf::from("out.html"));
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn parses_navigate_events() {
        let cli = Cli::try_parse_from([
            "lobby-flow", "navigate", "--actors", "a.csv", "--privates", "p.csv",
            "--publics", "u.csv", "--reports", "r.csv",
            "-e", "private:Energy", "--event", "link:Energy|Municipal", "-e", "reset",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Navigate { events, .. } => {
                let keys: Vec<String> = events.iter().map(|e| e.key()).collect();
                assert_eq!(keys, vec!["private:Energy", "link:Energy|Municipal", "reset"]);
            }
            _ => panic!("expected navigate"),
        }
    }

    #[test]
    fn rejects_unknown_event() {
        assert!(Cli::try_parse_from([
            "lobby-flow", "navigate", "--actors", "a.csv", "--privates", "p.csv",
            "--publics", "u.csv", "--reports", "r.csv", "-e", "zoom:Energy",
        ])
        .is_err());
    }
}
