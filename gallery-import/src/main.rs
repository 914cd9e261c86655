use clap::Parser;
use gallery_db::{load_export, merge_sorted, Database, Error, ImportStats, Outcome, Settings};
use log::{info, warn};
use progress_bar::*;
use std::{path::PathBuf, process};

/// Rebuilds the submissions database from artwork and project channel exports.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Chat export of the artwork channel
    artwork_json: PathBuf,

    /// Chat export of the projects channel
    projects_json: PathBuf,

    /// Where to write the submissions database
    #[arg(short, long, default_value = "submissions_db.json")]
    output: PathBuf,

    /// Pretty-print the output json
    #[arg(long)]
    pretty: bool,

    /// Initial value of settings.sticky_enabled
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    sticky_enabled: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(stats) => println!("{}", stats),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<ImportStats, Error> {
    let artwork = load_export(&args.artwork_json, "artwork")?;
    let projects = load_export(&args.projects_json, "projects")?;
    let msgs = merge_sorted(artwork, projects);
    info!("processing {} messages", msgs.len());

    let mut db = Database::new(Settings {
        sticky_enabled: args.sticky_enabled,
        ..Settings::default()
    });
    if !args.quiet {
        init_progress_bar(msgs.len());
        set_progress_bar_action("Importing", Color::Blue, Style::Bold);
    }
    let stats = db.import_with(&msgs, |sourced, outcome| {
        if let Outcome::Duplicate = outcome {
            warn!("message {} appears more than once", sourced.msg.id);
        }
        if !args.quiet {
            inc_progress_bar();
        }
    });
    if !args.quiet {
        finalize_progress_bar();
    }

    db.save(&args.output, args.pretty)?;
    info!("wrote {}", args.output.display());

    Ok(stats)
}
