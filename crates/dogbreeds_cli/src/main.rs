//! Command-line entry point for the breed catalog.
//!
//! # Responsibility
//! - Expose each catalog route as a subcommand.
//! - Resolve configuration, start logging and open the database once.
//!
//! # Invariants
//! - Exit code is non-zero when an action is rejected or fails.

use clap::{Args, Parser, Subcommand};
use dogbreeds_core::db::open_db;
use dogbreeds_core::{
    display_name, init_logging, ActionOutcome, AppConfig, BreedGroup, CatalogService,
    EditDogRequest, SqliteBreedRepository,
};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "dogbreeds")]
#[command(version, about = "Manage a catalog of dog breeds and sub-breeds", long_about = None)]
struct Cli {
    /// SQLite database file (overrides DOGBREEDS_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Log level (overrides DOGBREEDS_LOG_LEVEL).
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Directory for rotating log files (overrides DOGBREEDS_LOG_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List breeds grouped with their sub-breeds
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a breed, optionally with a sub-breed
    AddDog(AddDogArgs),
    /// Attach a sub-breed to a breed
    AddSubBreed(BreedPairArgs),
    /// Delete a breed and all of its sub-breeds
    DeleteBreed {
        #[arg(long)]
        breed: String,
    },
    /// Delete one sub-breed
    DeleteSubBreed(BreedPairArgs),
    /// Rename a breed and/or its sub-breeds
    EditDog(EditDogArgs),
}

#[derive(Debug, Args)]
struct AddDogArgs {
    #[arg(long)]
    breed: String,
    #[arg(long)]
    sub_breed: Option<String>,
}

#[derive(Debug, Args)]
struct BreedPairArgs {
    #[arg(long)]
    breed: String,
    #[arg(long)]
    sub_breed: String,
}

#[derive(Debug, Args)]
struct EditDogArgs {
    #[arg(long)]
    original_breed: String,
    /// New breed name; defaults to the original name
    #[arg(long)]
    breed: Option<String>,
    /// Existing sub-breed name; repeat and pair with --sub-breed
    #[arg(long = "original-sub-breed")]
    original_sub_breeds: Vec<String>,
    /// Replacement sub-breed name, in the same order as --original-sub-breed
    #[arg(long = "sub-breed")]
    sub_breeds: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let mut conn = open_db(&config.db_path)?;
    let repo = SqliteBreedRepository::try_new(&mut conn)?;
    let mut service = CatalogService::new(repo);

    let outcome = match cli.command {
        Command::List { json } => {
            let groups = service.list_grouped()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print_groups(&groups);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::AddDog(args) => service.add_dog(&args.breed, args.sub_breed.as_deref())?,
        Command::AddSubBreed(args) => service.add_sub_breed(&args.breed, &args.sub_breed)?,
        Command::DeleteBreed { breed } => service.delete_breed(&breed)?,
        Command::DeleteSubBreed(args) => service.delete_sub_breed(&args.breed, &args.sub_breed)?,
        Command::EditDog(args) => {
            let request = EditDogRequest {
                breed: args.breed.unwrap_or_else(|| args.original_breed.clone()),
                original_breed: args.original_breed,
                original_sub_breeds: args.original_sub_breeds,
                sub_breeds: args.sub_breeds,
            };
            service.edit_dog(&request)?
        }
    };

    Ok(report(&outcome))
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(if dir.is_absolute() {
            dir.clone()
        } else {
            std::env::current_dir()?.join(dir)
        });
    }
    config.validate()?;
    Ok(config)
}

fn print_groups(groups: &[BreedGroup]) {
    if groups.is_empty() {
        println!("No breeds yet.");
        return;
    }
    for group in groups {
        if group.sub_breeds.is_empty() {
            println!("{}", display_name(&group.breed));
        } else {
            let sub_breeds: Vec<String> = group
                .sub_breeds
                .iter()
                .map(|sub_breed| display_name(sub_breed))
                .collect();
            println!("{}: {}", display_name(&group.breed), sub_breeds.join(", "));
        }
    }
}

fn report(outcome: &ActionOutcome) -> ExitCode {
    info!(
        "event=cli_action module=cli status={} message={}",
        if outcome.ok { "ok" } else { "rejected" },
        outcome.message
    );
    if outcome.ok {
        println!("{}", outcome.message);
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", outcome.message);
        ExitCode::FAILURE
    }
}
