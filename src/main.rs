use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use portal::api::{HttpPortalApi, QueryParams};
use portal::config::Config;
use portal::entities::{AllocationsPage, FileListingParams, FilesSection, SystemColumn};
use portal::logger;
use portal::orchestrator::{configure_store, SagaContext};
use portal::store::{types, Action, Store};

#[derive(Parser)]
#[command(author, version, about = "Command line client for the portal workspace and data files")]
struct Cli {
    /// Config file to use instead of the discovered one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List workspace jobs
    Jobs {
        #[arg(short, long = "param", value_parser = parse_param, help = "Query parameter as key=value")]
        params: Vec<(String, String)>,
    },
    /// Submit the job described by a JSON file
    Submit { file: PathBuf },
    /// List a data files folder
    Files {
        #[arg(long, help = "Storage system, defaults to files.default_system")]
        system: Option<String>,
        #[arg(default_value = "")]
        path: String,
        #[arg(long)]
        api: Option<String>,
        #[arg(long)]
        scheme: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show active or expired allocations
    Allocations {
        #[arg(long)]
        expired: bool,
    },
    /// List storage systems
    Systems,
    /// Write a default config file
    #[command(name = "init-config")]
    InitConfig { path: Option<PathBuf> },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

/// Dispatch `intent` and pump the store until one of `terminal` is seen.
async fn run(store: &mut Store, intent: Action, terminal: &[&str]) -> Option<Action> {
    store.dispatch(intent);
    store
        .run_until(|action| terminal.contains(&action.action_type()))
        .await
        .pop()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { path } = &cli.command {
        let path = match path {
            Some(path) => path.clone(),
            None => Config::get_default_config_path()?,
        };
        return Config::generate_default_config(path);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    let _logs = logger::init(&config.logging)?;

    let cookies = config.session.cookie_jar();
    let api = HttpPortalApi::from_config(&config.api, cookies.clone()).context("Failed to build HTTP client")?;
    let ctx = SagaContext::new(Arc::new(api), cookies).with_csrf_cookie_name(&config.session.csrf_cookie_name);
    let mut store = configure_store(ctx);

    match cli.command {
        Commands::Jobs { params } => {
            let mut query = QueryParams::new();
            for (key, value) in params {
                query.insert(&key, value);
            }
            run(&mut store, Action::GetJobs { params: query }, &[types::HIDE_SPINNER]).await;
            print_json(&store.state().jobs.list)?;
        }
        Commands::Submit { file } => {
            let content =
                std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let payload: Value =
                serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", file.display()))?;
            let outcome = run(
                &mut store,
                Action::SubmitJob(payload),
                &[types::SUBMIT_JOB_SUCCESS, types::SUBMIT_JOB_ERROR, types::SYSTEMS_TOGGLE_MODAL],
            )
            .await;
            match outcome {
                Some(Action::SubmitJobSuccess(response)) => print_json(&response)?,
                Some(Action::SubmitJobError(e)) => anyhow::bail!("Submission failed: {}", e),
                Some(Action::SystemsToggleModal(modal)) => {
                    let system = modal.props.system_id().unwrap_or_default();
                    anyhow::bail!("Keys must be pushed to system '{}' before submitting", system);
                }
                _ => anyhow::bail!("Submission ended without an outcome"),
            }
        }
        Commands::Files {
            system,
            path,
            api,
            scheme,
            offset,
        } => {
            let params = FileListingParams {
                api: api.unwrap_or(config.files.default_api.clone()),
                scheme: scheme.unwrap_or(config.files.default_scheme.clone()),
                system: system.unwrap_or(config.files.default_system.clone()),
                path,
                offset,
                limit: config.files.page_size,
            };
            if params.system.is_empty() {
                anyhow::bail!("No system given and files.default_system is not set");
            }
            let intent = Action::FetchFiles {
                params,
                section: FilesSection::FilesListing,
            };
            run(&mut store, intent, &[types::DATA_FILES_SET_FILES, types::DATA_FILES_SET_ERROR]).await;
            let listing = store
                .state()
                .files
                .listing(FilesSection::FilesListing)
                .context("No listing loaded")?;
            if let Some(e) = &listing.error {
                anyhow::bail!("Listing failed: {}", e);
            }
            print_json(&listing.files)?;
        }
        Commands::Allocations { expired } => {
            run(&mut store, Action::GetAllocations, &[types::ADD_ALLOCATIONS, types::ALLOCATIONS_ERROR]).await;
            let state = &store.state().allocations;
            if let Some(e) = &state.error {
                anyhow::bail!("Failed to load allocations: {}", e);
            }
            let page = if expired {
                AllocationsPage::Expired
            } else {
                AllocationsPage::Active
            };
            for allocation in state.allocations.rows(page) {
                println!("{} ({}, PI {})", allocation.project_name, allocation.project_id, allocation.pi);
                let systems = allocation.column(SystemColumn::Systems);
                let awarded = allocation.column(SystemColumn::Awarded);
                let remaining = allocation.column(SystemColumn::Remaining);
                let expires = allocation.column(SystemColumn::Expires);
                let cells = systems.iter().zip(&awarded).zip(&remaining).zip(&expires);
                for (((system, awarded), remaining), expires) in cells {
                    println!(
                        "  {:<24} awarded {:>10}  remaining {:>10}  expires {}",
                        system, awarded, remaining, expires
                    );
                }
            }
        }
        Commands::Systems => {
            run(&mut store, Action::FetchSystems, &[types::SYSTEMS_LIST, types::SYSTEMS_LIST_ERROR]).await;
            let state = &store.state().systems;
            if let Some(e) = &state.list_error {
                anyhow::bail!("Failed to list systems: {}", e);
            }
            print_json(&state.list)?;
        }
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}
