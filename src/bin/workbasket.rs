//! Command-line access to a process engine session.
//!
//! Usage:
//!
//! ```text
//! workbasket catalog
//! workbasket count <queue>
//! workbasket tasks <queue>
//! workbasket columns <queue>
//! workbasket describe-template <name>
//! workbasket locate <work-object-number> <queue>...
//! ```
//!
//! Connection settings come from the `WORKBASKET_*` environment variables
//! described in [`workbasket::config`]. Results are written to stdout as
//! JSON; logs go to stderr, filtered by `RUST_LOG`.

use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use workbasket::catalog::{
    adapters::http::RestDiscovery,
    domain::{CatalogDomainError, QueueName},
    services::{CatalogService, CatalogServiceError},
};
use workbasket::config::{ConfigError, EngineConfig};
use workbasket::rest::{RestClient, RestError};
use workbasket::task::{
    adapters::http::RestProcessEngine,
    domain::{TaskDomainError, WorkObjectNumber},
    services::{
        ConsistencyResolver, LaunchOutcome, LaunchRequest, TaskControlError, TaskInspector,
        WorkflowLauncher,
    },
};
use workbasket::telemetry;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Inspect queues, tasks and templates on a process engine
#[derive(Debug, Parser)]
#[command(name = "workbasket", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Discover appspaces, queues and workflow templates
    Catalog,

    /// Print the number of tasks waiting in a queue
    Count {
        /// Queue (workbasket) name
        queue: String,
    },

    /// List the tasks waiting in a queue
    Tasks {
        /// Queue (workbasket) name
        queue: String,
    },

    /// Show the column definitions of a queue's workbasket
    Columns {
        /// Queue (workbasket) name
        queue: String,
    },

    /// Show the fields, groups and attachment slots a template accepts
    DescribeTemplate {
        /// Workflow template name
        name: String,
    },

    /// Find the queue currently holding a work object
    Locate {
        /// Work object number
        work_object_number: String,

        /// Queues to search, in order
        #[arg(required = true)]
        queues: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] RestError),
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
    #[error(transparent)]
    CatalogDomain(#[from] CatalogDomainError),
    #[error(transparent)]
    TaskDomain(#[from] TaskDomainError),
    #[error(transparent)]
    Task(#[from] TaskControlError),
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
}

fn main() -> Result<(), BoxError> {
    telemetry::init()?;
    let cli = Cli::parse();
    let config = EngineConfig::from_env()?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(cli.command, &config))?;
    Ok(())
}

async fn run(command: Command, config: &EngineConfig) -> Result<(), CliError> {
    let client = RestClient::new(config)?;
    let engine = Arc::new(RestProcessEngine::new(client.clone()));
    match command {
        Command::Catalog => {
            let catalog = CatalogService::new(Arc::new(RestDiscovery::new(client)))
                .discover()
                .await?;
            emit(&catalog)
        }
        Command::Count { queue } => {
            let count = TaskInspector::new(engine)
                .count(&QueueName::new(queue)?)
                .await?;
            emit(&serde_json::json!({ "count": count }))
        }
        Command::Tasks { queue } => {
            let tasks = TaskInspector::new(engine)
                .tasks(&QueueName::new(queue)?)
                .await?;
            emit(&tasks)
        }
        Command::Columns { queue } => {
            let columns = TaskInspector::new(engine)
                .columns(&QueueName::new(queue)?)
                .await?;
            emit(&columns)
        }
        Command::DescribeTemplate { name } => {
            let catalog = CatalogService::new(Arc::new(RestDiscovery::new(client)))
                .discover()
                .await?;
            let outcome = WorkflowLauncher::new(engine, Arc::new(catalog))
                .launch(&LaunchRequest::new(name))
                .await?;
            match outcome {
                LaunchOutcome::Described(shape) => emit(&shape),
                LaunchOutcome::Launched(number) => emit(&number),
            }
        }
        Command::Locate {
            work_object_number,
            queues,
        } => {
            let number = WorkObjectNumber::new(work_object_number)?;
            let tracked = queues
                .into_iter()
                .map(QueueName::new)
                .collect::<Result<Vec<_>, _>>()?;
            let report = ConsistencyResolver::new(engine, Arc::new(DefaultClock))
                .locate(&number, &tracked)
                .await?;
            emit(&report)
        }
    }
}

fn emit<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
