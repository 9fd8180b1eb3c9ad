//! planspec - publish CI plan definitions
//!
//! ## Commands
//!
//! - `list`: built-in plan definitions
//! - `validate`: check a plan without contacting the server
//! - `render`: print the document that would be published
//! - `publish`: create or replace the plan on the CI server
//!
//! A `<PLAN>` argument is a built-in name or a `.json`/`.toml` file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use planspec_core::{
    catalog, init_tracing, load_plan_file, loader, publish_plan, wire, Credentials,
    HttpPlanServer, MemoryPlanServer, Plan, PlanServer, PublishReceipt, PublisherConfig,
};

#[derive(Parser)]
#[command(name = "planspec")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publish CI plan definitions to a build server", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in plan definitions
    List,

    /// Validate a plan and print its identity and digest
    Validate {
        /// Built-in plan name or definition file
        plan: String,
    },

    /// Print a plan without publishing it
    Render {
        /// Built-in plan name or definition file
        plan: String,

        #[arg(short, long, value_enum, default_value_t = RenderFormat::Json)]
        format: RenderFormat,
    },

    /// Create or replace a plan on the CI server
    Publish {
        /// Built-in plan name or definition file
        plan: String,

        /// Server base URL (overrides credentials file and environment)
        #[arg(long)]
        server: Option<String>,

        /// Credentials file (default: ./.credentials when present)
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Bearer token (overrides credentials file and PLANSPEC_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Publish timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Publish into an in-memory server instead
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RenderFormat {
    /// Wire document, as sent to the server
    Json,
    /// Plan definition file
    Toml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Validate { plan } => cmd_validate(&plan),
        Commands::Render { plan, format } => cmd_render(&plan, format),
        Commands::Publish {
            plan,
            server,
            credentials,
            token,
            timeout_secs,
            dry_run,
        } => {
            let overrides = Overrides {
                server,
                token,
                timeout_secs,
            };
            cmd_publish(&plan, credentials.as_deref(), overrides, dry_run).await
        }
    }
}

/// Resolve a `<PLAN>` argument: catalog name first, then file path.
fn resolve_plan(reference: &str) -> Result<Plan> {
    if let Some(plan) = catalog::lookup(reference) {
        return plan.with_context(|| format!("Failed to build built-in plan {reference}"));
    }

    let path = Path::new(reference);
    if !path.exists() {
        let known: Vec<_> = catalog::names().collect();
        bail!(
            "{reference} is neither a built-in plan ({}) nor an existing file",
            known.join(", ")
        );
    }
    load_plan_file(path).with_context(|| format!("Failed to load plan from {}", path.display()))
}

fn cmd_list() -> Result<()> {
    for name in catalog::names() {
        let Some(plan) = catalog::lookup(name) else {
            continue;
        };
        let plan = plan?;
        println!("{:<12} {:<16} {}", name, plan.identity(), plan.name);
    }
    Ok(())
}

fn cmd_validate(reference: &str) -> Result<()> {
    let validated = resolve_plan(reference)?
        .validate()
        .with_context(|| format!("Plan {reference} is invalid"))?;

    let plan = validated.plan();
    let jobs: usize = plan.stages.iter().map(|s| s.jobs.len()).sum();
    println!("Plan:    {}", validated.identity());
    println!("Oid:     {}", plan.oid);
    println!("Digest:  {}", validated.digest());
    println!("Stages:  {}", plan.stages.len());
    println!("Jobs:    {}", jobs);
    println!("Enabled: {}", if plan.enabled { "yes" } else { "no" });
    Ok(())
}

fn cmd_render(reference: &str, format: RenderFormat) -> Result<()> {
    let validated = resolve_plan(reference)?
        .validate()
        .with_context(|| format!("Plan {reference} is invalid"))?;

    let output = match format {
        RenderFormat::Json => serde_json::to_string_pretty(&wire::to_document(&validated))?,
        RenderFormat::Toml => loader::to_toml(validated.plan())?,
    };
    println!("{output}");
    Ok(())
}

/// Flag values layered over the loaded configuration.
struct Overrides {
    server: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

fn publisher_config(credentials_file: Option<&Path>, overrides: Overrides) -> Result<PublisherConfig> {
    let mut config =
        PublisherConfig::load(credentials_file).context("Failed to load publisher configuration")?;
    if let Some(server) = overrides.server {
        config.server_url = server;
    }
    if let Some(token) = overrides.token {
        config = config.with_credentials(Credentials::Token { token });
    }
    if let Some(secs) = overrides.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn cmd_publish(
    reference: &str,
    credentials_file: Option<&Path>,
    overrides: Overrides,
    dry_run: bool,
) -> Result<()> {
    let plan = resolve_plan(reference)?;

    let server: Box<dyn PlanServer> = if dry_run {
        info!("Dry run: publishing to in-memory server");
        Box::new(MemoryPlanServer::new())
    } else {
        let config = publisher_config(credentials_file, overrides)?;
        if config.credentials.is_none() {
            tracing::warn!(server = %config.server_url, "No credentials configured");
        }
        info!(server = %config.server_url, "Publishing to CI server");
        Box::new(HttpPlanServer::new(config)?)
    };

    let receipt = publish_plan(server.as_ref(), plan)
        .await
        .with_context(|| format!("Failed to publish {reference}"))?;
    print_receipt(&receipt);
    Ok(())
}

fn print_receipt(receipt: &PublishReceipt) {
    println!("Plan:      {}", receipt.identity);
    println!("Oid:       {}", receipt.identity.oid);
    println!("Outcome:   {:?}", receipt.outcome);
    println!("Digest:    {}", receipt.digest);
    println!("Published: {}", receipt.published_at.to_rfc3339());
}
