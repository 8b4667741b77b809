use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use suplementa_core::catalog::Catalog;
use suplementa_core::config::Settings;
use suplementa_core::domain::contract::RequestPayload;
use suplementa_core::domain::marker::{MarkerId, MarkerModifiers};
use suplementa_core::domain::parse_id;
use suplementa_core::domain::request::{Gender, TimeOfDay};
use suplementa_core::pipeline::pricing::PlaceholderPricing;
use suplementa_core::pipeline::{classifier, Pipeline, PipelineOptions};

#[derive(Debug, Parser)]
#[command(name = "suplementa")]
struct Args {
    /// Directory holding markers.json, supplements.json, goals.json and rules.json.
    /// Overrides CATALOG_DIR; the bundled catalog is used when neither is set.
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full pipeline on a JSON request file and print the output.
    Recommend {
        #[arg(long)]
        request: PathBuf,

        /// Seed for placeholder pricing, for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        pretty: bool,
    },
    /// Classify a single marker value.
    Classify {
        #[arg(long)]
        marker: String,

        #[arg(long)]
        value: f64,

        /// manana | noche
        #[arg(long)]
        time_of_day: Option<String>,

        /// hombre | mujer
        #[arg(long)]
        gender: Option<String>,
    },
    /// Check the catalog for gaps and broken references. Exits non-zero on issues.
    ValidateCatalog,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if args.catalog_dir.is_some() {
        settings.catalog_dir = args.catalog_dir;
    }

    let result = run(args.command, &settings);
    if let Err(e) = &result {
        sentry_anyhow::capture_anyhow(e);
        tracing::error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let catalog = Catalog::load(settings)?;

    match command {
        Command::Recommend {
            request,
            seed,
            pretty,
        } => {
            let raw = std::fs::read_to_string(&request)
                .with_context(|| format!("read request file {}", request.display()))?;
            let payload: RequestPayload = serde_json::from_str(&raw)
                .with_context(|| format!("parse request file {}", request.display()))?;
            let user_request = payload.validate_and_into_request()?;

            let mut pricing = match seed {
                Some(seed) => PlaceholderPricing::seeded(seed),
                None => PlaceholderPricing::from_settings(settings),
            };
            let pipeline = Pipeline::new(&catalog, PipelineOptions::from_settings(settings));
            let output = pipeline.run(&user_request, &mut pricing)?;

            tracing::info!(
                recommendations = output.recommendations.len(),
                combinations = output.combinations.len(),
                diagnostics = output.diagnostics.len(),
                "pipeline run finished"
            );

            let rendered = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{rendered}");
        }
        Command::Classify {
            marker,
            value,
            time_of_day,
            gender,
        } => {
            let marker_id = parse_id::<MarkerId>(&marker)
                .with_context(|| format!("unknown marker id: {marker}"))?;
            let time_of_day = time_of_day
                .map(|raw| {
                    parse_id::<TimeOfDay>(&raw)
                        .with_context(|| format!("unknown time of day: {raw}"))
                })
                .transpose()?;
            let gender = gender
                .map(|raw| parse_id::<Gender>(&raw).with_context(|| format!("unknown gender: {raw}")))
                .transpose()?
                .filter(|g| *g != Gender::Other);

            let modifiers = MarkerModifiers {
                time_of_day,
                gender,
            };
            let range = classifier::classify(&catalog, marker_id, value, &modifiers)?;
            println!("{}", serde_json::to_string_pretty(range)?);
        }
        Command::ValidateCatalog => {
            let issues = catalog.validate();
            if issues.is_empty() {
                tracing::info!("catalog is consistent");
                return Ok(());
            }
            for issue in &issues {
                println!("{}", serde_json::to_string(issue)?);
            }
            anyhow::bail!("catalog has {} issue(s)", issues.len());
        }
    }

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
