use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use essay_contest::cli::{Cli, Command};
use essay_contest::config::ContestConfig;
use essay_contest::intake::load_zones;
use essay_contest::narration::ConsoleNarrator;
use essay_contest::report;
use judging::{CompetitionMode, InferenceClient, Orchestrator, PROMPT_VERSION};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ContestConfig::resolve(&cli.options)?;
    let client = InferenceClient::new(config.endpoint())?;

    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => bail!(
            "cannot reach Ollama at {} ({e}); make sure it is running: ollama run {}",
            config.ollama_url,
            config.model
        ),
    };

    let Some((mode, zones)) = cli.command.competition()? else {
        for model in &models {
            println!("{model}");
        }
        return Ok(());
    };

    info!(
        url = %config.ollama_url,
        model = %config.model,
        available = models.len(),
        prompt_version = PROMPT_VERSION,
        "essay contest starting"
    );
    if !models.iter().any(|m| m == &config.model || m.starts_with(&format!("{}:", config.model))) {
        warn!(model = %config.model, available = ?models, "configured model not listed by the service");
    }

    let (folders, inputs): (Vec<PathBuf>, Vec<_>) = load_zones(&zones, mode)?.into_iter().unzip();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing the current call and stopping");
            interrupt.cancel();
        }
    });

    let judging_config = config.judging_config();
    let top_k = judging_config.top_k;
    let orchestrator = Orchestrator::new(judging_config, Arc::new(client))?
        .with_observer(Arc::new(ConsoleNarrator::new()))
        .with_cancellation(cancel);
    let result = orchestrator.run(mode, inputs).await?;

    for (zone, folder) in result.zones.iter().zip(&folders) {
        if config.move_excluded {
            report::relocate_excluded(folder, zone);
        }
        if zone.is_empty() {
            warn!(zone = %zone.zone_name(), "no Independence Day essays found, no zone report written");
        } else {
            let outputs = report::write_zone_outputs(folder, zone)
                .with_context(|| format!("writing results for zone '{}'", zone.zone_name()))?;
            println!("Results saved to: {}", outputs.markdown.display());
        }
        println!("{}", report::console_summary(zone));
    }

    if mode == CompetitionMode::MultiZone {
        if let Some(narrative) = result.cross_zone_narrative() {
            println!("GRAND CHAMPIONSHIP RESULTS\n{narrative}\n");
        }
        let path = report::write_championship(&config.output_dir, &result, top_k, Local::now())?;
        println!("Championship report: {}", path.display());
    }

    if result.interrupted {
        warn!("run was interrupted; reports cover only the essays judged before the interrupt");
    }
    Ok(())
}
