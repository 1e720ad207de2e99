use std::sync::Arc;

use super::super::args::RunArgs;
use crate::exit_codes::{CHECKS_FAILED, CONFIG_ERROR, SETUP_ERROR, SUCCESS};
use volley_core::auth::TokenClient;
use volley_core::config::{load_config, LoadConfig};
use volley_core::engine::Runner;
use volley_core::graphql::DisbursementClient;
use volley_core::report::{build_report, console, write_report};

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let mut cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };
    apply_overrides(&mut cfg, &args);
    // Overrides can break invariants the file alone satisfied.
    if let Err(e) = cfg.validate() {
        eprintln!("config error: {e}");
        return Ok(CONFIG_ERROR);
    }

    // Setup phase: one token for the whole run.
    let token_client = match TokenClient::new(cfg.target.token_url.clone(), cfg.settings.timeout_ms)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return Ok(SETUP_ERROR);
        }
    };
    let token = match token_client.fetch_token(&cfg.oauth).await {
        Ok(token) => token,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return Ok(SETUP_ERROR);
        }
    };
    let client = match DisbursementClient::new(
        cfg.target.graphql_url.clone(),
        &token,
        cfg.settings.timeout_ms,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return Ok(SETUP_ERROR);
        }
    };

    let total = cfg.settings.iterations;
    eprintln!("Running {} iterations across {} VUs...", total, cfg.settings.vus);
    let progress = console::default_progress_sink(total as usize);
    let runner = Runner {
        client,
        scenarios: Arc::new(cfg.scenarios.clone()),
        settings: cfg.settings.clone(),
    };
    let artifacts = runner.run_load(progress).await?;

    let report = build_report(&cfg, &artifacts, args.detail);
    if let Err(e) = write_report(&report, &args.out) {
        eprintln!("WARNING: failed to write {}: {}", args.out.display(), e);
    }
    console::print_summary(&report.results);
    console::print_run_footer(artifacts.seed);

    Ok(if report.results.pass_all {
        SUCCESS
    } else {
        CHECKS_FAILED
    })
}

fn apply_overrides(cfg: &mut LoadConfig, args: &RunArgs) {
    if let Some(iterations) = args.iterations {
        cfg.settings.iterations = iterations;
    }
    if let Some(vus) = args.vus {
        cfg.settings.vus = vus;
    }
    if let Some(seed) = args.seed {
        cfg.settings.seed = Some(seed);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        cfg.settings.timeout_ms = timeout_ms;
    }
}
