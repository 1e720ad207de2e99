use super::super::args::ValidateArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};
use volley_core::config::load_config;

pub(crate) fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    match load_config(&args.config) {
        Ok(cfg) => {
            let total: u32 = cfg.scenarios.iter().map(|s| s.weight).sum();
            eprintln!(
                "Config OK: {} scenarios (weights sum {}), {} iterations, {} VUs, timeout {}ms",
                cfg.scenarios.len(),
                total,
                cfg.settings.iterations,
                cfg.settings.vus,
                cfg.settings.timeout_ms
            );
            Ok(SUCCESS)
        }
        Err(e) => {
            eprintln!("config error: {e}");
            Ok(CONFIG_ERROR)
        }
    }
}
