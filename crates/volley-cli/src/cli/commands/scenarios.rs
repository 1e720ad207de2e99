use super::super::args::ScenariosArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};
use volley_core::config::{builtin_scenarios, load_config};
use volley_core::errors::RunError;
use volley_core::model::{AmountSpec, DisbursementType, Scenario};

/// Prints the effective weighted table. Falls back to the built-in
/// table when no config file exists, so the command works out of the
/// box.
pub(crate) fn run(args: ScenariosArgs) -> anyhow::Result<i32> {
    let scenarios = match load_config(&args.config) {
        Ok(cfg) => cfg.scenarios,
        Err(RunError::MissingConfig { .. }) => builtin_scenarios(),
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };
    print_table(&scenarios);
    Ok(SUCCESS)
}

fn print_table(scenarios: &[Scenario]) {
    println!(
        "{:<28} {:>6}  {:<8} {:<12} {:<8} {}",
        "NAME", "WEIGHT", "TYPE", "ACCOUNT", "VERIFY", "AMOUNT"
    );
    for sc in scenarios {
        let kind = match sc.disbursement_type {
            DisbursementType::Instant => "INSTANT",
            DisbursementType::Default => "DEFAULT",
        };
        let amount = match &sc.amount {
            AmountSpec::Random => "random".to_string(),
            AmountSpec::Fixed(q) => q.clone(),
        };
        println!(
            "{:<28} {:>5}%  {:<8} {:<12} {:<8} {}",
            sc.name,
            sc.weight,
            kind,
            sc.account_number,
            if sc.skip_recipient_account_verification {
                "skip"
            } else {
                "full"
            },
            amount
        );
    }
}
