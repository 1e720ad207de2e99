//! YAML run configuration. Secrets are referenced as `${ENV_VAR}` and
//! expanded at load time so credentials never live in the file itself.
//! Validation happens here, before a single request is sent: a table
//! whose weights drift from 100 is a config error, not a runtime
//! surprise.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::RunError;
use crate::model::{AmountSpec, DisbursementType, Scenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadConfig {
    pub target: TargetConfig,
    pub oauth: OauthConfig,
    #[serde(default)]
    pub settings: Settings,
    /// Weighted scenario table; the built-in eight-entry table is used
    /// when omitted.
    #[serde(default = "builtin_scenarios")]
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// OAuth token endpoint (client-credentials grant).
    pub token_url: String,
    /// GraphQL endpoint receiving the disbursement mutations.
    pub graphql_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Total iterations across all virtual users.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Maximum submissions in flight.
    #[serde(default = "default_vus")]
    pub vus: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional seed for reproducible scenario draws.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_nonce_length")]
    pub nonce_length: usize,
    #[serde(default = "default_beneficiary_reference")]
    pub beneficiary_reference: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            vus: default_vus(),
            timeout_ms: default_timeout_ms(),
            seed: None,
            currency: default_currency(),
            nonce_length: default_nonce_length(),
            beneficiary_reference: default_beneficiary_reference(),
        }
    }
}

fn default_iterations() -> u64 {
    2000
}

fn default_vus() -> usize {
    1
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_currency() -> String {
    "ZAR".to_string()
}

fn default_nonce_length() -> usize {
    10
}

fn default_beneficiary_reference() -> String {
    "absa-load-test".to_string()
}

/// Loads, env-expands, and validates a config file.
pub fn load_config(path: &Path) -> Result<LoadConfig, RunError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RunError::MissingConfig {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let mut cfg: LoadConfig =
        serde_yaml::from_str(&raw).map_err(|e| RunError::config_parse(e.to_string()))?;
    cfg.oauth.client_id = expand_env(&cfg.oauth.client_id)?;
    cfg.oauth.client_secret = expand_env(&cfg.oauth.client_secret)?;
    cfg.validate()?;
    Ok(cfg)
}

impl LoadConfig {
    /// Structural validation; every rule here guards a malformed
    /// request or an undefined scenario selection downstream.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.scenarios.is_empty() {
            return Err(RunError::config_parse("scenario table is empty"));
        }
        if let Some(sc) = self.scenarios.iter().find(|s| s.weight == 0) {
            return Err(RunError::config_parse(format!(
                "scenario {:?} has zero weight",
                sc.name
            )));
        }
        // Summed in u64: a hostile table must not wrap back onto 100.
        let total: u64 = self.scenarios.iter().map(|s| u64::from(s.weight)).sum();
        if total != 100 {
            return Err(RunError::config_parse(format!(
                "scenario weights must sum to 100, got {total}"
            )));
        }
        if self.settings.iterations == 0 {
            return Err(RunError::config_parse("iterations must be at least 1"));
        }
        if self.settings.vus == 0 {
            return Err(RunError::config_parse("vus must be at least 1"));
        }
        if self.settings.vus as u64 > self.settings.iterations {
            return Err(RunError::config_parse(format!(
                "vus ({}) exceeds total iterations ({})",
                self.settings.vus, self.settings.iterations
            )));
        }
        if self.oauth.client_id.trim().is_empty() {
            return Err(RunError::config_parse("oauth.client_id is empty"));
        }
        if self.oauth.client_secret.trim().is_empty() {
            return Err(RunError::config_parse("oauth.client_secret is empty"));
        }
        for (label, url) in [
            ("target.token_url", &self.target.token_url),
            ("target.graphql_url", &self.target.graphql_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| RunError::config_parse(format!("{label}: {e}")))?;
        }
        Ok(())
    }
}

/// Expands `${NAME}` references from the process environment. An unset
/// variable is a config error; silently sending an empty secret would
/// just fail the token fetch with a less useful message.
fn expand_env(value: &str) -> Result<String, RunError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| RunError::config_parse(format!("unterminated ${{ in {value:?}")))?;
        let name = &after[..end];
        let resolved = std::env::var(name).map_err(|_| {
            RunError::config_parse(format!("environment variable {name} is not set"))
        })?;
        out.push_str(&resolved);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// The original eight-entry test plan: INSTANT/DEFAULT pairs over a
/// closed account, an account with a hold (fixed amount only), and two
/// open accounts. Weights sum to 100.
pub fn builtin_scenarios() -> Vec<Scenario> {
    fn entry(
        name: &str,
        weight: u32,
        beneficiary_name: &str,
        account_number: &str,
        disbursement_type: DisbursementType,
        skip_verification: bool,
        amount: AmountSpec,
    ) -> Scenario {
        Scenario {
            name: name.to_string(),
            weight,
            beneficiary_name: beneficiary_name.to_string(),
            account_number: account_number.to_string(),
            account_type: Default::default(),
            bank_id: "absa".to_string(),
            disbursement_type,
            skip_recipient_account_verification: skip_verification,
            amount,
        }
    }

    vec![
        entry(
            "closed-account-instant",
            5,
            "Miss K Absa Test",
            "9051101420",
            DisbursementType::Instant,
            true,
            AmountSpec::Random,
        ),
        entry(
            "closed-account-default",
            5,
            "Miss K Absa Test",
            "9051101420",
            DisbursementType::Default,
            true,
            AmountSpec::Random,
        ),
        entry(
            "hold-account-instant",
            5,
            "Mrs M Marais",
            "4047734838",
            DisbursementType::Instant,
            true,
            AmountSpec::Fixed("30.2".to_string()),
        ),
        entry(
            "hold-account-default",
            5,
            "Mrs M Marais",
            "4047734838",
            DisbursementType::Default,
            true,
            AmountSpec::Fixed("30.2".to_string()),
        ),
        entry(
            "open-account-instant",
            20,
            "Mr P Cronje",
            "9051333140",
            DisbursementType::Instant,
            false,
            AmountSpec::Random,
        ),
        entry(
            "open-account-default",
            20,
            "Mr P Cronje",
            "9051333140",
            DisbursementType::Default,
            false,
            AmountSpec::Random,
        ),
        entry(
            "open-account-2-instant",
            20,
            "Mrs M Marais",
            "9051548040",
            DisbursementType::Instant,
            false,
            AmountSpec::Random,
        ),
        entry(
            "open-account-2-default",
            20,
            "Mrs M Marais",
            "9051548040",
            DisbursementType::Default,
            false,
            AmountSpec::Random,
        ),
    ]
}
