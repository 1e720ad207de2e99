//! Domain model: the weighted scenario table and the GraphQL mutation
//! variables it materializes into. Field casing on the wire follows the
//! variable names in the mutation document (camelCase).

use serde::{Deserialize, Serialize};

/// Disbursement rail requested for a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisbursementType {
    Instant,
    Default,
}

/// Beneficiary account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Current,
    Savings,
}

/// How a scenario chooses the payout amount.
///
/// `random` draws a fresh amount per iteration; `fixed` repeats the
/// same quantity string (some upstream test accounts only accept a
/// known amount).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSpec {
    #[default]
    Random,
    Fixed(String),
}

/// One row of the weighted scenario table.
///
/// `weight` is a relative percentage; the table is validated so that
/// weights sum to exactly 100 before a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub weight: u32,
    pub beneficiary_name: String,
    pub account_number: String,
    #[serde(default)]
    pub account_type: AccountType,
    pub bank_id: String,
    #[serde(rename = "type")]
    pub disbursement_type: DisbursementType,
    pub skip_recipient_account_verification: bool,
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub amount: AmountSpec,
}

/// GraphQL `MoneyInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyInput {
    pub quantity: String,
    pub currency: String,
}

/// Variables for the `CreateDisbursement` mutation, one set per
/// iteration. Nonce and (for random scenarios) amount are fresh each
/// time; everything else comes from the selected scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementVariables {
    pub amount: MoneyInput,
    pub nonce: String,
    pub beneficiary_reference: String,
    pub name: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub bank_id: String,
    #[serde(rename = "type")]
    pub disbursement_type: DisbursementType,
    pub skip_recipient_account_verification: bool,
}

/// Outcome of one iteration's status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationStatus {
    /// HTTP 200.
    Pass,
    /// Any other HTTP status.
    Fail,
    /// The request never produced a status (transport error, panic).
    Error,
}

/// Per-iteration result row, collected in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRow {
    pub index: u64,
    pub scenario: String,
    pub status: IterationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
