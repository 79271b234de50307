//! Mutation request payloads sent to the aggregation API

use serde::Serialize;

/// Payload for creating a new account setup task.
///
/// Credentials are an ordered list matching the bank's login form fields
/// (see `LoginSettings::credentials`).
#[derive(Debug, Clone, Serialize)]
pub struct SetupAccountRequest {
    /// Bank code of the bank to connect
    pub bank_code: String,
    /// Country the bank operates in (ISO 3166-1 alpha-2)
    pub country: String,
    /// Ordered login credentials
    pub credentials: Vec<String>,
    /// Store the PIN server-side for automatic synchronization
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub save_pin: bool,
    /// Sync tasks to run during the initial synchronization
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sync_tasks: Vec<String>,
}

impl SetupAccountRequest {
    /// Request with the mandatory fields; optional fields start empty.
    pub fn new(
        bank_code: impl Into<String>,
        country: impl Into<String>,
        credentials: Vec<String>,
    ) -> Self {
        Self {
            bank_code: bank_code.into(),
            country: country.into(),
            credentials,
            save_pin: false,
            sync_tasks: Vec::new(),
        }
    }
}

/// Payload for creating a synchronization task
#[derive(Debug, Clone, Serialize, Default)]
pub struct SyncRequest {
    /// Opaque state echoed back at the end of the process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// URI the user is redirected to when the process completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Sync tasks to run; transactions are synced by default
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sync_tasks: Vec<String>,
}

/// Payload for submitting a stored payment to the bank
#[derive(Debug, Clone, Serialize)]
pub struct SubmitPaymentRequest {
    /// TAN scheme selected by the user
    pub tan_scheme_id: String,
    /// Opaque state forwarded to the callback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Callback URI notified when the submission finishes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl SubmitPaymentRequest {
    /// Request for the given TAN scheme with no callback configured
    pub fn new(tan_scheme_id: impl Into<String>) -> Self {
        Self {
            tan_scheme_id: tan_scheme_id.into(),
            state: None,
            redirect_uri: None,
        }
    }
}

/// Payload toggling the visited flag of transactions or securities
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VisitedRequest {
    /// New value of the visited flag
    pub visited: bool,
}

/// Payload fixing a new display order for the user's accounts
#[derive(Debug, Clone, Serialize)]
pub struct AccountOrderRequest {
    /// Account IDs in the desired order
    pub accounts: Vec<AccountOrderEntry>,
}

/// One entry of an account order request
#[derive(Debug, Clone, Serialize)]
pub struct AccountOrderEntry {
    /// Account ID
    pub account_id: String,
}

impl AccountOrderRequest {
    /// Order request from a list of account IDs
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accounts: ids
                .into_iter()
                .map(|id| AccountOrderEntry {
                    account_id: id.into(),
                })
                .collect(),
        }
    }
}

/// Description of a hosted business process to run on behalf of the user
#[derive(Debug, Clone, Serialize, Default)]
pub struct BusinessProcess {
    /// E-mail address of the user the process runs for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Password of that user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// URI the user is redirected to afterwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Opaque state echoed back on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Process steps, executed in order
    pub steps: Vec<ProcessStep>,
}

/// One step of a business process
#[derive(Debug, Clone, Serialize)]
pub struct ProcessStep {
    /// Step type
    #[serde(rename = "type")]
    pub step_type: String,
    /// Step options, interpreted per step type
    pub options: serde_json::Value,
}
