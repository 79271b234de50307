//! Domain models as delivered by the aggregation API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =========================================================================
// ACCOUNTS
// =========================================================================

/// A bank account the user granted access to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Internal account ID
    pub account_id: String,
    /// ID of the bank contact this account belongs to
    pub bank_id: Option<String>,
    /// Account name
    pub name: Option<String>,
    /// Account owner
    pub owner: Option<String>,
    /// Automatic synchronization enabled
    #[serde(default)]
    pub auto_sync: bool,
    /// Account number
    pub account_number: Option<String>,
    /// Bank code
    pub bank_code: Option<String>,
    /// Bank name
    pub bank_name: Option<String>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// IBAN
    pub iban: Option<String>,
    /// BIC
    pub bic: Option<String>,
    /// Account type (e.g. "Giro account", "Credit card")
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Icon URL
    pub icon: Option<String>,
    /// Current balance details, if synchronized
    pub balance: Option<AccountBalance>,
    /// TAN schemes the bank offers for this account
    #[serde(default)]
    pub supported_tan_schemes: Vec<TanScheme>,
    /// ID of the TAN scheme preferred by the user
    pub preferred_tan_scheme: Option<String>,
    /// Whether this account counts into the total balance
    #[serde(default)]
    pub in_total_balance: bool,
}

/// Balance and limit details of one account
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountBalance {
    /// Booked balance
    pub balance: Option<Decimal>,
    /// Timestamp the balance was observed at
    pub balance_date: Option<DateTime<Utc>>,
    /// Credit line
    pub credit_line: Option<Decimal>,
    /// User-set monthly spending limit
    pub monthly_spending_limit: Option<Decimal>,
}

/// TAN scheme offered by a bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TanScheme {
    /// Scheme ID, referenced when submitting a payment
    pub tan_scheme_id: String,
    /// Human readable scheme name
    pub name: Option<String>,
}

// =========================================================================
// TRANSACTIONS
// =========================================================================

/// A booked or pending transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Internal transaction ID
    pub transaction_id: String,
    /// Account the transaction belongs to
    pub account_id: Option<String>,
    /// Counterparty name
    pub name: Option<String>,
    /// Counterparty account number
    pub account_number: Option<String>,
    /// Counterparty bank code
    pub bank_code: Option<String>,
    /// Counterparty bank name
    pub bank_name: Option<String>,
    /// Amount, negative for debits
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// Booking date
    pub booking_date: Option<DateTime<Utc>>,
    /// Value date
    pub value_date: Option<DateTime<Utc>>,
    /// Purpose text
    pub purpose: Option<String>,
    /// Transaction type (e.g. "Transfer", "Direct debit")
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Booking text as supplied by the bank
    pub booking_text: Option<String>,
    /// Whether the transaction is booked (false = pending)
    #[serde(default)]
    pub booked: bool,
    /// Whether the user has seen this transaction
    #[serde(default)]
    pub visited: bool,
    /// Creation timestamp
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Last modification timestamp
    pub modification_timestamp: Option<DateTime<Utc>>,
}

// =========================================================================
// PAYMENTS
// =========================================================================

/// A payment, stored server-side until submitted to the bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Internal payment ID
    pub payment_id: Option<String>,
    /// Account the payment is debited from
    pub account_id: Option<String>,
    /// Payment type (e.g. "Transfer", "Standing order")
    #[serde(rename = "type")]
    pub payment_type: Option<String>,
    /// Recipient name
    pub name: Option<String>,
    /// Recipient account number
    pub account_number: Option<String>,
    /// Recipient bank code
    pub bank_code: Option<String>,
    /// Recipient bank name
    pub bank_name: Option<String>,
    /// Amount to transfer
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// Purpose text
    pub purpose: Option<String>,
    /// Timestamp of submission to the bank, if any
    pub submission_timestamp: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Last modification timestamp
    pub modification_timestamp: Option<DateTime<Utc>>,
}

/// Payee suggestion assembled from past transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProposal {
    /// Payee account number or IBAN
    pub account_number: Option<String>,
    /// Payee bank code or BIC
    pub bank_code: Option<String>,
    /// Payee name
    pub name: Option<String>,
}

// =========================================================================
// STANDING ORDERS & SECURITIES
// =========================================================================

/// A standing order on one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingOrder {
    /// Internal standing order ID
    pub standing_order_id: String,
    /// Account the order is debited from
    pub account_id: Option<String>,
    /// Recipient name
    pub name: Option<String>,
    /// Amount per execution
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// Purpose text
    pub purpose: Option<String>,
    /// Day of the interval the order executes on
    pub execution_day: Option<u32>,
    /// Execution interval (e.g. "monthly")
    pub interval: Option<String>,
    /// First execution date
    pub first_execution_date: Option<DateTime<Utc>>,
    /// Last execution date, if bounded
    pub last_execution_date: Option<DateTime<Utc>>,
}

/// A position in a securities depot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPosition {
    /// Internal security ID
    pub security_id: String,
    /// Depot account the position belongs to
    pub account_id: Option<String>,
    /// Security name
    pub name: Option<String>,
    /// ISIN
    pub isin: Option<String>,
    /// German WKN, if any
    pub wkn: Option<String>,
    /// Quantity held
    pub quantity: Option<Decimal>,
    /// Current market value
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code of the value
    pub currency: Option<String>,
    /// Price per unit
    pub price: Option<Decimal>,
    /// Currency the price is quoted in
    pub price_currency: Option<String>,
    /// Purchase price per unit
    pub purchase_price: Option<Decimal>,
    /// Whether the user has seen this position
    #[serde(default)]
    pub visited: bool,
    /// Timestamp of the last trade
    pub trade_timestamp: Option<DateTime<Utc>>,
}

// =========================================================================
// NOTIFICATIONS, BANKS, USER, CATALOG
// =========================================================================

/// A registered webhook notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Internal notification ID (absent before registration)
    pub notification_id: Option<String>,
    /// Event key being observed (e.g. "/rest/transactions")
    pub observe_key: String,
    /// URI notified when the event fires
    pub notify_uri: String,
    /// Opaque state echoed back in deliveries
    pub state: Option<String>,
}

/// A bank contact (login credentials bundle) of the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankContact {
    /// Internal bank contact ID
    pub bank_id: String,
    /// SEPA creditor ID, if the bank reported one
    pub sepa_creditor_id: Option<String>,
    /// Whether the PIN is stored server-side
    #[serde(default)]
    pub save_pin: bool,
}

/// The user owning this session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal user ID
    pub user_id: String,
    /// Full name
    pub name: Option<String>,
    /// E-mail address
    pub email: Option<String>,
    /// Preferred language (ISO 639-1)
    pub language: Option<String>,
    /// Whether the e-mail address is verified
    #[serde(default)]
    pub verified: bool,
}

/// A supported banking or payment service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Service display name
    pub name: Option<String>,
    /// Bank code used to set up accounts at this service
    pub bank_code: Option<String>,
    /// Icon URL
    pub icon: Option<String>,
}

/// Login form description for one banking service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSettings {
    /// Bank display name
    pub bank_name: Option<String>,
    /// Whether the service is currently supported
    #[serde(default)]
    pub supported: bool,
    /// Icon URL
    pub icon: Option<String>,
    /// Credential fields the user must fill in, in order
    #[serde(default)]
    pub credentials: Vec<CredentialField>,
    /// Authentication type advertised by the bank
    pub auth_type: Option<String>,
    /// Advice text to show alongside the login form
    pub advice: Option<String>,
}

/// One credential input field of a login form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialField {
    /// Field label
    pub label: Option<String>,
    /// Whether input must be masked
    #[serde(default)]
    pub masked: bool,
}

// =========================================================================
// WIRE ENVELOPES
// =========================================================================

/// Error body returned with HTTP 400 responses
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorEnvelope {
    /// Machine readable error code
    #[serde(default)]
    pub error: String,
    /// Human readable description
    #[serde(default)]
    pub error_description: String,
}
