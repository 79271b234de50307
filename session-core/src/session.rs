//! Session: the resource accessor surface over the dispatcher.
//!
//! Every method is a thin binding of path + verb + typed shape. By-ID
//! lookups return `Ok(None)` when the server reports the resource as not
//! found; list endpoints return an empty vector.

use crate::{
    config::SessionConfig,
    dispatch::Dispatcher,
    task::BankTask,
    Error, Result,
};
use protocol_core::{
    Account, AccountBalance, AccountOrderRequest, BankContact, BusinessProcess, LoginSettings,
    Notification, Payment, PaymentProposal, ProcessToken, SecurityPosition, Service,
    SetupAccountRequest, StandingOrder, SubmitPaymentRequest, SyncRequest, TaskToken,
    TaskTokenResponse, Transaction, User, VisitedRequest,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Filter options for transaction listings.
///
/// All fields are optional; a default value lists everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
    /// Only return transactions after this transaction ID or date
    pub since: Option<String>,
    /// Limit the number of returned transactions
    pub count: Option<u32>,
    /// Offset into the result set
    pub offset: Option<u32>,
    /// Whether to include pending transactions
    pub include_pending: Option<bool>,
}

impl TransactionOptions {
    fn query(&self) -> String {
        let mut params = Vec::new();
        if let Some(since) = &self.since {
            params.push(format!("since={since}"));
        }
        if let Some(count) = self.count {
            params.push(format!("count={count}"));
        }
        if let Some(offset) = self.offset {
            params.push(format!("offset={offset}"));
        }
        if let Some(include_pending) = self.include_pending {
            params.push(format!(
                "include_pending={}",
                if include_pending { "1" } else { "0" }
            ));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Main entry point to the data-access part of the client library.
///
/// Bound to one user through the bearer access token it was constructed
/// with; the token is immutable for the session's lifetime.
pub struct Session {
    dispatcher: Arc<Dispatcher>,
}

impl Session {
    /// Session against the default endpoint
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(SessionConfig::new(access_token))
    }

    /// Session with explicit configuration
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(config)?),
        })
    }

    /// The dispatcher backing this session, for callers issuing raw
    /// requests alongside the typed accessors
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn body<B: Serialize>(payload: &B) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(payload)?))
    }

    // =====================================================================
    // USER
    // =====================================================================

    /// The user this session belongs to
    pub async fn user(&self) -> Result<Option<User>> {
        self.dispatcher.call(Method::GET, "/rest/user", None).await
    }

    /// Update the user
    pub async fn update_user(&self, user: &User) -> Result<Option<User>> {
        self.dispatcher
            .call(Method::PUT, "/rest/user", Self::body(user)?)
            .await
    }

    /// Delete the user and everything stored for them
    pub async fn remove_user(&self) -> Result<()> {
        self.dispatcher
            .call_void(Method::DELETE, "/rest/user", None)
            .await
    }

    // =====================================================================
    // CATALOG
    // =====================================================================

    /// Supported banking and payment services for a country
    pub async fn supported_services(&self, country_code: &str) -> Result<Vec<Service>> {
        let path = format!("/rest/catalog/services/{country_code}");
        self.dispatcher
            .call_list(Method::GET, &path, None, "services")
            .await
    }

    /// Login form settings for one banking service
    pub async fn login_settings(
        &self,
        country_code: &str,
        bank_code: &str,
    ) -> Result<Option<LoginSettings>> {
        let path = format!("/rest/catalog/banks/{country_code}/{bank_code}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    // =====================================================================
    // ACCOUNTS
    // =====================================================================

    /// All accounts the user granted this client access to
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.dispatcher
            .call_list(Method::GET, "/rest/accounts", None, "accounts")
            .await
    }

    /// The account with the given ID, or absence
    pub async fn account(&self, account_id: &str) -> Result<Option<Account>> {
        let path = format!("/rest/accounts/{account_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Update an account
    pub async fn update_account(&self, account: &Account) -> Result<Option<Account>> {
        let path = format!("/rest/accounts/{}", account.account_id);
        self.dispatcher
            .call(Method::PUT, &path, Self::body(account)?)
            .await
    }

    /// Remove an account
    pub async fn remove_account(&self, account_id: &str) -> Result<()> {
        let path = format!("/rest/accounts/{account_id}");
        self.dispatcher.call_void(Method::DELETE, &path, None).await
    }

    /// Balance and limit details of one account
    pub async fn account_balance(&self, account_id: &str) -> Result<Option<AccountBalance>> {
        let path = format!("/rest/accounts/{account_id}/balance");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Update balance limits of one account
    pub async fn update_account_balance(
        &self,
        account_id: &str,
        balance: &AccountBalance,
    ) -> Result<Option<AccountBalance>> {
        let path = format!("/rest/accounts/{account_id}/balance");
        self.dispatcher
            .call(Method::PUT, &path, Self::body(balance)?)
            .await
    }

    /// Fix a new display order for the user's accounts
    pub async fn set_account_order<I, S>(&self, account_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = AccountOrderRequest::from_ids(account_ids);
        self.dispatcher
            .call_void(Method::PUT, "/rest/accounts", Self::body(&request)?)
            .await
    }

    // =====================================================================
    // TRANSACTIONS
    // =====================================================================

    /// Transactions of one account, or of all accounts when `account_id`
    /// is `None`, filtered by `options`
    pub async fn transactions(
        &self,
        account_id: Option<&str>,
        options: &TransactionOptions,
    ) -> Result<Vec<Transaction>> {
        let path = match account_id {
            Some(id) => format!("/rest/accounts/{id}/transactions{}", options.query()),
            None => format!("/rest/transactions{}", options.query()),
        };
        self.dispatcher
            .call_list(Method::GET, &path, None, "transactions")
            .await
    }

    /// A specific transaction by ID, or absence
    pub async fn transaction(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>> {
        let path = format!("/rest/accounts/{account_id}/transactions/{transaction_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Set the visited flag of one transaction
    pub async fn set_transaction_visited(
        &self,
        account_id: &str,
        transaction_id: &str,
        visited: bool,
    ) -> Result<()> {
        let path = format!("/rest/accounts/{account_id}/transactions/{transaction_id}");
        self.dispatcher
            .call_void(Method::PUT, &path, Self::body(&VisitedRequest { visited })?)
            .await
    }

    /// Set the visited flag of all transactions of one account, or of all
    /// accounts when `account_id` is `None`
    pub async fn set_transactions_visited(
        &self,
        account_id: Option<&str>,
        visited: bool,
    ) -> Result<()> {
        let path = match account_id {
            Some(id) => format!("/rest/accounts/{id}/transactions"),
            None => "/rest/transactions".to_string(),
        };
        self.dispatcher
            .call_void(Method::PUT, &path, Self::body(&VisitedRequest { visited })?)
            .await
    }

    /// Remove a transaction
    pub async fn remove_transaction(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<()> {
        let path = format!("/rest/accounts/{account_id}/transactions/{transaction_id}");
        self.dispatcher.call_void(Method::DELETE, &path, None).await
    }

    // =====================================================================
    // STANDING ORDERS
    // =====================================================================

    /// Standing orders of one account, or of all accounts
    pub async fn standing_orders(&self, account_id: Option<&str>) -> Result<Vec<StandingOrder>> {
        let path = match account_id {
            Some(id) => format!("/rest/accounts/{id}/standing_orders"),
            None => "/rest/standing_orders".to_string(),
        };
        self.dispatcher
            .call_list(Method::GET, &path, None, "standing_orders")
            .await
    }

    /// A specific standing order by ID, or absence
    pub async fn standing_order(
        &self,
        account_id: &str,
        standing_order_id: &str,
    ) -> Result<Option<StandingOrder>> {
        let path = format!("/rest/accounts/{account_id}/standing_orders/{standing_order_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    // =====================================================================
    // SECURITIES
    // =====================================================================

    /// Security positions of one account, or of all accounts
    pub async fn securities(&self, account_id: Option<&str>) -> Result<Vec<SecurityPosition>> {
        let path = match account_id {
            Some(id) => format!("/rest/accounts/{id}/securities"),
            None => "/rest/securities".to_string(),
        };
        self.dispatcher
            .call_list(Method::GET, &path, None, "securities")
            .await
    }

    /// A specific security position by ID, or absence
    pub async fn security(
        &self,
        account_id: &str,
        security_id: &str,
    ) -> Result<Option<SecurityPosition>> {
        let path = format!("/rest/accounts/{account_id}/securities/{security_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Set the visited flag of one security position
    pub async fn set_security_visited(
        &self,
        account_id: &str,
        security_id: &str,
        visited: bool,
    ) -> Result<()> {
        let path = format!("/rest/accounts/{account_id}/securities/{security_id}");
        self.dispatcher
            .call_void(Method::PUT, &path, Self::body(&VisitedRequest { visited })?)
            .await
    }

    /// Set the visited flag of all securities of one account, or of all
    /// accounts when `account_id` is `None`
    pub async fn set_securities_visited(
        &self,
        account_id: Option<&str>,
        visited: bool,
    ) -> Result<()> {
        let path = match account_id {
            Some(id) => format!("/rest/accounts/{id}/securities"),
            None => "/rest/securities".to_string(),
        };
        self.dispatcher
            .call_void(Method::PUT, &path, Self::body(&VisitedRequest { visited })?)
            .await
    }

    // =====================================================================
    // BANKS
    // =====================================================================

    /// A bank contact by ID, or absence
    pub async fn bank(&self, bank_id: &str) -> Result<Option<BankContact>> {
        let path = format!("/rest/banks/{bank_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Update a bank contact
    pub async fn update_bank(&self, bank: &BankContact) -> Result<Option<BankContact>> {
        let path = format!("/rest/banks/{}", bank.bank_id);
        self.dispatcher
            .call(Method::PUT, &path, Self::body(bank)?)
            .await
    }

    /// Remove the stored PIN of a bank contact, if there was one
    pub async fn remove_bank_pin(&self, bank_id: &str) -> Result<()> {
        let path = format!("/rest/banks/{bank_id}/remove_pin");
        self.dispatcher.call_void(Method::POST, &path, None).await
    }

    // =====================================================================
    // NOTIFICATIONS
    // =====================================================================

    /// All notifications registered by this client for the user
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.dispatcher
            .call_list(Method::GET, "/rest/notifications", None, "notifications")
            .await
    }

    /// A specific notification by ID, or absence
    pub async fn notification(&self, notification_id: &str) -> Result<Option<Notification>> {
        let path = format!("/rest/notifications/{notification_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Register a new notification
    pub async fn add_notification(
        &self,
        notification: &Notification,
    ) -> Result<Option<Notification>> {
        self.dispatcher
            .call(Method::POST, "/rest/notifications", Self::body(notification)?)
            .await
    }

    /// Update a stored notification
    pub async fn update_notification(
        &self,
        notification: &Notification,
    ) -> Result<Option<Notification>> {
        let id = notification
            .notification_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("notification has no ID"))?;
        let path = format!("/rest/notifications/{id}");
        self.dispatcher
            .call(Method::PUT, &path, Self::body(notification)?)
            .await
    }

    /// Remove a stored notification
    pub async fn remove_notification(&self, notification_id: &str) -> Result<()> {
        let path = format!("/rest/notifications/{notification_id}");
        self.dispatcher.call_void(Method::DELETE, &path, None).await
    }

    // =====================================================================
    // PAYMENTS
    // =====================================================================

    /// Payments of one account, or of all accounts
    pub async fn payments(&self, account_id: Option<&str>) -> Result<Vec<Payment>> {
        let path = match account_id {
            Some(id) => format!("/rest/accounts/{id}/payments"),
            None => "/rest/payments".to_string(),
        };
        self.dispatcher
            .call_list(Method::GET, &path, None, "payments")
            .await
    }

    /// A specific payment by ID, or absence
    pub async fn payment(&self, account_id: &str, payment_id: &str) -> Result<Option<Payment>> {
        let path = format!("/rest/accounts/{account_id}/payments/{payment_id}");
        self.dispatcher.call(Method::GET, &path, None).await
    }

    /// Create a new payment, stored server-side until submitted
    pub async fn add_payment(&self, payment: &Payment) -> Result<Option<Payment>> {
        let account_id = Self::payment_account(payment)?;
        let path = format!("/rest/accounts/{account_id}/payments");
        self.dispatcher
            .call(Method::POST, &path, Self::body(payment)?)
            .await
    }

    /// Update a stored payment
    pub async fn update_payment(&self, payment: &Payment) -> Result<Option<Payment>> {
        let account_id = Self::payment_account(payment)?;
        let payment_id = payment
            .payment_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("payment has no ID"))?;
        let path = format!("/rest/accounts/{account_id}/payments/{payment_id}");
        self.dispatcher
            .call(Method::PUT, &path, Self::body(payment)?)
            .await
    }

    /// Remove a stored payment
    pub async fn remove_payment(&self, account_id: &str, payment_id: &str) -> Result<()> {
        let path = format!("/rest/accounts/{account_id}/payments/{payment_id}");
        self.dispatcher.call_void(Method::DELETE, &path, None).await
    }

    /// Payee suggestions assembled from past transactions
    pub async fn payment_proposals(&self) -> Result<Vec<PaymentProposal>> {
        self.dispatcher
            .call_list(
                Method::GET,
                "/rest/address_book",
                None,
                "payment_proposals",
            )
            .await
    }

    fn payment_account(payment: &Payment) -> Result<&str> {
        payment
            .account_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("payment has no account ID"))
    }

    // =====================================================================
    // BANK TASKS
    // =====================================================================

    /// Create an account setup task connecting a new bank.
    ///
    /// The returned task must be started, then polled; the initial
    /// synchronization usually raises PIN and save-PIN challenges.
    pub async fn setup_account(&self, request: &SetupAccountRequest) -> Result<BankTask> {
        self.create_task(Method::POST, "/rest/accounts", Self::body(request)?)
            .await
    }

    /// Create a synchronization task for the user's accounts
    pub async fn trigger_sync(&self, request: &SyncRequest) -> Result<BankTask> {
        self.create_task(Method::POST, "/rest/sync", Self::body(request)?)
            .await
    }

    /// Submit a stored payment to the bank, creating the TAN task
    pub async fn submit_payment(
        &self,
        payment: &Payment,
        request: &SubmitPaymentRequest,
    ) -> Result<BankTask> {
        let account_id = Self::payment_account(payment)?;
        let payment_id = payment
            .payment_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("payment has no ID"))?;
        let path = format!("/rest/accounts/{account_id}/payments/{payment_id}/submit");
        self.create_task(Method::POST, &path, Self::body(request)?)
            .await
    }

    /// URL a web front-end can open to run a task in the browser instead
    /// of driving it through this library
    pub fn task_start_url(&self, token: &TaskToken) -> String {
        format!(
            "{}/task/start?id={token}",
            self.dispatcher.config().api_endpoint
        )
    }

    async fn create_task(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<BankTask> {
        let response: Option<TaskTokenResponse> =
            self.dispatcher.call(method, path, body).await?;
        let response =
            response.ok_or_else(|| Error::transport("task token response body missing"))?;
        Ok(BankTask::new(
            Arc::clone(&self.dispatcher),
            response.task_token,
        ))
    }

    // =====================================================================
    // BUSINESS PROCESSES
    // =====================================================================

    /// Create a hosted business process for the user
    pub async fn create_process(&self, process: &BusinessProcess) -> Result<ProcessToken> {
        let token: Option<ProcessToken> = self
            .dispatcher
            .call(Method::POST, "/client/process", Self::body(process)?)
            .await?;
        token.ok_or_else(|| Error::transport("process token response body missing"))
    }

    /// Start a previously created business process
    pub async fn start_process(&self, token: &ProcessToken) -> Result<()> {
        let path = format!("/process/start?id={}", token.process_token);
        self.dispatcher.call_void(Method::GET, &path, None).await
    }
}
