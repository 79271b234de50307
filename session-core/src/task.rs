//! Bank-communication task workflow.
//!
//! Task-creating operations (account setup, synchronization, payment
//! submission) hand back a [`BankTask`]. The caller starts it, polls it,
//! and answers challenges until it reaches a terminal state; the state
//! machine here enforces which operations each state accepts.

use crate::{dispatch::Dispatcher, Error, Result};
use async_trait::async_trait;
use protocol_core::{Challenge, TaskProgressRequest, TaskReply, TaskStatus, TaskToken};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client-side state of one bank-communication task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Token obtained; no bank communication has occurred yet
    Created,
    /// Bank communication has been started
    Started,
    /// Status is being polled
    Polling,
    /// The bank asked a challenge; exactly one reply must be submitted
    AwaitingResponse,
    /// Task ended without error
    Succeeded,
    /// Task ended erroneously
    Failed,
    /// Task was cancelled by the caller
    Cancelled,
}

impl TaskState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        matches!(
            (self, next),
            (Created, Started)
                | (Started, Polling)
                | (Polling, Polling)
                | (Polling, AwaitingResponse)
                | (Polling, Succeeded)
                | (Polling, Failed)
                | (AwaitingResponse, Polling)
                // Cancel is allowed from any non-terminal state
                | (Created | Started | Polling | AwaitingResponse, Cancelled)
        )
    }

    /// Check if state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Cancelled
        )
    }
}

/// Handle to one in-progress bank-communication task.
///
/// Owns the task token and the client-side state machine. Operations on a
/// terminal task fail fast with [`Error::InvalidTaskState`]; tokens are
/// never reused.
pub struct BankTask {
    dispatcher: Arc<Dispatcher>,
    token: TaskToken,
    state: TaskState,
}

impl BankTask {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>, token: TaskToken) -> Self {
        Self {
            dispatcher,
            token,
            state: TaskState::Created,
        }
    }

    /// Token of this task
    pub fn token(&self) -> &TaskToken {
        &self.token
    }

    /// Current client-side state
    pub fn state(&self) -> TaskState {
        self.state
    }

    fn transition(&mut self, next: TaskState, operation: &'static str) -> Result<()> {
        if self.state.is_terminal() || !self.state.can_transition_to(next) {
            return Err(Error::InvalidTaskState {
                from: self.state,
                operation,
            });
        }
        debug!(token = %self.token, from = ?self.state, to = ?next, "task transition");
        self.state = next;
        Ok(())
    }

    /// Begin the actual bank communication. Valid exactly once, before the
    /// first poll.
    pub async fn start(&mut self) -> Result<()> {
        self.transition(TaskState::Started, "start")?;
        let path = format!("/task/start?id={}", self.token);
        self.dispatcher.call_void(Method::GET, &path, None).await?;
        info!(token = %self.token, "task started");
        Ok(())
    }

    /// Poll the task status once. No pacing happens here; see
    /// [`drive`](Self::drive) for the paced loop.
    pub async fn poll(&mut self) -> Result<TaskStatus> {
        self.transition(TaskState::Polling, "poll")?;
        let request = TaskProgressRequest::new(self.token.clone());
        self.progress(request).await
    }

    /// Submit the one reply the pending challenge asked for. Valid only
    /// while a challenge is pending.
    pub async fn respond(&mut self, reply: TaskReply) -> Result<TaskStatus> {
        if self.state != TaskState::AwaitingResponse {
            return Err(Error::InvalidTaskState {
                from: self.state,
                operation: "respond",
            });
        }
        debug!(token = %self.token, kind = %reply.kind, "submitting challenge response");
        self.state = TaskState::Polling;
        let request = TaskProgressRequest::with_reply(self.token.clone(), &reply);
        self.progress(request).await
    }

    /// Request cancellation. Best-effort and advisory: a task already past
    /// the point of no return may still complete on the bank side.
    pub async fn cancel(&mut self) -> Result<()> {
        self.transition(TaskState::Cancelled, "cancel")?;
        let path = format!("/task/cancel?id={}", self.token);
        self.dispatcher.call_void(Method::POST, &path, None).await?;
        info!(token = %self.token, "task cancelled");
        Ok(())
    }

    async fn progress(&mut self, request: TaskProgressRequest) -> Result<TaskStatus> {
        let path = format!("/task/progress?id={}", self.token);
        let body = serde_json::to_value(&request)?;
        let status: Option<TaskStatus> = self
            .dispatcher
            .call(Method::POST, &path, Some(body))
            .await?;
        let mut status =
            status.ok_or_else(|| Error::transport("task status response body missing"))?;
        status.token = Some(self.token.clone());
        self.apply(&status);
        Ok(status)
    }

    // A failed task is a terminal *status*, not a transport error: the
    // poll call itself succeeded.
    fn apply(&mut self, status: &TaskStatus) {
        if status.is_ended {
            self.state = if status.is_erroneous {
                warn!(token = %self.token, message = status.message.as_deref(), "task failed");
                TaskState::Failed
            } else {
                info!(token = %self.token, "task succeeded");
                TaskState::Succeeded
            };
        } else if status.challenge.is_some() {
            self.state = TaskState::AwaitingResponse;
        } else {
            self.state = TaskState::Polling;
        }
    }

    /// Run the task to a terminal state.
    ///
    /// Starts the task if not yet started, polls with the pacing of
    /// `policy`, and delegates every challenge to `handler`. A handler
    /// returning `None` abandons the task via [`cancel`](Self::cancel).
    /// Returns the last observed status; inspect [`state`](Self::state)
    /// to distinguish the terminal outcome.
    pub async fn drive(
        &mut self,
        handler: &dyn ChallengeHandler,
        policy: &PollPolicy,
    ) -> Result<TaskStatus> {
        if self.state == TaskState::Created {
            self.start().await?;
        }
        let mut interval = policy.initial_interval;
        loop {
            let status = self.poll().await?;
            if self.state.is_terminal() {
                return Ok(status);
            }

            if let (TaskState::AwaitingResponse, Some(challenge)) =
                (self.state, status.challenge.as_ref())
            {
                match handler.on_challenge(challenge).await {
                    Some(reply) => {
                        let status = self.respond(reply).await?;
                        if self.state.is_terminal() {
                            return Ok(status);
                        }
                    }
                    None => {
                        self.cancel().await?;
                        return Ok(status);
                    }
                }
                interval = policy.initial_interval;
                continue;
            }

            tokio::time::sleep(interval).await;
            interval = policy.next_interval(interval);
        }
    }
}

impl std::fmt::Debug for BankTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankTask")
            .field("token", &self.token)
            .field("state", &self.state)
            .finish()
    }
}

/// Answers mid-task authentication challenges for the driver loop
#[async_trait]
pub trait ChallengeHandler: Send + Sync {
    /// Produce the reply for a challenge, or `None` to abandon the task
    async fn on_challenge(&self, challenge: &Challenge) -> Option<TaskReply>;
}

/// Poll pacing for [`BankTask::drive`]: exponential backoff bounded by a
/// maximum interval. Applies only to the driver; a raw
/// [`poll`](BankTask::poll) is a single HTTP call with no built-in delay.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the second poll
    pub initial_interval: Duration,
    /// Backoff multiplier applied after each unanswered poll
    pub multiplier: f64,
    /// Upper bound for the delay between polls
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 2.0,
            max_interval: Duration::from_secs(10),
        }
    }
}

impl PollPolicy {
    fn next_interval(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_interval)
    }
}
