#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::CreditGate;
use super::Validator;
use crate::domain::models::ActionError;
use crate::domain::models::Anchor;
use crate::domain::models::Artifact;
use crate::domain::models::BackendBox;
use crate::domain::models::CreditPolicy;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::ObjectUrlStore;
use crate::domain::models::Phase;
use crate::domain::models::ToolRequest;
use crate::domain::models::ToolSpec;
use crate::domain::models::ValidationError;
use crate::domain::models::GENERIC_FAILURE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Input failed validation. No network call was made.
    Rejected(ValidationError),
    /// The balance was exhausted. The paywall was raised instead of running
    /// the tool.
    Blocked(i64),
    Succeeded,
    Failed(String),
}

/// Raises the loading flag on creation and clears it on drop, so every exit
/// path clears it exactly once.
struct LoadingGuard {
    tx: mpsc::UnboundedSender<Event>,
}

impl LoadingGuard {
    fn raise(tx: &mpsc::UnboundedSender<Event>) -> Result<LoadingGuard> {
        tx.send(Event::Loading(true))?;
        return Ok(LoadingGuard { tx: tx.clone() });
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(Event::Loading(false));
    }
}

fn failure_message(err: &anyhow::Error) -> String {
    if let Some(action_err) = err.downcast_ref::<ActionError>() {
        return action_err.to_string();
    }

    return GENERIC_FAILURE.to_string();
}

/// Drives one tool through validate, credit check, invoke and present.
pub struct ActionController {
    spec: &'static ToolSpec,
    user_id: String,
    backend: Arc<BackendBox>,
    gate: CreditGate,
    validator: Validator,
    store: ObjectUrlStore,
    tx: mpsc::UnboundedSender<Event>,
    phase: Phase,
    result: Option<Artifact>,
}

impl ActionController {
    pub fn new(
        spec: &'static ToolSpec,
        user_id: &str,
        backend: Arc<BackendBox>,
        validator: Validator,
        store: ObjectUrlStore,
        tx: mpsc::UnboundedSender<Event>,
    ) -> ActionController {
        return ActionController {
            spec,
            user_id: user_id.to_string(),
            gate: CreditGate::new(backend.clone(), tx.clone()),
            backend,
            validator,
            store,
            tx,
            phase: Phase::Idle,
            result: None,
        };
    }

    pub fn phase(&self) -> Phase {
        return self.phase;
    }

    /// The last successful result. Failed attempts leave it untouched.
    pub fn result(&self) -> Option<&Artifact> {
        return self.result.as_ref();
    }

    pub fn store(&self) -> &ObjectUrlStore {
        return &self.store;
    }

    fn set_phase(&mut self, next: Phase) -> Result<()> {
        self.phase = self.phase.advance(next)?;
        self.tx.send(Event::PhaseChanged(next))?;
        return Ok(());
    }

    pub async fn run(&mut self, mut request: ToolRequest) -> Result<Outcome> {
        if self.phase.is_busy() {
            bail!(format!("{} is already running", self.spec.title));
        }

        self.set_phase(Phase::Validating)?;
        request.apply_defaults(self.spec);

        if let Err(err) = self.validator.validate(self.spec, &request) {
            tracing::warn!(tool = %self.spec.name, error = %err, "input rejected");
            self.tx.send(Event::Notice(Notice::error(&err.to_string())))?;
            self.set_phase(Phase::Failed)?;
            return Ok(Outcome::Rejected(err));
        }

        self.set_phase(Phase::CheckingCredits)?;
        let _loading = LoadingGuard::raise(&self.tx)?;
        self.tx.send(Event::ScrollTo(Anchor::Loader))?;

        let balance = self.gate.fetch_credits(&self.user_id).await?;
        if !CreditGate::allows(balance) {
            tracing::info!(tool = %self.spec.name, balance = balance, "credit limit exceeded");
            self.set_phase(Phase::Blocked)?;
            self.tx.send(Event::Paywall(balance))?;
            return Ok(Outcome::Blocked(balance));
        }

        self.set_phase(Phase::Submitting)?;
        let outcome = match self.submit(&request).await {
            Ok(artifact) => {
                // Replacing the previous result revokes its object URL.
                self.result = Some(artifact);
                tracing::debug!(object_urls = self.store.len(), "result stored");
                self.tx.send(Event::ResultReady(self.spec.name))?;
                self.set_phase(Phase::Succeeded)?;
                Outcome::Succeeded
            }
            Err(err) => {
                tracing::error!(tool = %self.spec.name, error = ?err, "tool invocation failed");
                let message = failure_message(&err);
                self.tx.send(Event::Notice(Notice::error(&message)))?;
                self.set_phase(Phase::Failed)?;
                Outcome::Failed(message)
            }
        };

        self.tx.send(Event::ScrollTo(Anchor::Results))?;
        return Ok(outcome);
    }

    async fn submit(&self, request: &ToolRequest) -> Result<Artifact> {
        let response = self
            .backend
            .invoke(self.spec, request, &self.user_id)
            .await?;
        let artifact = self.spec.response.extract(response, &self.store)?;

        if self.spec.credits == CreditPolicy::Explicit {
            if let Err(err) = self.backend.decrease_limit(&self.user_id).await {
                tracing::error!(error = ?err, "failed to decrease credits");
            }
        }

        return Ok(artifact);
    }

    /// Returns to `Idle` and drops the held result.
    pub fn reset(&mut self) -> Result<()> {
        if self.phase != Phase::Idle {
            self.set_phase(Phase::Idle)?;
        }
        self.result = None;

        return Ok(());
    }
}
