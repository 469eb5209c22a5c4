#[cfg(test)]
#[path = "credit_gate_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::Notice;

/// Looks up the user's balance before every paid action. Nothing is cached.
pub struct CreditGate {
    backend: Arc<BackendBox>,
    tx: mpsc::UnboundedSender<Event>,
}

impl CreditGate {
    pub fn new(backend: Arc<BackendBox>, tx: mpsc::UnboundedSender<Event>) -> CreditGate {
        return CreditGate { backend, tx };
    }

    /// Fails closed: any error reading the balance counts as zero credits.
    pub async fn fetch_credits(&self, user_id: &str) -> Result<i64> {
        match self.backend.current_limit(user_id).await {
            Ok(balance) => {
                tracing::debug!(balance = balance, "credits fetched");
                self.tx.send(Event::CreditsUpdated(balance))?;
                return Ok(balance);
            }
            Err(err) => {
                tracing::error!(error = ?err, "failed to fetch credits");
                self.tx.send(Event::Notice(Notice::error(
                    "Unable to fetch your credits. Please try again later.",
                )))?;
                return Ok(0);
            }
        }
    }

    pub fn allows(balance: i64) -> bool {
        return balance > 0;
    }
}
