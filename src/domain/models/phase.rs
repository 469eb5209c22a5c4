#[cfg(test)]
#[path = "phase_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    CheckingCredits,
    Blocked,
    Submitting,
    Succeeded,
    Failed,
}

impl Phase {
    /// Nothing is in flight, a new action may start.
    pub fn is_resting(&self) -> bool {
        return matches!(
            self,
            Phase::Idle | Phase::Blocked | Phase::Succeeded | Phase::Failed
        );
    }

    pub fn is_busy(&self) -> bool {
        return !self.is_resting();
    }

    pub fn can_advance(&self, next: Phase) -> bool {
        return match (self, next) {
            (Phase::Idle | Phase::Blocked | Phase::Succeeded | Phase::Failed, Phase::Validating) => {
                true
            }
            (Phase::Validating, Phase::CheckingCredits | Phase::Failed) => true,
            (Phase::CheckingCredits, Phase::Blocked | Phase::Submitting) => true,
            (Phase::Submitting, Phase::Succeeded | Phase::Failed) => true,
            (Phase::Blocked | Phase::Succeeded | Phase::Failed, Phase::Idle) => true,
            _ => false,
        };
    }

    pub fn advance(self, next: Phase) -> Result<Phase> {
        if !self.can_advance(next) {
            bail!(format!("Illegal phase transition from {self} to {next}"));
        }

        return Ok(next);
    }
}
