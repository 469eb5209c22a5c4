use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::ShareName;
use crate::domain::models::SharePayload;
use crate::domain::models::ShareTarget;

#[derive(Default)]
pub struct NoopShare {}

#[async_trait]
impl ShareTarget for NoopShare {
    fn name(&self) -> ShareName {
        return ShareName::None;
    }

    fn is_supported(&self) -> bool {
        return false;
    }

    #[allow(clippy::implicit_return)]
    async fn share(&self, _payload: &SharePayload) -> Result<()> {
        bail!("Sharing is not supported");
    }
}
