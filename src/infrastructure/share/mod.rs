pub mod command;
pub mod noop;

use anyhow::Result;

use crate::domain::models::ShareBox;
use crate::domain::models::ShareName;

pub struct ShareManager {}

impl ShareManager {
    pub fn get(name: ShareName) -> Result<ShareBox> {
        if name == ShareName::Command {
            return Ok(Box::<command::CommandShare>::default());
        }

        return Ok(Box::<noop::NoopShare>::default());
    }
}
