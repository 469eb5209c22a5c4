mod artifact;
mod backend;
mod error;
mod event;
mod notice;
mod object_url;
mod phase;
mod share;
mod tool;
mod upload;

pub use artifact::*;
pub use backend::*;
pub use error::*;
pub use event::*;
pub use notice::*;
pub use object_url::*;
pub use phase::*;
pub use share::*;
pub use tool::*;
pub use upload::*;
