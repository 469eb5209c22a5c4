pub mod clipboard;
mod controller;
mod credit_gate;
mod presenter;
mod validation;

pub use controller::*;
pub use credit_gate::*;
pub use presenter::*;
pub use validation::*;
