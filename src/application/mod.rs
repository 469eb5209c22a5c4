pub mod cli;
pub mod renderer;
pub mod runner;
