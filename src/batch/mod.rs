pub mod guard;
pub mod naming;
pub mod report;
pub mod runner;

pub use runner::BatchRunner;
