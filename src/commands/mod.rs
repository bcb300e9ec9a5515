// ABOUTME: Command implementations for the reconciliation job
// ABOUTME: Exports the run pipeline and the check configuration command

pub mod check;
pub mod run;

pub use check::check;
pub use run::run;
