//! Core library for the Tandem development stack launcher.
//!
//! Provides the project configuration model, service process handles, the
//! startup readiness gate, and the supervision loop the CLI drives.

pub mod config;
pub mod process;
pub mod readiness;
pub mod supervisor;
pub mod utils;

pub use config::TandemConfig;
pub use process::ServiceProcess;
pub use supervisor::ExitOutcome;
