//! Kuduscript Core Library
//!
//! Generates deployment scripts (batch, bash or PowerShell) for a source
//! repository, plus the `.deployment` marker pointing a hosting pipeline at
//! the generated script.

pub mod commands;
pub mod config;
pub mod error;
pub mod locator;
pub mod output;
pub mod request;
pub mod script;
pub mod strategy;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{GenerateCommand, GenerationPlan, GenerationReport};

    // Configuration
    pub use crate::config::{ConfigScope, ConfigStore, GeneratorConfig};

    // Errors
    pub use crate::error::{FileKind, GenerateError, LocatorError, WriteError};

    // Requests
    pub use crate::request::{GenerationRequest, InvocationOptions, ProjectTypeFlag};

    // Output
    pub use crate::output::{AlwaysConfirm, ConfirmOverwrite, WriteOutcome};

    // Script model
    pub use crate::script::{DeploymentMarker, Phase, ScriptDocument, ScriptStep};

    // Strategies
    pub use crate::strategy::{Strategy, StrategyRegistry};

    pub use crate::types::{ProjectType, ScriptType};
}
