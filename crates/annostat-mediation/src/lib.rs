//! Mediation analysis of strategy → reaction effects.
//!
//! Tests whether numeric mediator measurements (verb density, lexical
//! alignment, cognitive load, ...) explain the effect of a cause `x` on an
//! outcome `y`, following the Baron–Kenny procedure with a Sobel test, and
//! profiles strategies descriptively.
//!
//! # Modules
//!
//! - [`observation`]: Input rows for mediation and strategy profiling
//! - [`config`]: Analysis parameters, loaded from JSON by callers
//! - [`analyzer`]: Baron–Kenny paths and Sobel test for one mediator
//! - [`orchestrator`]: All mediators, aggregated effects
//! - [`profile`]: Strategy profiles and the heuristic hypothesis check
//! - [`descriptive`]: Correlations, ANOVA, chi-square and odds ratios per
//!   strategy
//!
//! # Examples
//!
//! ```
//! use annostat_mediation::{MediationConfig, MediationObservation, MediationOrchestrator};
//!
//! // m = 2x + small deviation, y = 3m: the effect of x passes entirely through m
//! let deviations = [0.05, -0.03, 0.02, -0.06, 0.04, -0.01, 0.03, -0.02, 0.01, -0.04, 0.06, -0.05];
//! let observations = deviations
//!     .iter()
//!     .enumerate()
//!     .map(|(i, d)| {
//!         let x = if i % 2 == 0 { 0.0 } else { 1.0 };
//!         let m = 2.0 * x + d;
//!         MediationObservation::new(x, 3.0 * m).with_mediator("density", Some(m))
//!     })
//!     .collect::<Vec<_>>();
//!
//! let result = MediationOrchestrator::new(MediationConfig::default()).run(&observations)?;
//! assert!(result.convergence);
//! assert!(result.paths[0].c_prime.abs() < 1e-9);
//! # Ok::<(), annostat_mediation::MediationError>(())
//! ```

pub use self::{
    analyzer::{MediationAnalyzer, MediationPath, MediationType},
    config::{HypothesisRule, MediationConfig, ProfileConfig},
    error::MediationError,
    observation::{MediationObservation, ReactionClass, StrategyObservation},
    orchestrator::{MediationOrchestrator, MediationResult, SkippedMediator},
    profile::{HypothesisCheck, ProfileReport, StrategyProfile, StrategyProfiler},
};

pub mod analyzer;
pub mod config;
pub mod descriptive;
mod error;
pub mod observation;
pub mod orchestrator;
pub mod profile;
