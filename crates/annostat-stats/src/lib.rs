//! Statistical primitives for the annostat engine.
//!
//! This crate provides the closed-form building blocks used by validation and
//! mediation analysis:
//!
//! - **Descriptive statistics**: count, mean, median, population variance
//! - **Distributions**: normal, Student-t, F and chi-square tail probabilities
//! - **Regression**: simple and two-predictor ordinary least squares with
//!   standard errors
//! - **Correlation**: Pearson r with a t-test, and one-way ANOVA
//! - **Contingency tables**: chi-square test of independence and odds ratios
//!
//! # Modules
//!
//! - [`context`]: Optional per-row provenance shared by observation types
//! - [`contingency`]: Chi-square test with Cramér's V, 2×2 odds ratios
//! - [`correlation`]: Pearson correlation and one-way ANOVA
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`distribution`]: Cumulative distribution functions for significance tests
//! - [`regression`]: Ordinary least squares fits
//!
//! # Examples
//!
//! ## Fitting a line
//!
//! ```
//! use annostat_stats::regression;
//!
//! let fit = regression::fit_simple(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0])?;
//! assert!((fit.slope - 2.0).abs() < 1e-9);
//! # Ok::<(), annostat_stats::StatsError>(())
//! ```
//!
//! ## Testing a correlation
//!
//! ```
//! use annostat_stats::correlation;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let corr = correlation::pearson(&x, &x)?;
//! assert!((corr.r - 1.0).abs() < 1e-12);
//! # Ok::<(), annostat_stats::StatsError>(())
//! ```
//!
//! ## Descriptive statistics
//!
//! ```
//! use annostat_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub use self::error::StatsError;

pub mod context;
pub mod contingency;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
mod error;
pub mod regression;
