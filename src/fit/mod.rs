//! Fitting stages of the pipeline.
//!
//! Responsibilities:
//!
//! - select methods from the characterization snapshot
//! - run the bounded maximum-likelihood fit (with retries)
//! - bootstrap the fit (parallel) and build confidence intervals
//! - test goodness of fit via the Poisson deviance

pub mod bootstrap;
pub mod ci;
pub mod decide;
pub mod gof;
pub mod mle;

pub use bootstrap::*;
pub use ci::*;
pub use decide::*;
pub use gof::*;
pub use mle::*;
