//! Topic validation and routing for SciMentor.
//!
//! A question goes through:
//! 1. [`ScopeValidator`]: semantic classification via the completion
//!    capability, with [`PatternMatcher`] rules as the fallback, plus an
//!    organization check that picks the sub-domain;
//! 2. [`Router`]: picks the general or organization [`Pipeline`], injecting
//!    organization guidance into the question when needed.
//!
//! Every request gets its own [`ValidationOutcome`]; nothing is shared
//! between requests except the stateless components themselves.
//!
//! # Example
//! ```no_run
//! use scimentor_core::AppConfig;
//! use scimentor_router::{RouteOutcome, Router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::from_config(&AppConfig::load()?)?;
//! match router.validate_and_route("What is SEAQIS?", "english").await? {
//!     RouteOutcome::Answered { text, .. } => println!("{}", text),
//!     RouteOutcome::OutOfScope => println!("Please ask a science education question."),
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod inject;
pub mod outcome;
pub mod patterns;
pub mod pipeline;
pub mod question;
pub mod router;
pub mod validator;

#[cfg(test)]
mod tests;

pub use classifier::{ScopeVerdict, SemanticClassifier};
pub use inject::{inject, ORGANIZATION_GUIDANCE};
pub use outcome::{
    ClassificationResult, ClassificationSource, PipelineChoice, SubDomain, ValidationOutcome, Via,
};
pub use patterns::PatternMatcher;
pub use pipeline::{
    build_pipeline, AgentProfile, Pipeline, PipelineProfile, PipelinePrompts, ProfilePipeline,
};
pub use question::Question;
pub use router::{RouteOutcome, Router};
pub use validator::ScopeValidator;
