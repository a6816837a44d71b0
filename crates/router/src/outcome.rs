//! Classification and validation results.
//!
//! All values here are created per request and never shared between requests.

use serde::Serialize;

/// Which stage produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// The language model gave a recognised verdict
    Llm,
    /// A keyword/pattern rule decided
    Pattern,
    /// The model call failed, timed out or returned something unrecognised
    FallbackError,
}

/// Result of one classification stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub in_scope: bool,
    pub source: ClassificationSource,
}

impl ClassificationResult {
    pub fn llm(in_scope: bool) -> Self {
        Self {
            in_scope,
            source: ClassificationSource::Llm,
        }
    }

    pub fn pattern(in_scope: bool) -> Self {
        Self {
            in_scope,
            source: ClassificationSource::Pattern,
        }
    }

    /// Classifier unavailable: always out of scope.
    pub fn fallback_error() -> Self {
        Self {
            in_scope: false,
            source: ClassificationSource::FallbackError,
        }
    }
}

/// Whether an in-scope question is about the organization itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubDomain {
    General,
    Organization,
}

/// Stage that accepted an in-scope question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Via {
    Semantic,
    Pattern,
}

/// Downstream pipeline, one per sub-domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineChoice {
    General,
    Organization,
}

impl From<SubDomain> for PipelineChoice {
    fn from(sub_domain: SubDomain) -> Self {
        match sub_domain {
            SubDomain::General => PipelineChoice::General,
            SubDomain::Organization => PipelineChoice::Organization,
        }
    }
}

impl PipelineChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineChoice::General => "general",
            PipelineChoice::Organization => "organization",
        }
    }
}

/// Scope decision for one request.
///
/// Out-of-scope outcomes carry neither a sub-domain nor a pipeline choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(
    tag = "status",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ValidationOutcome {
    InScope { sub_domain: SubDomain, via: Via },
    OutOfScope,
}

impl ValidationOutcome {
    pub fn is_in_scope(&self) -> bool {
        matches!(self, ValidationOutcome::InScope { .. })
    }

    pub fn sub_domain(&self) -> Option<SubDomain> {
        match self {
            ValidationOutcome::InScope { sub_domain, .. } => Some(*sub_domain),
            ValidationOutcome::OutOfScope => None,
        }
    }

    pub fn via(&self) -> Option<Via> {
        match self {
            ValidationOutcome::InScope { via, .. } => Some(*via),
            ValidationOutcome::OutOfScope => None,
        }
    }

    pub fn pipeline_choice(&self) -> Option<PipelineChoice> {
        self.sub_domain().map(PipelineChoice::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_scope_has_no_choice() {
        let outcome = ValidationOutcome::OutOfScope;
        assert!(!outcome.is_in_scope());
        assert_eq!(outcome.sub_domain(), None);
        assert_eq!(outcome.via(), None);
        assert_eq!(outcome.pipeline_choice(), None);
    }

    #[test]
    fn test_choice_follows_sub_domain() {
        let outcome = ValidationOutcome::InScope {
            sub_domain: SubDomain::Organization,
            via: Via::Pattern,
        };
        assert_eq!(outcome.pipeline_choice(), Some(PipelineChoice::Organization));
        assert_eq!(outcome.via(), Some(Via::Pattern));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ValidationOutcome::InScope {
            sub_domain: SubDomain::General,
            via: Via::Semantic,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "in_scope", "subDomain": "general", "via": "semantic"})
        );

        let json = serde_json::to_value(ValidationOutcome::OutOfScope).unwrap();
        assert_eq!(json, serde_json::json!({"status": "out_of_scope"}));
    }
}
