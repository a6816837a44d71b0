//! Scope validation: semantic classification first, pattern rules as fallback.

use crate::classifier::SemanticClassifier;
use crate::outcome::{SubDomain, ValidationOutcome, Via};
use crate::patterns::PatternMatcher;
use crate::question::Question;

/// Decides whether a question is in the domain and which sub-domain it belongs to.
///
/// Holds no per-request state; one validator may serve concurrent requests.
pub struct ScopeValidator {
    classifier: SemanticClassifier,
    scope_rules: PatternMatcher,
    organization_rules: PatternMatcher,
}

impl ScopeValidator {
    pub fn new(
        classifier: SemanticClassifier,
        scope_rules: PatternMatcher,
        organization_rules: PatternMatcher,
    ) -> Self {
        Self {
            classifier,
            scope_rules,
            organization_rules,
        }
    }

    /// Validate a question.
    ///
    /// 1. Ask the semantic classifier. A yes is final.
    /// 2. Otherwise, including when the classifier was unavailable, run the
    ///    scope rules.
    /// 3. If either stage accepted, the organization rules pick the sub-domain.
    ///
    /// At most one completion call is made. Blank questions are rejected
    /// without one.
    pub async fn validate(&self, question: &Question) -> ValidationOutcome {
        if question.is_blank() {
            tracing::debug!("Blank question rejected");
            return ValidationOutcome::OutOfScope;
        }

        let semantic = self.classifier.classify(question).await;
        tracing::debug!(in_scope = semantic.in_scope, source = ?semantic.source, "Semantic classification");

        let via = if semantic.in_scope {
            Via::Semantic
        } else if self.scope_rules.classify(question).in_scope {
            Via::Pattern
        } else {
            tracing::info!("Question is out of scope");
            return ValidationOutcome::OutOfScope;
        };

        let sub_domain = self.sub_domain(question);
        tracing::info!(?via, ?sub_domain, "Question is in scope");

        ValidationOutcome::InScope { sub_domain, via }
    }

    /// Organization check, independent of which stage accepted the question.
    fn sub_domain(&self, question: &Question) -> SubDomain {
        if self.organization_rules.matches(question.normalized()) {
            SubDomain::Organization
        } else {
            SubDomain::General
        }
    }
}
