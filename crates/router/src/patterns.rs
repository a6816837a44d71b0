//! Keyword/pattern rules over normalized question text.
//!
//! Two rule sets are built in:
//! - the scope rules, which accept organization names, fixed English and
//!   Indonesian question templates, and science/STEM-education phrases;
//! - the organization rules, a narrower set that only recognises the
//!   organization's names and acronyms.
//!
//! Matching is match-any. Rule order only affects which rule is reported
//! in the logs.

use crate::outcome::ClassificationResult;
use crate::question::Question;
use regex::{Regex, RegexBuilder};
use scimentor_core::{AppError, AppResult};

/// Organization names and acronyms as they may appear inside a template.
const ORG: &str = r"(?:seameo|sea\s*-?\s*qis|qis)";

/// Organization rules. Also the first block of the scope rules.
///
/// The acronyms are unanchored: Indonesian attaches suffixes directly
/// ("SEAQISnya") and users run names together ("SEAMEOQIS").
const ORGANIZATION_RULES: [&str; 4] = [
    r"seameo",
    r"sea\s*-?\s*qis",
    r"qis",
    r"\bqitep\s+in\s+science\b",
];

/// Indonesian questions about the organization that usually omit its name.
const INDONESIAN_TEMPLATES: [&str; 7] = [
    r"\bkegiatan(?:nya)?\s+apa(?:\s+aja)?\b",
    r"\bprogram(?:nya)?\s+apa\b",
    r"\bapa\s+program(?:nya)?\b",
    r"\blokasi(?:nya)?\s+di\s*mana\b",
    r"\bdi\s*mana\s+lokasi(?:nya)?\b",
    r"\btujuan(?:nya)?\s+apa\b",
    r"\bfokus(?:nya)?\s+(?:apa|ke\s+mana)\b",
];

/// Science and STEM education phrases.
const EDUCATION_RULES: [&str; 8] = [
    r"\bscience\s+(?:education|teaching|learning|curriculum|teachers?)\b",
    r"\bstem\s+(?:education|teaching|learning|curriculum)\b",
    r"\b(?:teaching|learning)\s+(?:science|stem)\b",
    r"\bcurriculum\s+development\s+for\s+science\b",
    r"\b(?:assessment|evaluation)\s+(?:in|for)\s+science\b",
    r"\bquality\s+improvement\s+in\s+science\b",
    r"\bpendidikan\s+(?:sains|ipa|stem)\b",
    r"\bpembelajaran\s+(?:sains|ipa|stem)\b",
];

/// Fixed question templates that name the organization.
fn organization_templates() -> Vec<String> {
    vec![
        format!(r"\bwhat\s+is\s+(?:the\s+)?{ORG}"),
        format!(r"\bwhere\s+is\s+(?:the\s+)?{ORG}(?:\s+{ORG})?\s+located\b"),
        format!(r"\bwhat\s+are\s+the\s+(?:activities|programs)\s+of\s+{ORG}"),
        format!(r"\bwhat\s+programs\s+(?:does|of)\s+{ORG}"),
        format!(r"\bwhat\s+is\s+the\s+(?:purpose|focus|goal)\s+of\s+{ORG}"),
        format!(r"\bapa\s+itu\s+{ORG}"),
        format!(r"\blokasi(?:nya)?\s+{ORG}"),
    ]
}

/// An ordered list of compiled, case-insensitive rules.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rules: Vec<Regex>,
}

impl PatternMatcher {
    /// Compile a rule list.
    ///
    /// # Errors
    /// Returns `AppError::Config` naming the first pattern that fails to compile.
    pub fn new<I, S>(patterns: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|pattern| compile(pattern.as_ref()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// The built-in scope rules.
    pub fn scope() -> AppResult<Self> {
        let patterns = ORGANIZATION_RULES
            .iter()
            .map(|p| p.to_string())
            .chain(organization_templates())
            .chain(INDONESIAN_TEMPLATES.iter().map(|p| p.to_string()))
            .chain(EDUCATION_RULES.iter().map(|p| p.to_string()));

        Self::new(patterns)
    }

    /// The built-in organization rules.
    pub fn organization() -> AppResult<Self> {
        Self::new(ORGANIZATION_RULES)
    }

    /// Append further rules, e.g. from configuration.
    pub fn with_extra<I, S>(mut self, patterns: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.rules.push(compile(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// True if any rule matches anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// Source of the first rule that matches `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.as_str())
    }

    /// Run the rules against a question.
    pub fn classify(&self, question: &Question) -> ClassificationResult {
        let matched = self.first_match(question.normalized());
        if let Some(rule) = matched {
            tracing::debug!(rule, "Pattern rule matched");
        }
        ClassificationResult::pattern(matched.is_some())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile(pattern: &str) -> AppResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::Config(format!("Invalid pattern '{}': {}", pattern, e)))
}
