//! Organization context injection.

use crate::outcome::SubDomain;

/// Guidance prepended to organization questions before they reach the pipeline.
pub const ORGANIZATION_GUIDANCE: &str = "User is asking about SEAMEO QIS. \
Provide a concise and friendly explanation based on SEAQIS data. ";

/// Prepend the organization guidance when the sub-domain calls for it.
///
/// General questions are returned unchanged.
pub fn inject(question: &str, sub_domain: SubDomain) -> String {
    match sub_domain {
        SubDomain::Organization => format!("{}{}", ORGANIZATION_GUIDANCE, question),
        SubDomain::General => question.to_string(),
    }
}
