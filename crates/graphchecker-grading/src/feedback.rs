//! Feedback rendering: turn a check's feedback key into student-facing text.

use std::sync::LazyLock;

use graphchecker_types::{CheckInvocation, CheckResult};
use regex::{Captures, Regex};

use crate::catalog::MethodMetadata;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]*)\]\]").expect("placeholder regex is valid"));

/// Render the feedback of `result` for the check invoked by `spec`.
///
/// Returns `None` when the check produced no feedback. The feedback value is
/// returned verbatim unless it names a key of the method's template map, in
/// which case the author's override for that key (or else the metadata
/// default) is filled in with [`fill_placeholders`].
pub fn render(
    spec: &CheckInvocation,
    metadata: &MethodMetadata,
    result: &CheckResult,
) -> Option<String> {
    let feedback = result.feedback.as_deref()?;
    let Some(templates) = metadata.feedback.as_ref() else {
        return Some(feedback.to_string());
    };
    let Some(default) = templates.get(feedback) else {
        return Some(feedback.to_string());
    };
    let template = spec.feedback.get(feedback).unwrap_or(default);
    Some(fill_placeholders(template, spec, result))
}

/// Replace every `[[field]]` in `template`.
///
/// A field is looked up in the check result first (its own fields, then
/// `module` and `method`), then in the raw arguments of the invocation.
/// Placeholders that match nothing stay in the text unchanged. Substituted
/// values are not scanned again.
pub fn fill_placeholders(template: &str, spec: &CheckInvocation, result: &CheckResult) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            lookup(name, spec, result).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn lookup(name: &str, spec: &CheckInvocation, result: &CheckResult) -> Option<String> {
    result
        .field(name)
        .or_else(|| match name {
            "module" => Some(spec.module.clone()),
            "method" => Some(spec.method.clone()),
            _ => None,
        })
        .or_else(|| spec.argument_text(name))
}
