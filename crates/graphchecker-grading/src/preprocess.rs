//! The preprocessing gateway: raw submission text in, domain graph out.

use graphchecker_types::Result;

/// Converts a raw submission into the domain object checks operate on.
///
/// Implementations report malformed input as
/// [`GraderError::Preprocess`](graphchecker_types::GraderError::Preprocess)
/// with a message suitable for the student.
pub trait Preprocess<G>: Send + Sync {
    fn preprocess(&self, raw: &str) -> Result<G>;
}

impl<G, F> Preprocess<G> for F
where
    F: Fn(&str) -> Result<G> + Send + Sync,
{
    fn preprocess(&self, raw: &str) -> Result<G> {
        self(raw)
    }
}
