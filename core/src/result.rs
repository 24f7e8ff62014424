use serde::{Deserialize, Serialize};

/// The outcome of resolving a single URL.
///
/// `expanded` is always populated, and is equal to `original` when nothing
/// better could be found. `failed` only indicates that the request itself
/// couldn't be completed (a timeout or transport error); a page that simply
/// didn't reveal its destination isn't a failure.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub original: String,
    pub expanded: String,
    #[serde(default)]
    pub failed: bool,
}

impl ResolutionResult {
    pub fn new(original: String, expanded: String) -> Self {
        Self {
            original,
            expanded,
            failed: false,
        }
    }

    pub fn failed(original: String) -> Self {
        Self {
            expanded: original.clone(),
            original,
            failed: true,
        }
    }

    /// Whether the expanded value differs from the input.
    pub fn is_changed(&self) -> bool {
        self.original != self.expanded
    }
}
