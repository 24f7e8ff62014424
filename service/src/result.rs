use lr_core::ResolutionResult;

const FAILURE_MESSAGE: &str = "Failed to expand";

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ExpandResponse {
    pub results: Vec<ExpandResult>,
}

impl From<Vec<ResolutionResult>> for ExpandResponse {
    fn from(value: Vec<ResolutionResult>) -> Self {
        Self {
            results: value.into_iter().map(ExpandResult::from).collect(),
        }
    }
}

/// A resolution result in the shape the front end expects: failures carry an
/// error message instead of a flag.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ExpandResult {
    pub original: String,
    pub expanded: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl From<ResolutionResult> for ExpandResult {
    fn from(value: ResolutionResult) -> Self {
        Self {
            original: value.original,
            expanded: value.expanded,
            error: if value.failed {
                Some(FAILURE_MESSAGE)
            } else {
                None
            },
        }
    }
}
