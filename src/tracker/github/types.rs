use serde::Deserialize;

/// An externally tracked work item, keyed by `number` in the run's issue map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    /// Classification labels, flattened from the tracker's `labels[].name`
    pub labels: Vec<String>,
}

/// Raw issue payload from the GitHub REST API.
#[derive(Deserialize)]
pub(super) struct IssuePayload {
    number: u64,
    title: String,
    #[serde(default)]
    labels: Vec<LabelPayload>,
}

#[derive(Deserialize)]
pub(super) struct LabelPayload {
    name: String,
}

impl From<IssuePayload> for Issue {
    fn from(payload: IssuePayload) -> Self {
        Self {
            number: payload.number,
            title: payload.title,
            labels: payload.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}
