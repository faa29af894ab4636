// Docker container summary

use serde::{Deserialize, Serialize};

/// One running container as reported by the Engine API list endpoint.
/// `name` has the leading `/` stripped; `image` keeps only the segment after
/// the last `/`; `status` is the State string verbatim (or "unknown").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    pub status: String,
    pub image: String,
}
