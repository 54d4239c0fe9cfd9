use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer id of a Zenodo deposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepositionId(pub u64);

impl fmt::Display for DepositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DepositionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(DepositionId)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositionLinks {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub latest_draft: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Subset of the deposition resource this tool reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposition {
    pub id: DepositionId,
    #[serde(default)]
    pub links: DepositionLinks,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub submitted: Option<bool>,
    #[serde(default)]
    pub doi: Option<String>,
}

impl Deposition {
    pub fn is_published(&self) -> bool {
        self.submitted.unwrap_or(false) || self.state.as_deref() == Some("done")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadType {
    Publication,
    Poster,
    Presentation,
    Dataset,
    Image,
    Video,
    Software,
    Lesson,
    PhysicalObject,
    Other,
}

pub const PUBLICATION_TYPES: &[&str] = &[
    "annotationcollection",
    "book",
    "section",
    "conferencepaper",
    "datamanagementplan",
    "article",
    "patent",
    "preprint",
    "deliverable",
    "milestone",
    "proposal",
    "report",
    "softwaredocumentation",
    "taxonomictreatment",
    "technicalnote",
    "thesis",
    "workingpaper",
    "other",
];

pub const IMAGE_TYPES: &[&str] = &["figure", "plot", "drawing", "diagram", "photo", "other"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositionMetadata {
    pub title: String,
    pub upload_type: UploadType,
    /// Required by Zenodo when `upload_type` is `publication`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_type: Option<String>,
    /// Required by Zenodo when `upload_type` is `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    pub description: String,
    pub creators: Vec<Creator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl Default for DepositionMetadata {
    fn default() -> Self {
        Self {
            title: "My first upload".to_string(),
            upload_type: UploadType::Poster,
            publication_type: None,
            image_type: None,
            description: "Test upload of example data".to_string(),
            creators: vec![Creator {
                name: "G-P, Kai".to_string(),
                affiliation: Some("RF CUNY".to_string()),
                orcid: None,
            }],
            publication_date: None,
            keywords: None,
        }
    }
}

/// Wire envelope for the metadata PUT.
#[derive(Debug, Serialize)]
pub struct MetadataEnvelope<'a> {
    pub metadata: &'a DepositionMetadata,
}

/// Object created in a deposition bucket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BucketObject {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub deposition_id: DepositionId,
    pub doi: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadPlan {
    NewDeposition {
        filename: String,
    },
    NewVersion {
        deposition_id: DepositionId,
        filename: Option<String>,
    },
}
