use serde::Deserialize;

// Archive response envelope; entries stay raw so the full JSON can be stored
#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
}

// Typed view of one archive entry. Every known field must be a string when
// present; unknown fields are ignored and kept in the raw JSON.
#[derive(Debug, Deserialize)]
pub struct ArchiveImage {
    pub startdate: Option<String>,
    pub url: Option<String>,
    pub copyright: Option<String>,
    pub title: Option<String>,
    pub hsh: Option<String>,

    // Type-checked only
    #[allow(dead_code)]
    pub fullstartdate: Option<String>,
    #[allow(dead_code)]
    pub enddate: Option<String>,
    #[allow(dead_code)]
    pub copyrightlink: Option<String>,
    #[allow(dead_code)]
    pub copyrightonly: Option<String>,
    #[allow(dead_code)]
    pub caption: Option<String>,
    #[allow(dead_code)]
    pub desc: Option<String>,
    #[allow(dead_code)]
    pub date: Option<String>,
    #[allow(dead_code)]
    pub quiz: Option<String>,
    #[allow(dead_code)]
    pub zone: Option<String>,
}
