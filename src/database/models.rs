/// Request and response models for channels and tags
use serde::{Deserialize, Serialize};

/// Channel as returned by list queries, with its associated tag ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub default_title: String,
}

/// Tag as returned by list queries, with its associated channel ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub channels: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelCreateRequest {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub default_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelUpdateRequest {
    /// Taken from the URL path; a value in the body is ignored.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub default_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagCreateRequest {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<i64>,
}
