use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File extensions accepted for dataset uploads
pub const ACCEPTED_UPLOAD_EXTENSIONS: [&str; 3] = ["csv", "json", "zip"];
/// Largest accepted upload, 10GB
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024 * 1024;

/// NewType pattern for Dataset ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    /// Create from existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hosted dataset offered by the backend catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    /// Modality label, e.g. "Text", "Image", "Audio"
    #[serde(rename = "type")]
    pub data_type: String,
    pub description: String,
    /// Size label, e.g. "1.2TB"
    pub size: String,
    #[serde(rename = "examples")]
    pub example_count: u64,
}

/// Metadata of a user supplied dataset file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased extension of the file name
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Upload constraints: `.csv`, `.json` or `.zip`, at most 10GB
    pub fn validate(&self) -> Result<()> {
        let accepted = self
            .extension()
            .is_some_and(|ext| ACCEPTED_UPLOAD_EXTENSIONS.contains(&ext.as_str()));
        if !accepted {
            return Err(CoreError::UnsupportedFileType(self.name.clone()));
        }
        if self.size_bytes > MAX_UPLOAD_BYTES {
            return Err(CoreError::FileTooLarge {
                name: self.name.clone(),
                size_bytes: self.size_bytes,
            });
        }
        Ok(())
    }

    /// Size in megabytes with two decimals, as shown next to the file name
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / (1024.0 * 1024.0))
    }
}
