use super::{de_id, de_images, de_or_default, de_string, FormPayload};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InsightCategory {
    #[default]
    News,
    Analysis,
    Interview,
    Feature,
    Other(String),
}

impl InsightCategory {
    pub const ALL: [InsightCategory; 4] = [
        InsightCategory::News,
        InsightCategory::Analysis,
        InsightCategory::Interview,
        InsightCategory::Feature,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            InsightCategory::News => "News",
            InsightCategory::Analysis => "Analysis",
            InsightCategory::Interview => "Interview",
            InsightCategory::Feature => "Feature",
            InsightCategory::Other(s) => s.as_str(),
        }
    }

    pub fn parse_known(s: &str) -> Option<InsightCategory> {
        Self::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .cloned()
    }
}

impl From<String> for InsightCategory {
    fn from(s: String) -> Self {
        InsightCategory::parse_known(&s).unwrap_or(InsightCategory::Other(s))
    }
}

impl From<InsightCategory> for String {
    fn from(c: InsightCategory) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub title: String,
    #[serde(default, deserialize_with = "de_string")]
    pub short_description: String,
    #[serde(default, deserialize_with = "de_string")]
    pub content: String,
    #[serde(default, deserialize_with = "de_string")]
    pub author: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub category: InsightCategory,
    #[serde(
        default,
        alias = "imagePaths",
        alias = "imageUrls",
        deserialize_with = "de_images"
    )]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightDraft {
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub author: String,
    pub category: InsightCategory,
    pub existing_images: Vec<String>,
    pub new_images: Vec<PathBuf>,
}

impl InsightDraft {
    pub fn to_payload(&self) -> FormPayload {
        let mut p = FormPayload::new()
            .text("Title", self.title.trim())
            .text("ShortDescription", self.short_description.trim())
            .text("Content", self.content.trim())
            .text("Author", self.author.trim())
            .text("Category", self.category.as_str());
        for img in &self.existing_images {
            p = p.text("ExistingImages", img.clone());
        }
        for path in &self.new_images {
            p = p.file("ImageFile", path.clone());
        }
        p
    }
}
