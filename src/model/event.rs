use super::{de_id, de_images, de_string, FormPayload};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub title: String,
    #[serde(default, deserialize_with = "de_string")]
    pub description: String,
    #[serde(default, deserialize_with = "de_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_string")]
    pub location: String,
    #[serde(
        default,
        alias = "imagePaths",
        alias = "imageUrls",
        deserialize_with = "de_images"
    )]
    pub images: Vec<String>,
}

impl Event {
    pub fn date_label(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// 接受 "2025-03-01" 或 "2025-03-01T18:30:00" 这类写法，只取日期部分
fn de_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_date(&s)))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub existing_images: Vec<String>,
    pub new_images: Vec<PathBuf>,
}

impl EventDraft {
    pub fn to_payload(&self) -> FormPayload {
        let mut p = FormPayload::new()
            .text("Title", self.title.trim())
            .text("Description", self.description.trim())
            .text("Date", self.date.format("%Y-%m-%d").to_string())
            .text("Location", self.location.trim());
        for img in &self.existing_images {
            p = p.text("ExistingImages", img.clone());
        }
        for path in &self.new_images {
            p = p.file("ImageFile", path.clone());
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_with_time_component() {
        let e: Event = serde_json::from_str(
            r#"{"id":"ev-1","title":"Awards Night","description":"","date":"2025-03-01T18:30:00","location":"Accra","images":"a.jpg, b.jpg"}"#,
        )
        .unwrap();
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(e.date_label(), "2025-03-01");
        assert_eq!(e.images, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn bad_or_missing_date_is_none() {
        let e: Event = serde_json::from_str(r#"{"id":2,"title":"TBD","date":"soon"}"#).unwrap();
        assert_eq!(e.date, None);
        assert_eq!(e.date_label(), "-");
        assert!(e.images.is_empty());
    }

    #[test]
    fn payload_formats_date() {
        let draft = EventDraft {
            title: "Coaching Clinic".into(),
            description: "Youth clinic".into(),
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            location: "Kumasi".into(),
            existing_images: vec![],
            new_images: vec![],
        };
        let p = draft.to_payload();
        assert_eq!(p.get("Date"), Some("2025-07-04"));
        assert_eq!(p.get("Location"), Some("Kumasi"));
        assert!(p.files.is_empty());
    }
}
