use super::{de_age, de_id, de_images, de_or_default, de_string, FormPayload};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    #[default]
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    /// 后端返回了未知取值时原样保留
    Other(String),
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
            Position::Other(s) => s.as_str(),
        }
    }

    /// 严格解析（表单用），只接受固定取值，大小写不敏感
    pub fn parse_known(s: &str) -> Option<Position> {
        Self::ALL
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .cloned()
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Position::parse_known(&s).unwrap_or(Position::Other(s))
    }
}

impl From<Position> for String {
    fn from(p: Position) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "de_age")]
    pub age: u32,
    #[serde(default, deserialize_with = "de_string")]
    pub club: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub position: Position,
    #[serde(default, deserialize_with = "de_string")]
    pub nationality: String,
    #[serde(default, deserialize_with = "de_string")]
    pub description: String,
    #[serde(
        default,
        alias = "imagePaths",
        alias = "imageUrls",
        deserialize_with = "de_images"
    )]
    pub images: Vec<String>,
}

impl Player {
    /// 名字或俱乐部包含关键字（不区分大小写）
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.full_name.to_lowercase().contains(&q)
            || self.club.to_lowercase().contains(&q)
    }
}

/// 创建/更新球员时提交的数据
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDraft {
    pub full_name: String,
    pub age: u32,
    pub club: String,
    pub position: Position,
    pub nationality: String,
    pub description: String,
    pub existing_images: Vec<String>,
    pub new_images: Vec<PathBuf>,
}

impl PlayerDraft {
    pub fn to_payload(&self) -> FormPayload {
        let mut p = FormPayload::new()
            .text("FullName", self.full_name.trim())
            .text("Age", self.age.to_string())
            .text("Club", self.club.trim())
            .text("Position", self.position.as_str())
            .text("Nationality", self.nationality.trim())
            .text("Description", self.description.trim());
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
    fn decodes_camel_case_with_numeric_id() {
        let json = r#"{
            "id": 7,
            "fullName": "Ama Mensah",
            "age": 24,
            "club": "Hearts of Oak",
            "position": "forward",
            "nationality": "Ghana",
            "description": null,
            "imagePaths": ["uploads/ama.jpg"]
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "7");
        assert_eq!(p.position, Position::Forward);
        assert_eq!(p.description, "");
        assert_eq!(p.images, vec!["uploads/ama.jpg".to_string()]);
    }

    #[test]
    fn one_sparse_record_does_not_break_the_list() {
        let json = r#"[
            {"id": 1, "fullName": "Ama Mensah", "age": 24, "position": "Forward"},
            {"id": 2, "fullName": "Kofi", "age": null, "position": null},
            {"id": 3, "fullName": "Yaw", "age": "31", "position": "defender"},
            {"id": 4, "fullName": "Esi", "age": "n/a"}
        ]"#;
        let list: Vec<Player> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[1].age, 0);
        assert_eq!(list[1].position, Position::Goalkeeper);
        assert_eq!(list[2].age, 31);
        assert_eq!(list[2].position, Position::Defender);
        assert_eq!(list[3].age, 0);
    }

    #[test]
    fn unknown_position_is_kept() {
        let p: Position = serde_json::from_str(r#""Sweeper""#).unwrap();
        assert_eq!(p, Position::Other("Sweeper".to_string()));
        assert_eq!(serde_json::to_string(&p).unwrap(), r#""Sweeper""#);
        assert_eq!(Position::parse_known("Sweeper"), None);
    }

    #[test]
    fn filter_matches_name_or_club() {
        let p = Player {
            id: "1".into(),
            full_name: "Kofi Boateng".into(),
            age: 30,
            club: "Asante Kotoko".into(),
            position: Position::Defender,
            nationality: "Ghana".into(),
            description: String::new(),
            images: vec![],
        };
        assert!(p.matches("kofi"));
        assert!(p.matches("KOTOKO"));
        assert!(p.matches(""));
        assert!(!p.matches("Ghana"));
    }

    #[test]
    fn payload_uses_capitalized_keys() {
        let draft = PlayerDraft {
            full_name: " Kofi Boateng ".into(),
            age: 30,
            club: "Asante Kotoko".into(),
            position: Position::Midfielder,
            nationality: "Ghana".into(),
            description: "Captain".into(),
            existing_images: vec!["uploads/k.jpg".into()],
            new_images: vec![PathBuf::from("/tmp/k2.jpg")],
        };
        let p = draft.to_payload();
        assert_eq!(p.get("FullName"), Some("Kofi Boateng"));
        assert_eq!(p.get("Age"), Some("30"));
        assert_eq!(p.get("Position"), Some("Midfielder"));
        assert_eq!(p.get_all("ExistingImages"), vec!["uploads/k.jpg"]);
        assert_eq!(p.files, vec![("ImageFile", PathBuf::from("/tmp/k2.jpg"))]);
    }
}
