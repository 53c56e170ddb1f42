pub mod field;

pub use field::{FieldKind, FormField};

use crate::model::event::parse_date;
use crate::model::{
    Event, EventDraft, Insight, InsightCategory, InsightDraft, Player, PlayerDraft, Position,
};
use field::split_paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Player,
    Event,
    Insight,
    Login,
}

/// 校验通过后的提交内容
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutput {
    CreatePlayer(PlayerDraft),
    UpdatePlayer { id: String, draft: PlayerDraft },
    CreateEvent(EventDraft),
    UpdateEvent { id: String, draft: EventDraft },
    CreateInsight(InsightDraft),
    UpdateInsight { id: String, draft: InsightDraft },
    Login { username: String, password: String },
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    /// Some 表示编辑已有记录（整条替换）
    pub editing_id: Option<String>,
    pub fields: Vec<FormField>,
    pub selected: usize,
    pub existing_images: Vec<String>,
    pub error: Option<String>,
    pub submitting: bool,
}

const POSITIONS: [&str; 4] = ["Goalkeeper", "Defender", "Midfielder", "Forward"];
const CATEGORIES: [&str; 4] = ["News", "Analysis", "Interview", "Feature"];

impl FormState {
    fn build(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            editing_id: None,
            fields,
            selected: 0,
            existing_images: Vec::new(),
            error: None,
            submitting: false,
        }
    }

    fn player_fields() -> Vec<FormField> {
        vec![
            FormField::new("FullName", "姓名", FieldKind::Text).required(),
            FormField::new("Age", "年龄", FieldKind::Number { min: 1, max: 120 }).required(),
            FormField::new("Club", "俱乐部", FieldKind::Text).required(),
            FormField::new("Position", "位置", FieldKind::Choice(POSITIONS.to_vec())).required(),
            FormField::new("Nationality", "国籍", FieldKind::Text).required(),
            FormField::new("Description", "简介", FieldKind::MultiLine),
            FormField::new("ImageFile", "新图片", FieldKind::Files),
        ]
    }

    fn event_fields() -> Vec<FormField> {
        vec![
            FormField::new("Title", "标题", FieldKind::Text).required(),
            FormField::new("Description", "描述", FieldKind::MultiLine).required(),
            FormField::new("Date", "日期", FieldKind::Date).required(),
            FormField::new("Location", "地点", FieldKind::Text).required(),
            FormField::new("ImageFile", "新图片", FieldKind::Files),
        ]
    }

    fn insight_fields() -> Vec<FormField> {
        vec![
            FormField::new("Title", "标题", FieldKind::Text).required(),
            FormField::new("ShortDescription", "摘要", FieldKind::Text).required(),
            FormField::new("Content", "正文", FieldKind::MultiLine).required(),
            FormField::new("Author", "作者", FieldKind::Text).required(),
            FormField::new("Category", "分类", FieldKind::Choice(CATEGORIES.to_vec())).required(),
            FormField::new("ImageFile", "新图片", FieldKind::Files),
        ]
    }

    pub fn new_player() -> Self {
        Self::build(FormKind::Player, Self::player_fields())
    }

    pub fn edit_player(p: &Player) -> Self {
        let mut f = Self::new_player();
        f.editing_id = Some(p.id.clone());
        f.existing_images = p.images.clone();
        f.set("FullName", &p.full_name);
        f.set("Age", &p.age.to_string());
        f.set("Club", &p.club);
        f.set("Position", p.position.as_str());
        f.set("Nationality", &p.nationality);
        f.set("Description", &p.description);
        f
    }

    pub fn new_event() -> Self {
        Self::build(FormKind::Event, Self::event_fields())
    }

    pub fn edit_event(e: &Event) -> Self {
        let mut f = Self::new_event();
        f.editing_id = Some(e.id.clone());
        f.existing_images = e.images.clone();
        f.set("Title", &e.title);
        f.set("Description", &e.description);
        if let Some(d) = e.date {
            f.set("Date", &d.format("%Y-%m-%d").to_string());
        }
        f.set("Location", &e.location);
        f
    }

    pub fn new_insight() -> Self {
        Self::build(FormKind::Insight, Self::insight_fields())
    }

    pub fn edit_insight(i: &Insight) -> Self {
        let mut f = Self::new_insight();
        f.editing_id = Some(i.id.clone());
        f.existing_images = i.images.clone();
        f.set("Title", &i.title);
        f.set("ShortDescription", &i.short_description);
        f.set("Content", &i.content);
        f.set("Author", &i.author);
        f.set("Category", i.category.as_str());
        f
    }

    pub fn login() -> Self {
        Self::build(
            FormKind::Login,
            vec![
                FormField::new("Username", "用户名", FieldKind::Text).required(),
                FormField::new("Password", "密码", FieldKind::Secret).required(),
            ],
        )
    }

    pub fn title(&self) -> String {
        let what = match self.kind {
            FormKind::Player => "球员",
            FormKind::Event => "活动",
            FormKind::Insight => "文章",
            FormKind::Login => return "管理员登录".to_string(),
        };
        if self.editing_id.is_some() {
            format!("编辑{}", what)
        } else {
            format!("新建{}", what)
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(f) = self.fields.iter_mut().find(|f| f.key == key) {
            f.value = value.to_string();
        }
    }

    pub fn current(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + 1) % self.fields.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(f) = self.current() {
            if !matches!(f.kind, FieldKind::Choice(_)) {
                f.value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(f) = self.current() {
            if !matches!(f.kind, FieldKind::Choice(_)) {
                f.value.pop();
            }
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        if let Some(f) = self.current() {
            f.cycle(forward);
        }
    }

    /// 清空所有字段，回到新建状态
    pub fn reset(&mut self) {
        let fresh = match self.kind {
            FormKind::Player => Self::new_player(),
            FormKind::Event => Self::new_event(),
            FormKind::Insight => Self::new_insight(),
            FormKind::Login => Self::login(),
        };
        *self = fresh;
    }

    /// 提交前校验；任何字段不合法都不会产生网络请求
    pub fn validate(&self) -> Result<FormOutput, String> {
        for f in &self.fields {
            f.check()?;
        }

        let text = |k: &str| self.value(k).trim().to_string();
        let new_images = split_paths(self.value("ImageFile"));
        let existing_images = self.existing_images.clone();

        let out = match self.kind {
            FormKind::Player => {
                let draft = PlayerDraft {
                    full_name: text("FullName"),
                    age: text("Age").parse().map_err(|_| "年龄 必须是整数".to_string())?,
                    club: text("Club"),
                    position: Position::parse_known(&text("Position"))
                        .ok_or_else(|| "位置 不合法".to_string())?,
                    nationality: text("Nationality"),
                    description: text("Description"),
                    existing_images,
                    new_images,
                };
                match &self.editing_id {
                    Some(id) => FormOutput::UpdatePlayer {
                        id: id.clone(),
                        draft,
                    },
                    None => FormOutput::CreatePlayer(draft),
                }
            }
            FormKind::Event => {
                let draft = EventDraft {
                    title: text("Title"),
                    description: text("Description"),
                    date: parse_date(&text("Date")).ok_or_else(|| "日期 不合法".to_string())?,
                    location: text("Location"),
                    existing_images,
                    new_images,
                };
                match &self.editing_id {
                    Some(id) => FormOutput::UpdateEvent {
                        id: id.clone(),
                        draft,
                    },
                    None => FormOutput::CreateEvent(draft),
                }
            }
            FormKind::Insight => {
                let draft = InsightDraft {
                    title: text("Title"),
                    short_description: text("ShortDescription"),
                    content: text("Content"),
                    author: text("Author"),
                    category: InsightCategory::parse_known(&text("Category"))
                        .ok_or_else(|| "分类 不合法".to_string())?,
                    existing_images,
                    new_images,
                };
                match &self.editing_id {
                    Some(id) => FormOutput::UpdateInsight {
                        id: id.clone(),
                        draft,
                    },
                    None => FormOutput::CreateInsight(draft),
                }
            }
            FormKind::Login => FormOutput::Login {
                username: text("Username"),
                password: self.value("Password").to_string(),
            },
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filled_player() -> FormState {
        let mut f = FormState::new_player();
        f.set("FullName", "Ama Mensah");
        f.set("Age", "24");
        f.set("Club", "Hearts of Oak");
        f.set("Position", "Forward");
        f.set("Nationality", "Ghana");
        f
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let mut f = filled_player();
        f.set("Club", "   ");
        let err = f.validate().unwrap_err();
        assert!(err.contains("俱乐部"), "{err}");
    }

    #[test]
    fn new_player_validates_to_create() {
        match filled_player().validate().unwrap() {
            FormOutput::CreatePlayer(d) => {
                assert_eq!(d.full_name, "Ama Mensah");
                assert_eq!(d.age, 24);
                assert_eq!(d.position, Position::Forward);
                assert!(d.new_images.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn editing_keeps_id_and_images() {
        let p = Player {
            id: "42".into(),
            full_name: "Kofi".into(),
            age: 31,
            club: "Kotoko".into(),
            position: Position::Defender,
            nationality: "Ghana".into(),
            description: "Veteran".into(),
            images: vec!["uploads/k.jpg".into()],
        };
        let mut f = FormState::edit_player(&p);
        assert_eq!(f.title(), "编辑球员");
        f.set("Age", "32");
        match f.validate().unwrap() {
            FormOutput::UpdatePlayer { id, draft } => {
                assert_eq!(id, "42");
                assert_eq!(draft.age, 32);
                assert_eq!(draft.existing_images, vec!["uploads/k.jpg".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn event_date_must_parse() {
        let mut f = FormState::new_event();
        f.set("Title", "Awards Night");
        f.set("Description", "Annual gala");
        f.set("Location", "Accra");
        f.set("Date", "01/03/2025");
        assert!(f.validate().is_err());
        f.set("Date", "2025-03-01");
        match f.validate().unwrap() {
            FormOutput::CreateEvent(d) => {
                assert_eq!(d.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn insight_category_defaults_to_first_choice() {
        let mut f = FormState::new_insight();
        f.set("Title", "Recap");
        f.set("ShortDescription", "s");
        f.set("Content", "c");
        f.set("Author", "a");
        match f.validate().unwrap() {
            FormOutput::CreateInsight(d) => assert_eq!(d.category, InsightCategory::News),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn typing_skips_choice_fields_and_reset_clears() {
        let mut f = FormState::new_player();
        f.push_char('K');
        assert_eq!(f.value("FullName"), "K");
        f.selected = 3;
        f.push_char('x');
        assert_eq!(f.value("Position"), "Goalkeeper");
        f.cycle_choice(true);
        assert_eq!(f.value("Position"), "Defender");
        f.select_prev();
        f.select_prev();
        f.select_prev();
        f.select_prev();
        assert_eq!(f.selected, 6);

        f.error = Some("x".into());
        f.reset();
        assert_eq!(f.value("FullName"), "");
        assert!(f.error.is_none());
        assert_eq!(f.selected, 0);
    }

    #[test]
    fn login_requires_both_fields() {
        let mut f = FormState::login();
        f.set("Username", "admin");
        assert!(f.validate().is_err());
        f.set("Password", "pw");
        assert_eq!(
            f.validate().unwrap(),
            FormOutput::Login {
                username: "admin".into(),
                password: "pw".into()
            }
        );
    }
}
