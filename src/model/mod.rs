pub mod event;
pub mod insight;
pub mod multipart;
pub mod player;

pub use event::{Event, EventDraft};
pub use insight::{Insight, InsightCategory, InsightDraft};
pub use multipart::FormPayload;
pub use player::{Player, PlayerDraft, Position};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// 三类可管理的资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Players,
    Events,
    Insights,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Players, Resource::Events, Resource::Insights];

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Players => "球员",
            Resource::Events => "活动",
            Resource::Insights => "文章",
        }
    }

    pub fn parse(s: &str) -> Option<Resource> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" | "players" => Some(Resource::Players),
            "event" | "events" => Some(Resource::Events),
            "insight" | "insights" | "article" | "articles" => Some(Resource::Insights),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 后端的 id 可能是数字也可能是字符串，统一存成字符串
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}

/// null 当作空字符串
pub(crate) fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// null 或缺失时取默认值（枚举字段用）
pub(crate) fn de_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 年龄：数字或数字字符串；null、负数和无法解析的值记为 0
pub(crate) fn de_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// 图片字段既可能是数组，也可能是逗号分隔的字符串或 null
pub(crate) fn de_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|i| i.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
