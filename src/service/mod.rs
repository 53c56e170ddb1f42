pub mod auth;
pub mod events;
pub mod insights;
pub mod players;
pub mod upload;

use serde::Deserialize;

/// 列表接口有的直接返回数组，有的包一层 data / items
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> ListBody<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(v) => v,
            ListBody::Data { data } => data,
            ListBody::Items { items } => items,
        }
    }
}
