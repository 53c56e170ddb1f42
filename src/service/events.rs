use super::ListBody;
use crate::error::ApiError;
use crate::model::{Event, EventDraft};
use crate::session::{path_events_id, ApiSession, PATH_EVENTS};
use reqwest::Method;

pub async fn list(session: &ApiSession) -> Result<Vec<Event>, ApiError> {
    let body: ListBody<Event> = session.get_json(PATH_EVENTS).await?;
    Ok(body.into_vec())
}

pub async fn get(session: &ApiSession, id: &str) -> Result<Event, ApiError> {
    session.get_json(&path_events_id(id)).await
}

pub async fn create(session: &ApiSession, draft: &EventDraft) -> Result<(), ApiError> {
    session
        .send_form(Method::POST, PATH_EVENTS, draft.to_payload())
        .await?;
    Ok(())
}

pub async fn update(session: &ApiSession, id: &str, draft: &EventDraft) -> Result<(), ApiError> {
    session
        .send_form(Method::PUT, &path_events_id(id), draft.to_payload())
        .await?;
    Ok(())
}

pub async fn delete(session: &ApiSession, id: &str) -> Result<(), ApiError> {
    session.delete(&path_events_id(id)).await
}
