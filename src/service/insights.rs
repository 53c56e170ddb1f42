use super::ListBody;
use crate::error::ApiError;
use crate::model::{Insight, InsightDraft};
use crate::session::{path_insights_id, ApiSession, PATH_INSIGHTS};
use reqwest::Method;

pub async fn list(session: &ApiSession) -> Result<Vec<Insight>, ApiError> {
    let body: ListBody<Insight> = session.get_json(PATH_INSIGHTS).await?;
    Ok(body.into_vec())
}

pub async fn get(session: &ApiSession, id: &str) -> Result<Insight, ApiError> {
    session.get_json(&path_insights_id(id)).await
}

pub async fn create(session: &ApiSession, draft: &InsightDraft) -> Result<(), ApiError> {
    session
        .send_form(Method::POST, PATH_INSIGHTS, draft.to_payload())
        .await?;
    Ok(())
}

pub async fn update(
    session: &ApiSession,
    id: &str,
    draft: &InsightDraft,
) -> Result<(), ApiError> {
    session
        .send_form(Method::PUT, &path_insights_id(id), draft.to_payload())
        .await?;
    Ok(())
}

pub async fn delete(session: &ApiSession, id: &str) -> Result<(), ApiError> {
    session.delete(&path_insights_id(id)).await
}
