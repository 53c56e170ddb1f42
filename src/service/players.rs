use super::ListBody;
use crate::error::ApiError;
use crate::model::{Player, PlayerDraft};
use crate::session::{path_players_id, ApiSession, PATH_PLAYERS};
use reqwest::Method;

pub async fn list(session: &ApiSession) -> Result<Vec<Player>, ApiError> {
    let body: ListBody<Player> = session.get_json(PATH_PLAYERS).await?;
    Ok(body.into_vec())
}

pub async fn get(session: &ApiSession, id: &str) -> Result<Player, ApiError> {
    session.get_json(&path_players_id(id)).await
}

pub async fn create(session: &ApiSession, draft: &PlayerDraft) -> Result<(), ApiError> {
    session
        .send_form(Method::POST, PATH_PLAYERS, draft.to_payload())
        .await?;
    Ok(())
}

pub async fn update(session: &ApiSession, id: &str, draft: &PlayerDraft) -> Result<(), ApiError> {
    session
        .send_form(Method::PUT, &path_players_id(id), draft.to_payload())
        .await?;
    Ok(())
}

pub async fn delete(session: &ApiSession, id: &str) -> Result<(), ApiError> {
    session.delete(&path_players_id(id)).await
}
