use crate::error::ApiError;
use crate::session::dto::{LoginRequest, LoginResponse};
use crate::session::{ApiSession, PATH_AUTH_LOGIN, PATH_AUTH_VERIFY};

pub async fn login(
    session: &ApiSession,
    username: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation("用户名和密码不能为空".to_string()));
    }
    let body = LoginRequest {
        username: username.trim(),
        password,
    };
    let resp: LoginResponse = session.post_json(PATH_AUTH_LOGIN, &body).await?;
    if resp.token.trim().is_empty() {
        return Err(ApiError::Decode("登录响应缺少 token".to_string()));
    }
    Ok(resp)
}

pub async fn verify(session: &ApiSession, token: &str) -> Result<(), ApiError> {
    session.check_path(PATH_AUTH_VERIFY, Some(token)).await
}
