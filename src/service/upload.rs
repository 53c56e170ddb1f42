use crate::error::ApiError;
use crate::model::FormPayload;
use crate::session::dto::UploadResponse;
use crate::session::{ApiSession, PATH_UPLOAD};
use reqwest::Method;
use std::path::Path;

/// 上传单个文件，返回服务端保存的相对路径
pub async fn upload_file(session: &ApiSession, path: &Path) -> Result<String, ApiError> {
    if !path.is_file() {
        return Err(ApiError::Validation(format!(
            "文件不存在: {}",
            path.display()
        )));
    }
    let payload = FormPayload::new().file("file", path);
    let resp = session.send_form(Method::POST, PATH_UPLOAD, payload).await?;
    let text = resp.text().await?;
    let body: UploadResponse =
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(body.path)
}
