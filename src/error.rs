use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Network(String),
    #[error("未授权，请重新登录")]
    Unauthorized,
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    #[error("响应解析失败: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
    #[error("本地存储错误: {0}")]
    Storage(String),
    #[error("文件读取失败: {0}")]
    Io(String),
}

impl ApiError {
    /// 根据状态码和响应体构造错误，尽量取出服务端的 message
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return ApiError::Unauthorized;
        }
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        ApiError::Status {
            code: status.as_u16(),
            message,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Io(e.to_string())
    }
}

/// 错误响应没有固定格式：依次尝试 message / title / error，纯文本则原样返回
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(v) => ["message", "title", "error"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|x| x.as_str()))
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string()),
        Err(_) => Some(trimmed.chars().take(200).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins() {
        let body = r#"{"message":"Player not found","title":"ignored"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Player not found"));
    }

    #[test]
    fn falls_back_to_title_then_plain_text() {
        assert_eq!(
            extract_message(r#"{"title":"One or more validation errors occurred."}"#).as_deref(),
            Some("One or more validation errors occurred.")
        );
        assert_eq!(extract_message("boom").as_deref(), Some("boom"));
        assert_eq!(extract_message(r#"{"status":500}"#), None);
        assert_eq!(extract_message("   "), None);
    }

    #[test]
    fn status_error_uses_reason_when_body_is_empty() {
        match ApiError::from_status(StatusCode::NOT_FOUND, "") {
            ApiError::Status { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "{}"),
            ApiError::Unauthorized
        ));
    }
}
