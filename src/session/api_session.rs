use super::urls::join;
use crate::error::ApiError;
use crate::model::FormPayload;
use log::{info, warn};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;
use std::time::Duration;

/// API 会话
///
/// 固定的基础地址 + 可选的 Bearer token。
/// 不做重试，也不做拦截；失败直接以 `ApiError` 返回给调用方。
pub struct ApiSession {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiSession {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("assoc_portal/0.1")
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join(&self.base_url, path)
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token.filter(|t| !t.trim().is_empty());
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|g| g.clone())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 非 2xx 统一转成 ApiError
    async fn check(&self, resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();
        warn!("{} {} -> {}", self, url, status);
        Err(ApiError::from_status(status, &body))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.request(Method::GET, path).send().await?;
        let resp = self.check(resp).await?;
        info!("{} get_json(...) [{}]", self, path);
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        info!("{} post_json(...) [{}]", self, path);
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// multipart 提交；后端可能返回 201/204 且无响应体，这里只关心状态码
    pub async fn send_form(
        &self,
        method: Method,
        path: &str,
        payload: FormPayload,
    ) -> Result<Response, ApiError> {
        let form = payload.into_multipart().await?;
        let resp = self
            .request(method.clone(), path)
            .multipart(form)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        info!("{} send_form({}) [{}]", self, method, path);
        Ok(resp)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let resp = self.request(Method::DELETE, path).send().await?;
        self.check(resp).await?;
        info!("{} delete(...) [{}]", self, path);
        Ok(())
    }

    /// GET 且只看状态码；`token` 不为空时覆盖会话自身的 token
    pub async fn check_path(&self, path: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = match token {
            Some(t) => self.client.get(self.url(path)).bearer_auth(t),
            None => self.request(Method::GET, path),
        };
        let resp = builder.send().await?;
        self.check(resp).await?;
        Ok(())
    }
}

impl std::fmt::Display for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = if self.has_token() { "bearer" } else { "anon" };
        write!(f, "<ApiSession [{} {}]>", self.base_url(), auth)
    }
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
