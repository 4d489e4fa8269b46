/// 計装付きHTTPクライアントのコア。
///
/// 構築ポリシー（ベースURL必須、タイムアウト既定値）と、全呼び出しを
/// `Success` / `HttpFailure` / `NetworkFailure` に分類するディスパッチを持つ。
/// この層は再試行もキャッシュも行わず、分類した結果をそのまま返す。
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::error;

use crate::config::{Config, ConfigError};

use super::intercept::{ForensicInterceptor, Interceptor, RequestContext};

/// ディスパッチ済み呼び出しの排他的な結果分類。
///
/// ステータス400未満は [`CallOutcome::Success`]、400以上は
/// [`CallOutcome::HttpFailure`]、応答なし（タイムアウト・接続失敗）は
/// [`CallOutcome::NetworkFailure`] となる。本文は受信したまま変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success { status: StatusCode, body: String },
    HttpFailure { status: StatusCode, body: String },
    NetworkFailure { message: String },
}

impl CallOutcome {
    /// 応答が得られた場合のステータスコード。
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Success { status, .. } | Self::HttpFailure { status, .. } => Some(*status),
            Self::NetworkFailure { .. } => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// 応答本文（得られた場合）。
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } | Self::HttpFailure { body, .. } => Some(body),
            Self::NetworkFailure { .. } => None,
        }
    }

    /// 成功応答の本文をデシリアライズする。
    ///
    /// # Errors
    /// 結果が成功でない場合、または本文のデシリアライズに失敗した場合は
    /// エラーを返す。
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Success { body, .. } => {
                serde_json::from_str(body).context("failed to deserialize response body")
            }
            Self::HttpFailure { status, .. } => {
                anyhow::bail!("cannot deserialize rejected response (status {status})")
            }
            Self::NetworkFailure { message } => {
                anyhow::bail!("cannot deserialize failed call: {message}")
            }
        }
    }
}

/// 設定から構築される計装付きHTTPクライアント。
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

// dyn Interceptor はDebugを要求しないため手書きで実装する。
impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// 解決済み設定からクライアントを1つ構築する。
    ///
    /// ベースURLが欠落または空の場合は、ネットワーク活動より前に
    /// フォレンジックチャネルへエラーを記録したうえで失敗する。
    /// 既定ではフォレンジックインターセプタが組み込まれる。
    ///
    /// # Errors
    /// `BASE_URL` が未設定・空・不正、またはHTTPクライアントの構築に
    /// 失敗した場合は [`ConfigError`] を返す。
    pub fn build(config: &Config) -> Result<Self, ConfigError> {
        let base_url = match config.base_url() {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => {
                error!(target: "forensic", "BASE_URL is not defined in environment variables");
                return Err(ConfigError::MissingBaseUrl);
            }
        };

        Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
            interceptors: vec![Arc::new(ForensicInterceptor)],
        })
    }

    /// インターセプタを末尾に追加する。テストダブルの差し込みにも使う。
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// `GET` を発行する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。HTTP層・ネットワーク
    /// 層の失敗は [`CallOutcome`] として返る。
    pub async fn get(&self, path: &str) -> Result<CallOutcome> {
        self.run(RequestContext::new(Method::GET, path, None)).await
    }

    /// `POST` をJSON本文つきで発行する。
    ///
    /// # Errors
    /// ペイロードのシリアライズまたはリクエスト構築に失敗した場合のみ
    /// エラーを返す。
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<CallOutcome> {
        self.run_with_payload(Method::POST, path, serde_json::to_value(payload))
            .await
    }

    /// `PUT` をJSON本文つきで発行する。
    ///
    /// # Errors
    /// ペイロードのシリアライズまたはリクエスト構築に失敗した場合のみ
    /// エラーを返す。
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<CallOutcome> {
        self.run_with_payload(Method::PUT, path, serde_json::to_value(payload))
            .await
    }

    /// `DELETE` を発行する。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn delete(&self, path: &str) -> Result<CallOutcome> {
        self.run(RequestContext::new(Method::DELETE, path, None))
            .await
    }

    /// 任意のメソッドで1回ディスパッチする。
    ///
    /// # Errors
    /// リクエスト構築に失敗した場合のみエラーを返す。
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<CallOutcome> {
        self.run(RequestContext::new(method, path, body)).await
    }

    async fn run_with_payload(
        &self,
        method: Method,
        path: &str,
        payload: serde_json::Result<Value>,
    ) -> Result<CallOutcome> {
        let body = match payload {
            Ok(body) => body,
            Err(source) => {
                let ctx = RequestContext::new(method, path, None);
                let failure =
                    anyhow::Error::new(source).context("failed to serialize request payload");
                self.observe_request_error(&ctx, &failure);
                return Err(failure);
            }
        };
        self.run(RequestContext::new(method, path, Some(body))).await
    }

    async fn run(&self, ctx: RequestContext) -> Result<CallOutcome> {
        let url = match self.endpoint(&ctx.path) {
            Ok(url) => url,
            Err(failure) => {
                self.observe_request_error(&ctx, &failure);
                return Err(failure);
            }
        };

        for interceptor in &self.interceptors {
            interceptor.before(&ctx);
        }

        let mut request = self.client.request(ctx.method.clone(), url);
        if let Some(body) = &ctx.body {
            request = request.json(body);
        }

        let outcome = match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) if status.as_u16() < 400 => CallOutcome::Success { status, body },
                    Ok(body) => CallOutcome::HttpFailure { status, body },
                    Err(e) => CallOutcome::NetworkFailure {
                        message: e.to_string(),
                    },
                }
            }
            Err(e) if e.is_timeout() => CallOutcome::NetworkFailure {
                message: format!("request timed out after {}ms", self.timeout.as_millis()),
            },
            Err(e) => CallOutcome::NetworkFailure {
                message: e.to_string(),
            },
        };

        for interceptor in &self.interceptors {
            interceptor.after(&ctx, &outcome);
        }

        Ok(outcome)
    }

    fn observe_request_error(&self, ctx: &RequestContext, error: &anyhow::Error) {
        for interceptor in &self.interceptors {
            interceptor.on_request_error(ctx, error);
        }
    }

    // axios-style concatenation: a path of "/Books" under a base of
    // "https://host/api/v1" must resolve to "https://host/api/v1/Books",
    // which Url::join would not do.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).with_context(|| format!("failed to build request URL for {path}"))
    }
}
