/// リクエスト／レスポンスの観測パイプライン。
///
/// クライアントは登録順に並んだインターセプタ列を保持し、ディスパッチの
/// 前後で各フックを呼び出す。フックは結果を観測するだけで、変更・遅延・
/// 再試行は一切行わない。
use reqwest::Method;
use serde_json::Value;
use tracing::{error, trace};

use super::http::CallOutcome;

/// ディスパッチ前後で観測される呼び出しコンテキスト。
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// 呼び出しごとに適用される観測フック。
///
/// 1回のディスパッチにつき `before` と `after` がこの順で必ず一度ずつ
/// 呼ばれる。リクエスト構築に失敗した場合は代わりに
/// `on_request_error` が一度だけ呼ばれる。
pub trait Interceptor: Send + Sync {
    /// 呼び出しがプロセスを離れる直前に呼ばれる。
    fn before(&self, ctx: &RequestContext);

    /// 結果の分類が確定した直後に呼ばれる。
    fn after(&self, ctx: &RequestContext, outcome: &CallOutcome);

    /// リクエスト構築自体が失敗した場合に呼ばれる。元のエラーは
    /// そのまま呼び出し元へ伝播される。
    fn on_request_error(&self, _ctx: &RequestContext, _error: &anyhow::Error) {}
}

/// 全呼び出しをフォレンジックチャネルへ記録する既定のインターセプタ。
#[derive(Debug, Default, Clone, Copy)]
pub struct ForensicInterceptor;

impl Interceptor for ForensicInterceptor {
    fn before(&self, ctx: &RequestContext) {
        match &ctx.body {
            Some(body) => trace!(
                target: "forensic",
                method = %ctx.method,
                path = %ctx.path,
                body = %body,
                "request"
            ),
            None => trace!(
                target: "forensic",
                method = %ctx.method,
                path = %ctx.path,
                "request"
            ),
        }
    }

    fn after(&self, ctx: &RequestContext, outcome: &CallOutcome) {
        match outcome {
            CallOutcome::Success { status, body } => trace!(
                target: "forensic",
                status = status.as_u16(),
                path = %ctx.path,
                body = %body,
                "response"
            ),
            CallOutcome::HttpFailure { status, body } => error!(
                target: "forensic",
                status = status.as_u16(),
                path = %ctx.path,
                body = %body,
                "response error"
            ),
            // No status exists when no response was received.
            CallOutcome::NetworkFailure { message } => error!(
                target: "forensic",
                path = %ctx.path,
                message = %message,
                "response error"
            ),
        }
    }

    fn on_request_error(&self, ctx: &RequestContext, error: &anyhow::Error) {
        error!(
            target: "forensic",
            method = %ctx.method,
            path = %ctx.path,
            error = %error,
            "request error"
        );
    }
}
