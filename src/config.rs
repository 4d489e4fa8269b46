use std::{collections::HashMap, env, fs, path::Path, path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::{debug, info};

use crate::util::redact;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

/// 環境名が未指定の場合のフォールバック。
const DEFAULT_ENVIRONMENT: &str = "stage";
/// `TIMEOUT` が未設定または数値でない場合の既定タイムアウト（ミリ秒）。
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// 解決済みのプロセス設定。起動時に一度だけ構築し、以後は読み取り専用で
/// 各コンポーネントへ参照渡しする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    environment: String,
    base_url: Option<String>,
    timeout: Duration,
    redact_env_dump: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load \".env\" file: {} does not exist", .0.display())]
    EnvFileNotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    EnvFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("BASE_URL is missing")]
    MissingBaseUrl,
    #[error("invalid BASE_URL: {0}")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl Config {
    /// 環境名に対応する `.env.<name>` ファイルを作業ディレクトリから読み込み、
    /// 設定を解決する。
    ///
    /// 環境名は引数、`ENV` 環境変数、既定値 `stage` の順で決まる。
    /// 同一ファイルに対する再解決は常に同じ設定を返す。
    ///
    /// # Errors
    /// 対応する環境ファイルが存在しない、または読み取れない場合は
    /// [`ConfigError`] を返す。
    pub fn resolve(env_name: Option<&str>) -> Result<Self, ConfigError> {
        Self::resolve_from(Path::new("."), env_name)
    }

    /// [`Config::resolve`] のディレクトリ指定版。テストハーネスが一時
    /// ディレクトリ上の環境ファイルを使う場合に利用する。
    ///
    /// # Errors
    /// 対応する環境ファイルが存在しない、または読み取れない場合は
    /// [`ConfigError`] を返す。
    pub fn resolve_from(dir: &Path, env_name: Option<&str>) -> Result<Self, ConfigError> {
        let environment = env_name
            .map(str::to_string)
            .or_else(|| env::var("ENV").ok())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let env_file = dir.join(format!(".env.{environment}"));
        if !env_file.exists() {
            return Err(ConfigError::EnvFileNotFound(env_file));
        }

        let raw = fs::read_to_string(&env_file).map_err(|source| ConfigError::EnvFileUnreadable {
            path: env_file.clone(),
            source,
        })?;

        // Comments and blank lines never reach the configuration or the
        // forensic dump. Duplicate keys resolve last-one-wins.
        let pairs = parse_env_lines(&raw);
        let mut merged: HashMap<&str, &str> = HashMap::new();
        for (key, value) in &pairs {
            merged.insert(key, value);
        }

        // An already-set process variable wins over the file (dotenv semantics).
        let lookup = |key: &str| {
            env::var(key)
                .ok()
                .or_else(|| merged.get(key).map(|value| (*value).to_string()))
        };

        let redact_env_dump = lookup("HARNESS_REDACT_ENV")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let dump = pairs
            .iter()
            .map(|(key, value)| {
                if redact_env_dump {
                    format!("{key}={}", redact::mask(value))
                } else {
                    format!("{key}={value}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        info!(environment = %environment.to_uppercase(), "active environment");
        debug!(
            target: "forensic",
            environment = %environment,
            file = %env_file.display(),
            properties = %dump,
            "environment properties"
        );

        let base_url = lookup("BASE_URL");
        let timeout = lookup("TIMEOUT")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map_or(Duration::from_millis(DEFAULT_TIMEOUT_MS), Duration::from_millis);

        Ok(Self {
            environment,
            base_url,
            timeout,
            redact_env_dump,
        })
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// 必須のベースURL。未設定のままクライアント構築に渡すと失敗する。
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// フォレンジックログへの環境ダンプを伏せ字にするかどうか。
    #[must_use]
    pub fn redact_env_dump(&self) -> bool {
        self.redact_env_dump
    }

    #[cfg(test)]
    pub(crate) fn for_tests(base_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            environment: "test".to_string(),
            base_url: base_url.map(str::to_string),
            timeout,
            redact_env_dump: false,
        }
    }
}

/// `KEY=VALUE` 行をファイル出現順に抽出する。コメント行・空行・`=` を
/// 含まない行は捨てる。
fn parse_env_lines(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
