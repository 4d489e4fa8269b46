pub(crate) mod forensic;

use std::path::Path;

use anyhow::{Context, Error, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use self::forensic::ForensicWriter;

/// フォレンジックチャネルへ記録をルーティングするイベントターゲット。
/// チャネル選択は必ずこのタグで行い、内容の検査では行わない。
pub const FORENSIC_TARGET: &str = "forensic";

/// フォレンジックログの固定出力先（作業ディレクトリ相対）。
pub const FORENSIC_LOG_PATH: &str = "logs/forensic.log";

static LOGGING_INIT: OnceCell<()> = OnceCell::new();

/// ログシンクを一度だけ初期化する。
///
/// 2つの独立したチャネルを構成する:
/// - operator: stdout、info以上、フォレンジックタグ付きイベントは除外。
/// - forensic: 追記専用ファイル、trace以上、全イベントをJSONで捕捉。
///
/// # Errors
/// フォレンジックログファイルが開けない場合、またはサブスクライバの
/// 登録に失敗した場合はエラーを返す。
pub fn init() -> Result<()> {
    init_at(Path::new(FORENSIC_LOG_PATH))
}

/// [`init`] の出力先指定版。2回目以降の呼び出しは何もしない。
///
/// # Errors
/// フォレンジックログファイルが開けない場合、またはサブスクライバの
/// 登録に失敗した場合はエラーを返す。
pub fn init_at(path: &Path) -> Result<()> {
    LOGGING_INIT.get_or_try_init(|| {
        let writer = ForensicWriter::open(path)
            .with_context(|| format!("failed to open forensic log at {}", path.display()))?;

        let operator_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let operator_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(filter::filter_fn(|meta| meta.target() != FORENSIC_TARGET))
            .with_filter(operator_filter);

        let forensic_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(filter::LevelFilter::TRACE);

        tracing_subscriber::registry()
            .with(operator_layer)
            .with(forensic_layer)
            .try_init()
            .map_err(|e| Error::msg(e.to_string()))?;

        Ok::<(), Error>(())
    })?;
    Ok(())
}
