/// 環境ダンプ用の値マスキング。先頭4文字だけ残して伏せる。
pub(crate) fn mask(value: &str) -> String {
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        let head: String = value.chars().take(4).collect();
        format!("{head}***")
    }
}
