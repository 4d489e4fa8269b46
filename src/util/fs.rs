/// ログ出力先のベストエフォートなクリーンアップ。
///
/// ここでの失敗は後続の処理を止めてはならないため、警告として記録する
/// だけで決して伝播させない。
use std::{fs, path::Path};

use tracing::{debug, warn};

/// ディレクトリ直下のファイルをすべて削除し、削除できた件数を返す。
/// サブディレクトリとその中身は対象外。ディレクトリが存在しない場合は
/// 警告のみで 0 を返す。
#[must_use]
pub fn clear_dir_files(dir: &Path) -> usize {
    debug!(target: "forensic", dir = %dir.display(), "clearing files");

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(target: "forensic", dir = %dir.display(), error = %e, "failed to list directory");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(target: "forensic", file = %path.display(), "deleted file");
                removed += 1;
            }
            Err(e) => {
                warn!(target: "forensic", file = %path.display(), error = %e, "failed to delete file");
            }
        }
    }
    removed
}

/// 単一ファイルを削除する。存在しない・消せない場合は警告のみ。
pub fn remove_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(target: "forensic", file = %path.display(), error = %e, "failed to delete file");
    } else {
        debug!(target: "forensic", file = %path.display(), "deleted file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_files_but_keeps_subdirectories() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.log"), "a").expect("write");
        fs::write(dir.path().join("b.log"), "b").expect("write");
        fs::create_dir(dir.path().join("keep")).expect("mkdir");
        fs::write(dir.path().join("keep").join("nested.log"), "n").expect("write");

        let removed = clear_dir_files(dir.path());

        assert_eq!(removed, 2);
        assert!(!dir.path().join("a.log").exists());
        assert!(!dir.path().join("b.log").exists());
        assert!(dir.path().join("keep").join("nested.log").exists());
    }

    #[test]
    fn missing_directory_is_contained() {
        assert_eq!(clear_dir_files(Path::new("/nonexistent/for/sure")), 0);
    }

    #[test]
    fn missing_file_is_contained() {
        remove_file(Path::new("/nonexistent/for/sure.log"));
    }
}
