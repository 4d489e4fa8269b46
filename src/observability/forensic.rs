/// フォレンジックチャネルの追記専用ファイルライター。
///
/// 記録は発行と同時にフラッシュされ、読み戻しも書き換えも行わないため、
/// 並行発行に対してはロック付き追記だけで十分となる。
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone)]
pub(crate) struct ForensicWriter {
    file: Arc<Mutex<File>>,
}

impl ForensicWriter {
    /// 出力先を追記モードで開く。親ディレクトリがなければ作成する。
    pub(crate) fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl Write for ForensicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.flush()
    }
}

impl<'a> MakeWriter<'a> for ForensicWriter {
    type Writer = ForensicWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deep").join("audit.log");

        let writer = ForensicWriter::open(&path).expect("open");
        drop(writer);

        assert!(path.exists());
    }

    #[test]
    fn writes_append_in_emission_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.log");

        let mut first = ForensicWriter::open(&path).expect("open");
        first.write_all(b"first\n").expect("write");
        first.flush().expect("flush");

        let mut second = ForensicWriter::open(&path).expect("reopen");
        second.write_all(b"second\n").expect("write");
        second.flush().expect("flush");

        let content = fs::read_to_string(&path).expect("read back");
        assert_eq!(content, "first\nsecond\n");
    }
}
