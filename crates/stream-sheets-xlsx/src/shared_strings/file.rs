//! Shared strings paged out to temporary files

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::error::{XlsxError, XlsxResult};

use super::strategy::CachingStrategy;

/// Stores shared strings in page files of a fixed number of strings each.
///
/// Only the last page read is kept in memory, so lookups of strings that are
/// close to each other stay cheap. Each string is written as its byte length
/// (`u32`, little endian) followed by its UTF-8 bytes.
#[derive(Debug)]
pub struct FileBasedStrategy {
    dir: Option<TempDir>,
    strings_per_page: usize,
    writer: Option<PageWriter>,
    count: usize,
    last_page: Mutex<Option<(usize, Vec<String>)>>,
}

#[derive(Debug)]
struct PageWriter {
    page: usize,
    file: BufWriter<File>,
}

impl PageWriter {
    fn finish(self) -> XlsxResult<()> {
        let file = self.file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }
}

impl FileBasedStrategy {
    /// Create a strategy with its own directory under `temp_dir`
    pub fn new(temp_dir: &Path, strings_per_page: usize) -> XlsxResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("stream-sheets-")
            .tempdir_in(temp_dir)?;
        log::debug!("Paging shared strings to {}", dir.path().display());

        Ok(Self {
            dir: Some(dir),
            strings_per_page: strings_per_page.max(1),
            writer: None,
            count: 0,
            last_page: Mutex::new(None),
        })
    }

    /// Directory holding the page files, until the cache is cleared
    pub fn directory(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    fn page_path(&self, page: usize) -> XlsxResult<PathBuf> {
        let dir = self.directory().ok_or_else(|| {
            XlsxError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "shared strings cache was cleared",
            ))
        })?;
        Ok(dir.join(format!("page-{}.bin", page)))
    }

    fn writer_for(&mut self, page: usize) -> XlsxResult<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(current) if current.page == page => self.writer.insert(current),
            previous => {
                if let Some(previous) = previous {
                    previous.finish()?;
                }
                let file = File::create(self.page_path(page)?)?;
                self.writer.insert(PageWriter {
                    page,
                    file: BufWriter::new(file),
                })
            }
        };
        Ok(&mut writer.file)
    }

    fn read_page(&self, page: usize) -> XlsxResult<Vec<String>> {
        let mut reader = BufReader::new(File::open(self.page_path(page)?)?);
        let mut strings = Vec::with_capacity(self.strings_per_page);
        let mut len_bytes = [0u8; 4];
        loop {
            match reader.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            let mut bytes = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
            reader.read_exact(&mut bytes)?;
            let value = String::from_utf8(bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            strings.push(value);
        }
        Ok(strings)
    }
}

impl CachingStrategy for FileBasedStrategy {
    fn name(&self) -> &'static str {
        "file-based"
    }

    fn add_string(&mut self, index: usize, value: String) -> XlsxResult<()> {
        // Strings arrive in index order; a gap would shift every later string in its page
        while self.count < index {
            self.add_string(self.count, String::new())?;
        }

        let page = index / self.strings_per_page;
        let len = u32::try_from(value.len()).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "shared string longer than 4 GiB",
            )
        })?;
        let writer = self.writer_for(page)?;
        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(value.as_bytes())?;
        self.count = self.count.max(index + 1);
        Ok(())
    }

    fn close_cache(&mut self) -> XlsxResult<()> {
        if let Some(writer) = self.writer.take() {
            writer.finish()?;
        }
        Ok(())
    }

    fn get(&self, index: usize) -> XlsxResult<String> {
        let not_found = || XlsxError::SharedStringNotFound {
            index: index as i64,
            count: self.count,
        };
        if index >= self.count {
            return Err(not_found());
        }

        let page = index / self.strings_per_page;
        let offset = index % self.strings_per_page;

        let mut last_page = self.last_page.lock().unwrap_or_else(|e| e.into_inner());
        if !matches!(&*last_page, Some((cached, _)) if *cached == page) {
            *last_page = Some((page, self.read_page(page)?));
        }
        last_page
            .as_ref()
            .and_then(|(_, strings)| strings.get(offset).cloned())
            .ok_or_else(not_found)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        self.writer = None;
        self.count = 0;
        *self.last_page.get_mut().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => log::debug!("Removed shared strings cache {}", path.display()),
                Err(e) => log::warn!(
                    "Failed to remove shared strings cache {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

impl Drop for FileBasedStrategy {
    fn drop(&mut self) {
        self.clear();
    }
}
