//! File store - page I/O against a single index file.
//!
//! The [`FileStore`] handles all direct file operations:
//! - Reading and writing pages at byte offsets
//! - Tracking the file extent
//! - Creating, opening or truncating the index file

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::config::PAGE_SIZE;
use crate::common::{Result, TreeConfig};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// Page storage backed by one file.
///
/// # File Layout
/// The index is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (root)  │ (752 B) │ (752 B) │         │ (752 B) │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0       752     1504    ...     N×752
/// ```
///
/// # File Handle
/// One `File` is opened when the store is created and kept until it is
/// dropped, instead of reopening the file for every page.
///
/// # Thread Safety
/// `FileStore` is **single-threaded**. [`SharedBTree`](crate::SharedBTree)
/// is responsible for serializing access.
pub struct FileStore {
    file: File,
    path: PathBuf,
    /// Size of the file in bytes.
    len: u64,
    /// `fsync()` after every page write.
    sync_on_write: bool,
}

impl FileStore {
    /// Create a new index file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        Ok(Self {
            file,
            path: path.as_ref().to_path_buf(),
            len: 0,
            sync_on_write: false,
        })
    }

    /// Open an existing index file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::from_file(file, path.as_ref(), false)
    }

    /// Open an existing index file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &TreeConfig::default())
    }

    /// Open or create the file as `config` describes.
    ///
    /// With `truncate_existing` set, any content already at `path` is
    /// discarded.
    pub fn open_with<P: AsRef<Path>>(path: P, config: &TreeConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(config.truncate_existing)
            .open(&path)?;
        Self::from_file(file, path.as_ref(), config.sync_on_write)
    }

    fn from_file(file: File, path: &Path, sync_on_write: bool) -> Result<Self> {
        let len = file.metadata()?.len();
        if len % PAGE_SIZE as u64 != 0 {
            tracing::warn!(
                path = %path.display(),
                len,
                "index file length is not a whole number of pages"
            );
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            len,
            sync_on_write,
        })
    }

    /// Enable or disable `fsync()` after each write.
    pub fn set_sync_on_write(&mut self, sync: bool) {
        self.sync_on_write = sync;
    }

    /// Path of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of whole pages in the file.
    #[inline]
    pub fn page_count(&self) -> u64 {
        self.len / PAGE_SIZE as u64
    }
}

impl PageStore for FileStore {
    fn read_page(&mut self, offset: u64, page: &mut Page) -> Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;

        let buf = page.as_mut_slice();
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn write_page(&mut self, offset: u64, page: &Page) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;
        if self.sync_on_write {
            self.file.sync_all()?;
        }

        self.len = self.len.max(offset + PAGE_SIZE as u64);
        Ok(())
    }

    #[inline]
    fn extent(&self) -> u64 {
        self.len
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
