use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file {0:?} not found")]
    NotFound(PathBuf),
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file system does not support writing {0:?}")]
    ReadOnly(PathBuf),
}

/// Readable byte stream.
pub trait ReadFile {
    /// Reads up to `buffer.len()` bytes, returning how many were read.
    fn read(&mut self, buffer: &mut [u8]) -> usize;

    /// Moves the cursor to `pos`, or by `pos` when `relative`. Positions
    /// outside `0..=size` are rejected with `false`.
    fn seek(&mut self, pos: i64, relative: bool) -> bool;

    fn size(&self) -> u64;

    fn pos(&self) -> u64;

    fn file_name(&self) -> &Path;

    /// Remaining bytes from the current position.
    fn read_to_end(&mut self) -> Result<Vec<u8>, FileError> {
        let remaining = self.size().saturating_sub(self.pos()) as usize;
        let mut bytes = vec![0; remaining];
        let mut filled = 0;
        while filled < remaining {
            let n = self.read(&mut bytes[filled..]);
            if n == 0 {
                break;
            }
            filled += n;
        }
        bytes.truncate(filled);
        Ok(bytes)
    }
}

pub trait WriteFile {
    fn write(&mut self, data: &[u8]) -> usize;

    fn seek(&mut self, pos: i64, relative: bool) -> bool;

    fn pos(&self) -> u64;

    fn file_name(&self) -> &Path;
}

pub trait FileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadFile>, FileError>;

    fn open_write(&self, path: &Path, append: bool) -> Result<Box<dyn WriteFile>, FileError>;

    fn exists(&self, path: &Path) -> bool;
}

fn target_position(current: u64, size: u64, pos: i64, relative: bool) -> Option<u64> {
    let target = if relative {
        i64::try_from(current).ok()?.checked_add(pos)?
    } else {
        pos
    };
    u64::try_from(target).ok().filter(|t| *t <= size)
}

/// Files on the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadFile>, FileError> {
        let file = File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FileError::NotFound(path.to_path_buf())
            } else {
                FileError::Open {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let size = file
            .metadata()
            .map_err(|source| FileError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        Ok(Box::new(NativeReadFile {
            file,
            path: path.to_path_buf(),
            size,
            pos: 0,
        }))
    }

    fn open_write(&self, path: &Path, append: bool) -> Result<Box<dyn WriteFile>, FileError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if append {
            options.append(true);
        } else {
            options.truncate(true);
        }
        let file = options.open(path).map_err(|source| FileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let pos = if append {
            file.metadata().map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };
        Ok(Box::new(NativeWriteFile {
            file,
            path: path.to_path_buf(),
            pos,
        }))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

struct NativeReadFile {
    file: File,
    path: PathBuf,
    size: u64,
    pos: u64,
}

impl ReadFile for NativeReadFile {
    fn read(&mut self, buffer: &mut [u8]) -> usize {
        match self.file.read(buffer) {
            Ok(n) => {
                self.pos += n as u64;
                n
            }
            Err(err) => {
                log::warn!("Read from {:?} failed: {}", self.path, err);
                0
            }
        }
    }

    fn seek(&mut self, pos: i64, relative: bool) -> bool {
        let Some(target) = target_position(self.pos, self.size, pos, relative) else {
            return false;
        };
        match self.file.seek(SeekFrom::Start(target)) {
            Ok(p) => {
                self.pos = p;
                true
            }
            Err(err) => {
                log::warn!("Seek in {:?} failed: {}", self.path, err);
                false
            }
        }
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn file_name(&self) -> &Path {
        &self.path
    }
}

struct NativeWriteFile {
    file: File,
    path: PathBuf,
    pos: u64,
}

impl WriteFile for NativeWriteFile {
    fn write(&mut self, data: &[u8]) -> usize {
        match self.file.write(data) {
            Ok(n) => {
                self.pos += n as u64;
                n
            }
            Err(err) => {
                log::warn!("Write to {:?} failed: {}", self.path, err);
                0
            }
        }
    }

    fn seek(&mut self, pos: i64, relative: bool) -> bool {
        let from = if relative {
            SeekFrom::Current(pos)
        } else if pos >= 0 {
            SeekFrom::Start(pos as u64)
        } else {
            return false;
        };
        match self.file.seek(from) {
            Ok(p) => {
                self.pos = p;
                true
            }
            Err(_) => false,
        }
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn file_name(&self) -> &Path {
        &self.path
    }
}

/// Read-only byte stream over an owned buffer.
#[derive(Debug, Clone)]
pub struct MemoryReadFile {
    name: PathBuf,
    data: Vec<u8>,
    pos: u64,
}

impl MemoryReadFile {
    pub fn new(name: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            pos: 0,
        }
    }
}

impl ReadFile for MemoryReadFile {
    fn read(&mut self, buffer: &mut [u8]) -> usize {
        let start = self.pos as usize;
        let n = buffer.len().min(self.data.len().saturating_sub(start));
        buffer[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        n
    }

    fn seek(&mut self, pos: i64, relative: bool) -> bool {
        match target_position(self.pos, self.size(), pos, relative) {
            Some(target) => {
                self.pos = target;
                true
            }
            None => false,
        }
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn file_name(&self) -> &Path {
        &self.name
    }
}

/// In-memory file table, used for embedded assets and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, data: Vec<u8>) {
        self.files.insert(path.into(), data);
    }
}

impl FileSystem for MemoryFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadFile>, FileError> {
        self.files
            .get(path)
            .map(|data| Box::new(MemoryReadFile::new(path, data.clone())) as Box<dyn ReadFile>)
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    fn open_write(&self, path: &Path, _append: bool) -> Result<Box<dyn WriteFile>, FileError> {
        Err(FileError::ReadOnly(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

pub fn load_binary(fs: &dyn FileSystem, path: &Path) -> Result<Vec<u8>, FileError> {
    let mut file = fs.open_read(path)?;
    file.read_to_end()
}
