use crate::error::LocateError;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use stubgen_classfile::CompiledModule;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Finds compiled classes and the resources stored next to them.
///
/// Types are named by binary name (`a.b.Outer$Inner`); resources by
/// slash-separated path relative to the root of the search path.
pub trait ClassLocator: Send + Sync {
    /// Raw bytes of a resource, `None` when it does not exist.
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError>;

    fn resolve(&self, binary_name: &str) -> Result<CompiledModule, LocateError> {
        let path = class_file_path(binary_name);
        let bytes = self
            .resource(&path)?
            .ok_or_else(|| LocateError::NotFound(binary_name.to_string()))?;
        CompiledModule::parse(&bytes).map_err(|source| LocateError::ClassFile {
            name: binary_name.to_string(),
            source,
        })
    }
}

impl<L: ClassLocator + ?Sized> ClassLocator for Box<L> {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        (**self).resource(path)
    }

    fn resolve(&self, binary_name: &str) -> Result<CompiledModule, LocateError> {
        (**self).resolve(binary_name)
    }
}

impl<L: ClassLocator + ?Sized> ClassLocator for std::sync::Arc<L> {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        (**self).resource(path)
    }

    fn resolve(&self, binary_name: &str) -> Result<CompiledModule, LocateError> {
        (**self).resolve(binary_name)
    }
}

/// `a.b.Outer$Inner` -> `a/b/Outer$Inner.class`
pub fn class_file_path(binary_name: &str) -> String {
    format!("{}.class", binary_name.replace('.', "/"))
}

/// A directory of compiled classes laid out by package.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    root: PathBuf,
}

impl DirectoryLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassLocator for DirectoryLocator {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        let full = self.root.join(path);
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LocateError::Io { path: full, source }),
        }
    }
}

/// A jar or zip archive; the archive stays open for the locator's lifetime.
pub struct ArchiveLocator {
    path: PathBuf,
    archive: Mutex<ZipArchive<BufReader<File>>>,
}

impl ArchiveLocator {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LocateError> {
        let path = path.into();
        let file = File::open(&path).map_err(|source| LocateError::Io {
            path: path.clone(),
            source,
        })?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|source| LocateError::Zip {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            archive: Mutex::new(archive),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClassLocator for ArchiveLocator {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = match archive.by_name(path) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(source) => {
                return Err(LocateError::Zip {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let mut buffer = Vec::new();
        entry
            .read_to_end(&mut buffer)
            .map_err(|source| LocateError::Io {
                path: archive_entry_path(&self.path, path),
                source,
            })?;
        Ok(Some(buffer))
    }
}

fn archive_entry_path(archive: &Path, entry: &str) -> PathBuf {
    let mut display = archive.display().to_string();
    display.push('!');
    display.push('/');
    display.push_str(entry);
    PathBuf::from(display)
}

/// Ordered search path; the first entry that has a resource wins.
#[derive(Default)]
pub struct ClasspathLocator {
    entries: Vec<Box<dyn ClassLocator>>,
}

impl ClasspathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a search path from directories and archives. Entries may hold
    /// several paths joined by the platform separator; missing paths are
    /// skipped.
    pub fn from_paths<I, S>(raw: I) -> Result<Self, LocateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut locator = Self::new();
        for path in expand_classpath(raw) {
            if path.is_dir() {
                locator.push(DirectoryLocator::new(path));
            } else if is_archive(&path) && path.is_file() {
                locator.push(ArchiveLocator::open(path)?);
            } else {
                debug!(path = %path.display(), "skipping classpath entry");
            }
        }
        Ok(locator)
    }

    pub fn push(&mut self, entry: impl ClassLocator + 'static) {
        self.entries.push(Box::new(entry));
    }

    pub fn with_entry(mut self, entry: impl ClassLocator + 'static) -> Self {
        self.push(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClassLocator for ClasspathLocator {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        for entry in &self.entries {
            if let Some(bytes) = entry.resource(path)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

fn expand_classpath<I, S>(raw: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let separator = if cfg!(windows) { ';' } else { ':' };
    raw.into_iter()
        .flat_map(|entry| {
            entry
                .as_ref()
                .split(separator)
                .filter(|part| !part.trim().is_empty())
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Classes and resources held in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryLocator {
    resources: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_class(&self, binary_name: &str, bytes: Vec<u8>) {
        self.insert_resource(class_file_path(binary_name), bytes);
    }

    pub fn insert_resource(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), bytes);
    }

    pub fn with_class(self, binary_name: &str, bytes: Vec<u8>) -> Self {
        self.insert_class(binary_name, bytes);
        self
    }
}

impl ClassLocator for InMemoryLocator {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        Ok(resources.get(path).cloned())
    }
}

/// Asks `primary` first and `alternate` only for what `primary` lacks.
///
/// This is where a resolution strategy that does not read class files
/// plugs in.
pub struct FallbackLocator<P, A> {
    primary: P,
    alternate: A,
}

impl<P: ClassLocator, A: ClassLocator> FallbackLocator<P, A> {
    pub fn new(primary: P, alternate: A) -> Self {
        Self { primary, alternate }
    }
}

impl<P: ClassLocator, A: ClassLocator> ClassLocator for FallbackLocator<P, A> {
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>, LocateError> {
        match self.primary.resource(path)? {
            Some(bytes) => Ok(Some(bytes)),
            None => self.alternate.resource(path),
        }
    }

    fn resolve(&self, binary_name: &str) -> Result<CompiledModule, LocateError> {
        match self.primary.resolve(binary_name) {
            Err(LocateError::NotFound(_)) => {
                debug!(type_name = binary_name, "falling back to alternate locator");
                self.alternate.resolve(binary_name)
            }
            other => other,
        }
    }
}
