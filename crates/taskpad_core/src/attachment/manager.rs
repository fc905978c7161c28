//! Attachment ports and manager.

use crate::capability::PortResult;
use crate::model::task::TaskId;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

const TASKS_DIR_NAME: &str = "tasks";
const FILE_SCHEME: &str = "file://";

/// Strips an optional `file://` scheme and any query/fragment suffix.
static SOURCE_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:file://)?(?P<path>[^?#]*)").expect("valid source uri regex"));

/// Document chosen through the host picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub uri: String,
    /// Size in bytes when the host could determine it.
    pub size: Option<u64>,
}

/// Host document picker. `Ok(None)` means the user dismissed it.
pub trait FilePickerPort {
    fn pick(&self) -> PortResult<Option<FileDescriptor>>;
}

/// File-system capability used for attachment copies.
pub trait FileSystemPort {
    /// Creates `path` and missing parents; succeeds when it already exists.
    fn make_directory(&self, path: &Path) -> io::Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
    /// True when both paths resolve to the same existing file.
    fn is_same_file(&self, a: &Path, b: &Path) -> bool;
}

/// [`FileSystemPort`] over the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystemPort for LocalFileSystem {
    fn make_directory(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn is_same_file(&self, a: &Path, b: &Path) -> bool {
        match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Attachment copy failure.
#[derive(Debug)]
pub enum AttachmentError {
    /// Source URI has no usable file name.
    InvalidSource(String),
    Io { path: PathBuf, source: io::Error },
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSource(uri) => write!(f, "attachment source has no file name: `{uri}`"),
            Self::Io { path, source } => {
                write!(f, "attachment i/o failed at `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for AttachmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSource(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Copies picked documents into task-scoped directories.
pub struct AttachmentManager {
    documents_root: PathBuf,
    fs: Box<dyn FileSystemPort>,
    picker: Box<dyn FilePickerPort>,
}

impl AttachmentManager {
    pub fn new(
        documents_root: impl Into<PathBuf>,
        fs: Box<dyn FileSystemPort>,
        picker: Box<dyn FilePickerPort>,
    ) -> Self {
        Self {
            documents_root: documents_root.into(),
            fs,
            picker,
        }
    }

    /// Manager over the local file system.
    pub fn local(documents_root: impl Into<PathBuf>, picker: Box<dyn FilePickerPort>) -> Self {
        Self::new(documents_root, Box::new(LocalFileSystem), picker)
    }

    pub fn documents_root(&self) -> &Path {
        &self.documents_root
    }

    /// Deterministic directory for one task: `<documents>/tasks/<task_id>`.
    pub fn task_directory(&self, task_id: TaskId) -> PathBuf {
        self.documents_root
            .join(TASKS_DIR_NAME)
            .join(task_id.to_string())
    }

    /// Delegates to the picker port.
    pub fn pick_source(&self) -> PortResult<Option<FileDescriptor>> {
        self.picker.pick()
    }

    /// Copies `source_uri` into the task directory and returns the new path.
    ///
    /// An existing file with the same name is overwritten. A source that
    /// already is the task-scoped copy is left as is.
    pub fn persist_to_task(
        &self,
        task_id: TaskId,
        source_uri: &str,
    ) -> Result<PathBuf, AttachmentError> {
        let file_name = source_file_name(source_uri)
            .ok_or_else(|| AttachmentError::InvalidSource(source_uri.to_string()))?;
        let source_file = source_path(source_uri);
        let directory = self.task_directory(task_id);

        self.fs
            .make_directory(&directory)
            .map_err(|source| self.io_failure(task_id, &directory, source))?;

        let destination = directory.join(file_name);
        if self.fs.is_same_file(&source_file, &destination) {
            info!("event=attachment_copy module=attachment status=skipped reason=already_in_place task_id={task_id}");
            return Ok(destination);
        }
        self.fs
            .copy(&source_file, &destination)
            .map_err(|source| self.io_failure(task_id, &destination, source))?;

        info!("event=attachment_copy module=attachment status=ok task_id={task_id}");
        Ok(destination)
    }

    fn io_failure(&self, task_id: TaskId, path: &Path, source: io::Error) -> AttachmentError {
        error!(
            "event=attachment_copy module=attachment status=error task_id={task_id} error_code=io_failed error={source}"
        );
        AttachmentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Local path part of a source URI.
fn source_path(uri: &str) -> PathBuf {
    PathBuf::from(uri_path(uri).into_owned())
}

/// Last path segment of a source URI, if it names a file.
pub fn source_file_name(uri: &str) -> Option<String> {
    let path = uri_path(uri);
    let name = path.rsplit('/').next()?;
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// `file://` URIs are percent-decoded; plain paths are taken verbatim.
fn uri_path(uri: &str) -> Cow<'_, str> {
    let path = SOURCE_URI_RE
        .captures(uri)
        .and_then(|caps| caps.name("path"))
        .map_or(uri, |m| m.as_str());
    if uri.starts_with(FILE_SCHEME) {
        urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
    } else {
        Cow::Borrowed(path)
    }
}
