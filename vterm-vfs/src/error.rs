use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("path escapes root: {0}")]
    PathEscapesRoot(String),
    #[error("no such file: {0}")]
    FileNotFound(String),
    #[error("no such directory: {0}")]
    DirectoryNotFound(String),
    #[error("no such file or directory: {0}")]
    FileOrDirectoryNotFound(String),
    #[error("file already exists: {0}")]
    FileAlreadyExists(String),
    #[error("directory already exists: {0}")]
    DirectoryAlreadyExists(String),
    #[error("file or directory already exists: {0}")]
    FileOrDirectoryAlreadyExists(String),
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),
    #[error("directory is busy: {0}")]
    DirectoryIsBusy(String),
    #[error("cannot move {from} into itself: {to}")]
    MoveIntoItself { from: String, to: String },
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("wrong VFS file format: {0}")]
    FormatError(String),
    #[error("VFS not loaded")]
    NotLoaded,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VfsError {
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidPath(_) => "VFS_INVALID_PATH",
            Self::PathEscapesRoot(_) => "VFS_PATH_ESCAPES_ROOT",
            Self::FileNotFound(_) => "VFS_FILE_NOT_FOUND",
            Self::DirectoryNotFound(_) => "VFS_DIRECTORY_NOT_FOUND",
            Self::FileOrDirectoryNotFound(_) => "VFS_NOT_FOUND",
            Self::FileAlreadyExists(_) => "VFS_FILE_EXISTS",
            Self::DirectoryAlreadyExists(_) => "VFS_DIRECTORY_EXISTS",
            Self::FileOrDirectoryAlreadyExists(_) => "VFS_ALREADY_EXISTS",
            Self::DirectoryNotEmpty(_) => "VFS_NOT_EMPTY",
            Self::DirectoryIsBusy(_) => "VFS_BUSY",
            Self::MoveIntoItself { .. } => "VFS_MOVE_INTO_ITSELF",
            Self::LimitExceeded(_) => "VFS_LIMIT_EXCEEDED",
            Self::FormatError(_) => "VFS_FORMAT_ERROR",
            Self::NotLoaded => "VFS_NOT_LOADED",
            Self::Io(_) => "VFS_IO_ERROR",
            Self::Json(_) => "VFS_JSON_ERROR",
        }
    }

    pub fn to_json_rpc_error(&self) -> serde_json::Value {
        serde_json::json!({
            "vfsCode": self.code(),
            "message": self.to_string(),
        })
    }
}
