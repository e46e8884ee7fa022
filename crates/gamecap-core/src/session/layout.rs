//! On-disk session layout and its marker-file status ledger.
//!
//! ```text
//! <root>/<target-stem>/<unix-millis>[-N]/
//!     inputs.csv
//!     metadata.json
//!     .invalid      (optional, too short to keep)
//!     .uploaded     (optional, written by the uploader)
//! ```

use crate::{CoreError, CoreResult};

use std::{
    fs,
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use error_location::ErrorLocation;
use tracing::{debug, info};

/// Event log file name.
pub const LOG_FILE: &str = "inputs.csv";
/// Metadata file name.
pub const METADATA_FILE: &str = "metadata.json";
/// Marker for sessions excluded from upload.
pub const INVALID_MARKER: &str = ".invalid";
/// Marker for sessions already uploaded.
pub const UPLOADED_MARKER: &str = ".uploaded";

/// Collision suffixes tried before giving up on a directory name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Lowercased executable name up to the first `.`, safe as a path segment.
pub fn target_stem(exe: &str) -> String {
    let stem: String = exe
        .split('.')
        .next()
        .unwrap_or(exe)
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect::<String>()
        .to_lowercase();

    if stem.is_empty() {
        "unknown".to_string()
    } else {
        stem
    }
}

/// One session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    path: PathBuf,
}

impl SessionDir {
    /// Create a fresh, uniquely named directory for `target_exe` under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Session`] if no directory could be created.
    #[track_caller]
    pub fn allocate(root: &Path, target_exe: &str) -> CoreResult<Self> {
        let parent = root.join(target_stem(target_exe));
        fs::create_dir_all(&parent).map_err(|e| CoreError::Session {
            reason: format!("Failed to create {}: {}", parent.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                millis.to_string()
            } else {
                format!("{millis}-{attempt}")
            };
            let path = parent.join(name);

            match fs::create_dir(&path) {
                Ok(()) => {
                    debug!(path = ?path, "Session directory allocated");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(CoreError::Session {
                        reason: format!("Failed to create {}: {}", path.display(), e),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }

        Err(CoreError::Session {
            reason: format!("No free session name under {}", parent.display()),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Wrap an existing directory.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The directory itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the event log lives.
    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }

    /// Where the metadata lives.
    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }

    /// Exclude this session from upload without deleting it.
    #[track_caller]
    pub fn mark_invalid(&self) -> CoreResult<()> {
        self.touch(INVALID_MARKER)?;
        info!(path = ?self.path, "Session marked invalid");
        Ok(())
    }

    /// Record that this session has been uploaded.
    #[track_caller]
    pub fn mark_uploaded(&self) -> CoreResult<()> {
        self.touch(UPLOADED_MARKER)
    }

    /// Whether the invalid marker exists.
    pub fn is_invalid(&self) -> bool {
        self.path.join(INVALID_MARKER).exists()
    }

    /// Whether the uploaded marker exists.
    pub fn is_uploaded(&self) -> bool {
        self.path.join(UPLOADED_MARKER).exists()
    }

    /// Complete, unmarked sessions are waiting for upload.
    pub fn is_upload_eligible(&self) -> bool {
        self.log_path().is_file()
            && self.metadata_path().is_file()
            && !self.is_invalid()
            && !self.is_uploaded()
    }

    /// Every upload-eligible session under `root`, sorted by path.
    ///
    /// A missing `root` yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if `root` exists but cannot be read.
    #[track_caller]
    pub fn scan(root: &Path) -> CoreResult<Vec<SessionDir>> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for target in fs::read_dir(root)? {
            let target = target?.path();
            if !target.is_dir() {
                continue;
            }
            for session in fs::read_dir(&target)? {
                let session = SessionDir::open(session?.path());
                if session.path.is_dir() && session.is_upload_eligible() {
                    sessions.push(session);
                }
            }
        }

        sessions.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(sessions)
    }

    #[track_caller]
    fn touch(&self, marker: &str) -> CoreResult<()> {
        let path = self.path.join(marker);
        fs::File::create(&path).map_err(|e| CoreError::Session {
            reason: format!("Failed to create {}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(())
    }
}
