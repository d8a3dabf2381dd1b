use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;

/// Metadata for a single filesystem entry, tagged so clients can dispatch
/// on the `type` field without separate endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryStat {
    File {
        name: String,
        path: String,
        size: u64,
        mtime: DateTime<Utc>,
    },
    Directory {
        name: String,
        path: String,
        mtime: DateTime<Utc>,
    },
}

/// Stat `path` and translate the result into a descriptor or a classified
/// error. The blocking filesystem calls run on the blocking pool so a
/// stalled mount delays only its own request.
pub async fn resolve(path: PathBuf) -> Result<EntryStat, ApiError> {
    tokio::task::spawn_blocking(move || stat_entry(&path))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

fn stat_entry(path: &Path) -> Result<EntryStat, ApiError> {
    // fs::metadata follows symlinks; a link to a file or directory is
    // reported as its target.
    let meta = fs::metadata(path).map_err(|e| classify_stat(e, path))?;

    let display = path.display().to_string();
    let name = entry_name(path);
    let mtime = modified(&meta, &display)?;

    if meta.is_file() {
        // A stat can succeed while permission bits still block the open,
        // so probe read access and drop the handle without reading.
        fs::File::open(path).map_err(|e| classify_open(e, path))?;
        return Ok(EntryStat::File {
            name,
            path: display,
            size: meta.len(),
            mtime,
        });
    }
    if meta.is_dir() {
        return Ok(EntryStat::Directory {
            name,
            path: display,
            mtime,
        });
    }
    // Devices, sockets and fifos are outside this API's surface.
    Err(ApiError::NotFound { path: display })
}

fn classify_stat(err: std::io::Error, path: &Path) -> ApiError {
    let path = path.display().to_string();
    match err.kind() {
        ErrorKind::NotFound => ApiError::NotFound { path },
        ErrorKind::PermissionDenied => ApiError::Forbidden { path },
        _ => ApiError::Internal(err.to_string()),
    }
}

fn classify_open(err: std::io::Error, path: &Path) -> ApiError {
    match err.kind() {
        ErrorKind::PermissionDenied => ApiError::Forbidden {
            path: path.display().to_string(),
        },
        _ => ApiError::Internal(err.to_string()),
    }
}

fn modified(meta: &fs::Metadata, path: &str) -> Result<DateTime<Utc>, ApiError> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .map_err(|e| ApiError::Internal(format!("mtime of {path}: {e}")))
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn regular_file_reports_name_size_and_mtime() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("readme.txt");
        {
            let mut f = fs::File::create(&p).unwrap();
            f.write_all(&[0u8; 1024]).unwrap();
        }
        let expected_mtime = DateTime::<Utc>::from(fs::metadata(&p).unwrap().modified().unwrap());

        let entry = resolve(p.clone()).await.unwrap();
        match entry {
            EntryStat::File {
                name,
                path,
                size,
                mtime,
            } => {
                assert_eq!(name, "readme.txt");
                assert_eq!(path, p.display().to_string());
                assert_eq!(size, 1024);
                assert_eq!(mtime, expected_mtime);
            }
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn directory_has_no_size_field() {
        let tmp = tempfile::tempdir().unwrap();
        let entry = resolve(tmp.path().to_path_buf()).await.unwrap();
        assert!(matches!(entry, EntryStat::Directory { .. }));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "directory");
        assert!(json.get("size").is_none());
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("nope");
        match resolve(p.clone()).await {
            Err(ApiError::NotFound { path }) => assert_eq!(path, p.display().to_string()),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_file_is_forbidden_despite_clean_stat() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("secret");
        fs::write(&p, b"shh").unwrap();
        fs::set_permissions(&p, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to assert there.
        if fs::File::open(&p).is_ok() {
            return;
        }

        match resolve(p.clone()).await {
            Err(ApiError::Forbidden { path }) => assert_eq!(path, p.display().to_string()),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn socket_entry_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let sock = tmp.path().join("ctl.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&sock).unwrap();

        match resolve(sock.clone()).await {
            Err(ApiError::NotFound { path }) => assert_eq!(path, sock.display().to_string()),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_is_reported_as_its_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("data.bin");
        fs::write(&target, b"abc").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let entry = resolve(link.clone()).await.unwrap();
        match entry {
            EntryStat::File { name, size, .. } => {
                assert_eq!(name, "link");
                assert_eq!(size, 3);
            }
            other => panic!("expected file, got {other:?}"),
        }
    }
}
