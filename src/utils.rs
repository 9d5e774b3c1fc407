//! Utility functions for file naming and path manipulation

use crate::remote::{Media, MediaKind};
use std::path::{Component, Path, PathBuf};

/// Name of the file-backed checkpoint inside a session/channel directory
pub const CHECKPOINT_FILE_NAME: &str = "last_message_id.txt";

/// Extension implied by a MIME type: the part after the first `/`
///
/// ```
/// use channel_dl::utils::mime_extension;
///
/// assert_eq!(mime_extension("video/mp4"), Some("mp4"));
/// assert_eq!(mime_extension("application/x-tar"), Some("x-tar"));
/// assert_eq!(mime_extension("binary"), None);
/// ```
pub fn mime_extension(mime_type: &str) -> Option<&str> {
    mime_type.split('/').nth(1).filter(|ext| !ext.is_empty())
}

/// File name for a media attachment
///
/// The declared name wins. Otherwise photos become `photo_<id>.jpg` and
/// documents `file_<id>` plus the extension implied by their MIME type.
pub fn media_filename(message_id: i64, media: &Media) -> String {
    if let Some(name) = media
        .attributes
        .file_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
    {
        return name.to_string();
    }

    match media.kind {
        MediaKind::Photo => format!("photo_{}.jpg", message_id),
        MediaKind::Document | MediaKind::Other => {
            match media.mime_type.as_deref().and_then(mime_extension) {
                Some(ext) => format!("file_{}.{}", message_id, ext),
                None => format!("file_{}", message_id),
            }
        }
    }
}

/// MIME type to report for a media attachment
///
/// Photos without a declared type are JPEG.
pub fn media_mime_type(media: &Media) -> Option<String> {
    match (&media.mime_type, media.kind) {
        (Some(mime), _) => Some(mime.clone()),
        (None, MediaKind::Photo) => Some("image/jpeg".to_string()),
        (None, _) => None,
    }
}

/// Whether `name` is exactly one ordinary path component
///
/// Rejects empty names, `.`/`..`, absolute paths and anything containing a separator.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Directory name for a session id
///
/// Percent-encodes everything but `A-Za-z0-9-_.~`, so distinct ids never share
/// a directory. The empty id and ids made only of dots, which would not be a
/// normal path component, get spellings the encoder itself never produces.
fn session_dir_name(session_id: &str) -> String {
    if session_id.is_empty() {
        return "%".to_string();
    }
    if session_id.chars().all(|c| c == '.') {
        return "%2E".repeat(session_id.len());
    }
    urlencoding::encode(session_id).into_owned()
}

/// Directory holding one session's files for one channel
///
/// `<root>/<session_id>/<abs(channel_id)>`. The checkpoint file lives here too.
pub fn session_channel_dir(root: &Path, session_id: &str, channel_id: i64) -> PathBuf {
    root.join(session_dir_name(session_id))
        .join(channel_id.unsigned_abs().to_string())
}

/// URL a job's downloaded file is served under
///
/// ```
/// use channel_dl::utils::retrieval_url;
///
/// assert_eq!(
///     retrieval_url("/api/v1/jobs/", "abc", "my file.pdf"),
///     "/api/v1/jobs/abc/files/my%20file.pdf"
/// );
/// ```
pub fn retrieval_url(prefix: &str, job_id: &str, filename: &str) -> String {
    format!(
        "{}/{}/files/{}",
        prefix.trim_end_matches('/'),
        job_id,
        urlencoding::encode(filename)
    )
}

/// Size of a file on disk, 0 when it cannot be read
pub async fn file_size(path: &Path) -> u64 {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.len())
        .unwrap_or(0)
}

/// Final path component as a string
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MediaAttributes;

    fn document(name: Option<&str>, mime: Option<&str>) -> Media {
        Media {
            kind: MediaKind::Document,
            size_bytes: 1,
            mime_type: mime.map(String::from),
            attributes: MediaAttributes {
                file_name: name.map(String::from),
                is_video: false,
            },
        }
    }

    #[test]
    fn declared_name_is_kept() {
        let media = document(Some("report.pdf"), Some("application/pdf"));
        assert_eq!(media_filename(42, &media), "report.pdf");
    }

    #[test]
    fn document_name_is_synthesized_from_mime() {
        assert_eq!(
            media_filename(7, &document(None, Some("video/mp4"))),
            "file_7.mp4"
        );
        assert_eq!(media_filename(7, &document(None, None)), "file_7");
        assert_eq!(media_filename(7, &document(Some("  "), None)), "file_7");
    }

    #[test]
    fn unnamed_photo_is_jpeg() {
        let photo = Media {
            kind: MediaKind::Photo,
            size_bytes: 1,
            mime_type: None,
            attributes: MediaAttributes::default(),
        };
        assert_eq!(media_filename(9, &photo), "photo_9.jpg");
        assert_eq!(media_mime_type(&photo).as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("video.mp4"));
        assert!(is_plain_file_name("..hidden"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("."));
        assert!(!is_plain_file_name("../etc/passwd"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("a\\b"));
    }

    #[test]
    fn channel_dir_uses_absolute_channel_id() {
        let dir = session_channel_dir(Path::new("/dl"), "sess", -1001234);
        assert_eq!(dir, PathBuf::from("/dl/sess/1001234"));
    }

    #[test]
    fn channel_dir_encodes_session_segment() {
        let dir = session_channel_dir(Path::new("/dl"), "../x", 5);
        assert_eq!(dir, PathBuf::from("/dl/..%2Fx/5"));

        let dots = session_channel_dir(Path::new("/dl"), "..", 5);
        assert_eq!(dots, PathBuf::from("/dl/%2E%2E/5"));

        let empty = session_channel_dir(Path::new("/dl"), "", 5);
        assert_eq!(empty, PathBuf::from("/dl/%/5"));
    }

    #[test]
    fn distinct_sessions_get_distinct_dirs() {
        let ids = ["a/b", "a_b", "a%2Fb", "a b", "a+b", ".", "%2E", "", "%"];
        let dirs: std::collections::HashSet<PathBuf> = ids
            .iter()
            .map(|id| session_channel_dir(Path::new("/dl"), id, 5))
            .collect();
        assert_eq!(dirs.len(), ids.len());
    }

    #[test]
    fn retrieval_url_encodes_filename() {
        assert_eq!(
            retrieval_url("/api/v1/jobs", "j1", "a#b?.txt"),
            "/api/v1/jobs/j1/files/a%23b%3F.txt"
        );
    }
}
