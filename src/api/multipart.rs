//! Minimal multipart/form-data encoder for the purchase-entry upload. One
//! text part carries the entry JSON, one `files` part per DC attachment.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{DeskError, Result};

/// Attachments over this size are rejected before any network traffic.
pub const MAX_ATTACHMENT_MB: u64 = 5;

pub struct Multipart {
    boundary: String,
    buf: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Multipart {
            boundary: format!("----poultrydesk-{nanos:x}"),
            buf: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a plain text field.
    pub fn text(&mut self, name: &str, value: &str) {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                self.boundary, name
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Append a file field, enforcing the attachment size limit.
    pub fn file(&mut self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(DeskError::AttachmentNotFound(path.to_path_buf()));
        }

        let size = std::fs::metadata(path)?.len();
        let limit = MAX_ATTACHMENT_MB * 1024 * 1024;
        if size > limit {
            return Err(DeskError::AttachmentTooLarge {
                path: path.to_path_buf(),
                size_mb: size as f64 / (1024.0 * 1024.0),
                limit_mb: MAX_ATTACHMENT_MB,
            });
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content = std::fs::read(path)?;

        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary,
                name,
                filename,
                content_type_for(path)
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(&content);
        self.buf.extend_from_slice(b"\r\n");
        Ok(())
    }

    /// Close the body. Returns the Content-Type header value and the bytes.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.buf,
        )
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

// The backend accepts DC scans as pdf or images.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn body_is_well_formed() {
        let mut body = Multipart::new();
        body.text("purchaseEntry", "{\"entryDate\":\"2024-01-05\"}");
        let boundary = body.boundary().to_string();
        let (content_type, bytes) = body.finish();

        assert_eq!(
            content_type,
            format!("multipart/form-data; boundary={boundary}")
        );
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("Content-Disposition: form-data; name=\"purchaseEntry\""));
        assert!(text.contains("{\"entryDate\":\"2024-01-05\"}"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn file_part_carries_filename_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dc-note.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();

        let mut body = Multipart::new();
        body.file("files", &path).unwrap();
        let (_, bytes) = body.finish();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("filename=\"dc-note.pdf\""));
        assert!(text.contains("Content-Type: application/pdf"));
    }

    #[test]
    fn oversized_attachment_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(6 * 1024 * 1024).unwrap();

        let mut body = Multipart::new();
        let err = body.file("files", &path).unwrap_err();
        assert!(matches!(err, DeskError::AttachmentTooLarge { .. }));
    }

    #[test]
    fn missing_attachment_is_rejected() {
        let mut body = Multipart::new();
        let err = body
            .file("files", Path::new("/nonexistent/dc.png"))
            .unwrap_err();
        assert!(matches!(err, DeskError::AttachmentNotFound(_)));
    }
}
