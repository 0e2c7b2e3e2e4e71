//! Multipart form reading

use actix_multipart::Multipart;
use futures::StreamExt;
use std::collections::HashMap;

use crate::core::uploads::UploadedFile;
use crate::errors::ApiError;

/// A fully buffered multipart form: text fields plus file parts
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Drain the payload. The total size of all parts is capped at `max_size`.
    pub async fn read(mut payload: Multipart, max_size: usize) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        let mut total = 0usize;

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|_| ApiError::validation("Malformed form data"))?;

            let disp = field.content_disposition().clone();
            let name = disp.get_name().map(|s| s.to_string()).unwrap_or_default();
            let is_file = disp.get_filename().is_some();

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|_| ApiError::validation("Malformed form data"))?;
                total += data.len();
                if total > max_size {
                    return Err(ApiError::validation("Upload too large"));
                }
                bytes.extend_from_slice(&data);
            }

            if is_file {
                // browsers send an empty part for an untouched file input
                if !bytes.is_empty() {
                    form.files.push(UploadedFile { field: name, bytes });
                }
            } else {
                form.fields
                    .insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }

        Ok(form)
    }

    /// A text field, trimmed; blank counts as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Take the first file sent under `name`
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let idx = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(idx))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    /// Build a multipart body; `files` entries are (field, filename, bytes)
    pub(crate) fn multipart_body(
        boundary: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    boundary, name, value
                )
                .as_bytes(),
            );
        }
        for (name, filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    boundary, name, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        body
    }
}
