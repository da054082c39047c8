use std::path::Path;
use std::sync::LazyLock;

use reqwest::{Method, Url};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Image types accepted for logo and career-posting uploads.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

static PATH_BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("http://hrpanel.local/").unwrap());

/// Absolute path from raw segments, each percent-encoded on its own.
pub fn path_of(segments: &[&str]) -> String {
    let mut url = PATH_BASE.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `path?k=v&...`, also used as the lookup cache key.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }

    pub fn is_read(&self) -> bool {
        self.method == Method::GET
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn into_reqwest(self) -> ClientResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)
                .map_err(|e| ClientError::Decode(format!("Invalid upload type: {}", e)))?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

#[derive(Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FilePart {
    pub fn new(field: &str, file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            field: field.to_string(),
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        }
    }

    /// Reads a file from disk, inferring its MIME type from the extension.
    pub async fn load(field: &str, path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::Validation(crate::forms::FieldErrors::single(
                field,
                format!("Could not read {}: {}", path.display(), e),
            ))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            field: field.to_string(),
            mime: mime_for_path(path).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        IMAGE_MIME_TYPES.contains(&self.mime.as_str())
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(
            path_of(&["admin", "delete-company", "64f1c2"]),
            "/admin/delete-company/64f1c2"
        );
        assert_eq!(
            path_of(&["deleteCareer", "a/b?c#d e"]),
            "/deleteCareer/a%2Fb%3Fc%23d%20e"
        );
    }

    #[test]
    fn test_target_includes_query() {
        let req = ApiRequest::get("/admin/get-companies")
            .with_query("page", 2)
            .with_query("limit", 15);
        assert_eq!(req.target(), "/admin/get-companies?page=2&limit=15");
        assert_eq!(req.query_value("limit"), Some("15"));
        assert!(req.is_read());
    }

    #[test]
    fn test_mutations_are_not_reads() {
        let req = ApiRequest::post("/admin/create-dept").json(json!({ "department": "HR" }));
        assert!(!req.is_read());
        assert_eq!(
            req.body,
            Some(RequestBody::Json(json!({ "department": "HR" })))
        );
    }

    #[test]
    fn test_mime_inference() {
        assert_eq!(mime_for_path(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("resume.pdf")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_multipart_field_lookup() {
        let form = MultipartForm::new()
            .text("companyName", "Acme")
            .file(FilePart::new("image", "a.png", "image/png", vec![1, 2, 3]));
        assert_eq!(form.field("companyName"), Some("Acme"));
        assert!(form.files[0].is_image());
    }
}
