//! Static assets served through the reserved scheme.
//!
//! Hosts that ship bundled HTML/JS/CSS can answer every
//! [`SchemeTask`] with [`AssetProvider::serve`] instead of writing their own
//! file lookup.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::scheme::SchemeTask;

/// Files under a base directory plus in-memory overrides.
pub struct AssetProvider {
    base_dir: PathBuf,
    /// path -> (mime, data)
    overrides: HashMap<String, (String, Vec<u8>)>,
    index: String,
}

impl AssetProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            overrides: HashMap::new(),
            index: "index.html".into(),
        }
    }

    /// File served for `/` and other directory paths.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Serve `data` for `path` without touching the filesystem.
    pub fn add_override(
        &mut self,
        path: impl Into<String>,
        mime: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) {
        let path = path.into().trim_start_matches('/').to_string();
        self.overrides.insert(path, (mime.into(), data.into()));
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Content and MIME type for a request path, or `None` if nothing may be
    /// served there.
    ///
    /// `path` is the raw URL path; percent escapes are decoded before lookup.
    pub fn resolve(&self, path: &str) -> Option<(Cow<'_, str>, Cow<'_, [u8]>)> {
        let decoded = match urlencoding::decode(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(path, "undecodable asset path: {e}");
                return None;
            }
        };
        let mut clean = decoded.trim_start_matches('/').to_string();
        if clean.is_empty() || clean.ends_with('/') {
            clean.push_str(&self.index);
        }

        if let Some((mime, data)) = self.overrides.get(&clean) {
            return Some((Cow::Borrowed(mime.as_str()), Cow::Borrowed(data.as_slice())));
        }

        let file_path = self.base_dir.join(&clean);

        // Canonical paths catch `..` segments and symlinks leaving the base.
        let canonical_base = std::fs::canonicalize(&self.base_dir).ok()?;
        let canonical_file = std::fs::canonicalize(&file_path).ok()?;
        if !canonical_file.starts_with(&canonical_base) {
            debug!(path, "asset outside base directory refused");
            return None;
        }

        let data = std::fs::read(&canonical_file).ok()?;
        Some((
            Cow::Borrowed(mime_from_extension(&file_path)),
            Cow::Owned(data),
        ))
    }

    /// Answer `task` from this provider: the asset with status 200, or 404.
    pub fn serve(&self, mut task: SchemeTask) {
        let path = task.path().to_string();
        match self.resolve(&path) {
            Some((mime, data)) => {
                task.set_response_meta(200, &mime, "");
                task.append_data(&data);
            }
            None => {
                debug!(path, "asset not found");
                task.set_response_meta(404, "text/plain", "");
                task.append_data(b"not found");
            }
        }
        task.finish();
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("wasm") => "application/wasm",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::SchemeResponse;
    use std::sync::mpsc;
    use wry::http::Request;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::create_dir(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js/app.js"), "console.log(1)").unwrap();
        dir
    }

    fn task(url: &str) -> (SchemeTask, mpsc::Receiver<SchemeResponse>) {
        let (tx, rx) = mpsc::channel();
        let request = Request::builder().uri(url).body(Vec::new()).unwrap();
        let task = SchemeTask::new(request, move |response| {
            let _ = tx.send(response);
        });
        (task, rx)
    }

    #[test]
    fn resolves_files_with_mime() {
        let dir = site();
        let assets = AssetProvider::new(dir.path());
        let (mime, data) = assets.resolve("/js/app.js").unwrap();
        assert_eq!(mime, "application/javascript");
        assert_eq!(data.as_ref(), b"console.log(1)");
    }

    #[test]
    fn root_path_serves_index() {
        let dir = site();
        let assets = AssetProvider::new(dir.path());
        let (mime, data) = assets.resolve("/").unwrap();
        assert_eq!(mime, "text/html");
        assert_eq!(data.as_ref(), b"<h1>home</h1>");
    }

    #[test]
    fn traversal_is_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "nope").unwrap();
        let base = outer.path().join("site");
        std::fs::create_dir(&base).unwrap();
        let assets = AssetProvider::new(&base);
        assert!(assets.resolve("../secret.txt").is_none());
    }

    #[test]
    fn encoded_names_are_decoded() {
        let dir = site();
        std::fs::write(dir.path().join("my file.html"), "<p>spaced</p>").unwrap();
        std::fs::write(dir.path().join("café.txt"), "accent").unwrap();
        let assets = AssetProvider::new(dir.path());

        let (task, rx) = task("velo://localhost/my%20file.html");
        assets.serve(task);
        let response = rx.recv().unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_ref(), b"<p>spaced</p>");

        let (_, data) = assets.resolve("/caf%C3%A9.txt").unwrap();
        assert_eq!(data.as_ref(), b"accent");
    }

    #[test]
    fn encoded_traversal_is_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "nope").unwrap();
        let base = outer.path().join("site");
        std::fs::create_dir(&base).unwrap();
        let assets = AssetProvider::new(&base);
        assert!(assets.resolve("/%2e%2e/secret.txt").is_none());
        assert!(assets.resolve("/%2E%2E%2Fsecret.txt").is_none());
        assert!(assets.resolve("/%FF%FE").is_none());
    }

    #[test]
    fn overrides_win_over_files() {
        let dir = site();
        let mut assets = AssetProvider::new(dir.path());
        assets.add_override("/index.html", "text/html", "<h1>generated</h1>");
        let (_, data) = assets.resolve("index.html").unwrap();
        assert_eq!(data.as_ref(), b"<h1>generated</h1>");
    }

    #[test]
    fn serve_answers_found_and_missing() {
        let dir = site();
        let assets = AssetProvider::new(dir.path());

        let (found, rx) = task("velo://localhost/js/app.js");
        assets.serve(found);
        let response = rx.recv().unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "application/javascript"
        );
        assert_eq!(response.body().as_ref(), b"console.log(1)");

        let (missing, rx) = task("velo://localhost/nope.css");
        assets.serve(missing);
        assert_eq!(rx.recv().unwrap().status(), 404);
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        assert_eq!(
            mime_from_extension(Path::new("blob.bin")),
            "application/octet-stream"
        );
    }
}
