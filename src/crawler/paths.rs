//! Local path mapping
//!
//! Every remote URL maps to exactly one file under `outputRoot/<host>/`. The
//! mapping is pure: it never touches the filesystem, and the same inputs
//! always give the same path.

use std::path::{Component, Path, PathBuf};
use url::Url;

/// File name used for directory-like URLs (`/`, `/about`, `/blog/`)
pub const INDEX_FILE: &str = "index.html";

/// Directory under the host directory holding resources from other hosts
pub const EXTERNAL_DIR: &str = "_ext";

/// Maps `url` to its local file under `output_root/base_host`
///
/// # Mapping Rules
///
/// - Path segments are percent-decoded and kept as directories
/// - An empty path or a trailing slash maps to `index.html`
/// - A last segment without an extension is treated as a directory
///   (`/about` → `about/index.html`)
/// - Query and fragment are ignored
/// - Segments that would escape the host directory (`..`, `.`) or contain
///   separators are neutralized
///
/// Resources hosted elsewhere (CDNs) keep their own host as an extra level
/// under [`EXTERNAL_DIR`], so `https://cdn.net/style.css` and the site's
/// `/style.css` never share a file. Scheme and port are ignored.
///
/// # Example
///
/// ```
/// use site_mirror::crawler::map_path;
/// use std::path::{Path, PathBuf};
/// use url::Url;
///
/// let url = Url::parse("https://example.com/img/logo.png").unwrap();
/// let path = map_path("example.com", &url, Path::new("sites"));
/// assert_eq!(path, PathBuf::from("sites/example.com/img/logo.png"));
/// ```
pub fn map_path(base_host: &str, url: &Url, output_root: &Path) -> PathBuf {
    let mut path = output_root.join(base_host);

    if let Some(host) = url.host_str() {
        if !host.eq_ignore_ascii_case(base_host) {
            path.push(EXTERNAL_DIR);
            path.push(sanitize_segment(&host.to_ascii_lowercase()));
        }
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(sanitize_segment)
                .collect()
        })
        .unwrap_or_default();

    let directory_like = url.path().ends_with('/')
        || segments
            .last()
            .map(|last| Path::new(last).extension().is_none())
            .unwrap_or(true);

    for segment in &segments {
        path.push(segment);
    }

    if directory_like {
        path.push(INDEX_FILE);
    }

    path
}

/// Identity of `url` within one mirror
///
/// Two URLs share a key exactly when [`map_path`] stores them in the same
/// file, so `http://` and `https://` variants, `/about` and `/about/`, or
/// different query strings all collapse to one key. Used for the visited set
/// and for download deduplication.
pub fn mirror_key(base_host: &str, url: &Url) -> String {
    map_path(base_host, url, Path::new(""))
        .to_string_lossy()
        .into_owned()
}

/// Builds the href that leads from the page stored at `page_path` to `target`
///
/// Both paths must come from [`map_path`] for the same run. The result is
/// relative to the page's own directory, percent-encoded per segment, with
/// `fragment` re-attached when present.
pub fn relative_link(page_path: &Path, target: &Path, fragment: Option<&str>) -> String {
    let page_dir: Vec<String> = page_path
        .parent()
        .map(normal_components)
        .unwrap_or_default();
    let target_parts = normal_components(target);

    let common = page_dir
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..page_dir.len() {
        parts.push("..".to_string());
    }
    for part in &target_parts[common..] {
        parts.push(urlencoding::encode(part).into_owned());
    }

    let mut link = parts.join("/");
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        link.push('#');
        link.push_str(fragment);
    }
    link
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn sanitize_segment(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    let cleaned: String = decoded
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
