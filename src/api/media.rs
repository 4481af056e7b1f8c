/// Turns backend media paths (`/media/news/flood.jpg`) into absolute URLs
#[derive(Debug, Clone)]
pub struct MediaResolver {
    origin: String,
}

impl MediaResolver {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Absolute URLs pass through untouched; anything else is prefixed with the origin
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }

    /// Resolve an optional media field, `'N/A'` when the record has none
    pub fn resolve_or_na(&self, path: Option<&str>) -> String {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => self.resolve(p),
            None => crate::models::NOT_AVAILABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_relative_paths() {
        let media = MediaResolver::new("https://backend.outlinekerala.com/");
        assert_eq!(
            media.resolve("/media/categories/kerala.png"),
            "https://backend.outlinekerala.com/media/categories/kerala.png"
        );
        assert_eq!(media.resolve("media/a.jpg"), "https://backend.outlinekerala.com/media/a.jpg");
    }

    #[test]
    fn keeps_absolute_urls_and_marks_missing() {
        let media = MediaResolver::new("https://backend.outlinekerala.com");
        assert_eq!(media.resolve("https://cdn.example.com/a.jpg"), "https://cdn.example.com/a.jpg");
        assert_eq!(media.resolve_or_na(None), "N/A");
        assert_eq!(media.resolve_or_na(Some("  ")), "N/A");
    }
}
