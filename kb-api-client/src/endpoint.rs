//! Route constants and path normalization.

pub const UPLOAD: &str = "/upload";
pub const QUERY: &str = "/query";
pub const REFERENCES: &str = "/references";
pub const CHART_DATA: &str = "/chart-data";
pub const HISTORY: &str = "/history";
pub const ADMIN: &str = "/admin";

/// Strips every leading and trailing `/` and re-adds exactly one leading slash.
///
/// `"upload"`, `"/upload"` and `"//upload/"` all become `"/upload"`.
pub fn normalize(endpoint: &str) -> String {
    format!("/{}", endpoint.trim_matches('/'))
}

/// Joins an origin (no trailing slash) with a normalized endpoint.
pub fn join(base_url: &str, endpoint: &str) -> String {
    format!("{}{}", base_url, normalize(endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_slashes() {
        assert_eq!(normalize("upload"), "/upload");
        assert_eq!(normalize("/upload"), "/upload");
        assert_eq!(normalize("//chart-data//"), "/chart-data");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn keeps_inner_segments() {
        assert_eq!(normalize("/admin/stats/"), "/admin/stats");
    }

    #[test]
    fn joins_with_origin() {
        assert_eq!(join("http://localhost:8000", "history/"), "http://localhost:8000/history");
    }
}
