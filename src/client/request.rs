//! Request description and URL construction.

use reqwest::Method;
use url::Url;

use crate::error::{Result, WeapmError};

/// One API call, independent of any transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments below the base URL, unencoded.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn with_json<T: serde::Serialize>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| WeapmError::InvalidRequest(format!("failed to serialize body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Endpoint path for logs, e.g. `/operation/clusters/LOG001`.
    pub fn path(&self) -> String {
        let mut p = String::new();
        for s in &self.segments {
            p.push('/');
            p.push_str(s);
        }
        p
    }

    /// Resolve against `base`, percent-encoding every segment and query pair.
    ///
    /// Any path already on the base is kept; a trailing slash is ignored.
    pub fn url(&self, base: &Url) -> Result<Url> {
        // `path_segments_mut` drops dot segments, which would retarget the request.
        if let Some(bad) = self
            .segments
            .iter()
            .find(|s| matches!(s.trim(), "" | "." | ".."))
        {
            return Err(WeapmError::InvalidRequest(format!(
                "invalid path segment in {} (got {bad:?})",
                self.path()
            )));
        }

        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                WeapmError::InvalidRequest(format!("base url cannot take a path: {base}"))
            })?;
            path.pop_if_empty();
            path.extend(self.segments.iter().map(String::as_str));
        }
        url.set_query(None);
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn joins_segments_onto_bare_host() {
        let req = ApiRequest::get(["operation", "clusters"]);
        let url = req.url(&base("http://127.0.0.1:8080")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/operation/clusters");
    }

    #[test]
    fn keeps_base_path_and_ignores_trailing_slash() {
        let req = ApiRequest::get(["operation", "dashboard"]);
        let url = req.url(&base("https://h.example/weapm/")).unwrap();
        assert_eq!(url.as_str(), "https://h.example/weapm/operation/dashboard");
    }

    #[test]
    fn encodes_segments_and_query() {
        let req = ApiRequest::new(Method::POST, ["operation", "subsystem", "A/B C"]).with_query(
            vec![
                ("targetClusterName".into(), "LOG 2".into()),
                ("logImportFiles".into(), "/var/log/a.log,/var/log/b.log".into()),
            ],
        );
        let url = req.url(&base("http://h")).unwrap();
        assert_eq!(url.path(), "/operation/subsystem/A%2FB%20C");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("targetClusterName".into(), "LOG 2".into()));
        assert_eq!(
            pairs[1],
            ("logImportFiles".into(), "/var/log/a.log,/var/log/b.log".into())
        );
    }

    #[test]
    fn rejects_empty_segment() {
        let req = ApiRequest::get(["operation", "clusters", ""]);
        assert!(matches!(
            req.url(&base("http://h")),
            Err(WeapmError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_dot_segments() {
        for id in [".", "..", " .. "] {
            let detail = ApiRequest::get(["operation", "clusters", id]);
            assert!(
                matches!(detail.url(&base("http://h:8080")), Err(WeapmError::InvalidRequest(_))),
                "{id:?} should be rejected"
            );
            let delete = ApiRequest::new(Method::DELETE, ["operation", "clusters", "nodes", id]);
            assert!(delete.url(&base("http://h:8080")).is_err());
        }
        let dotted = ApiRequest::get(["operation", "subsystem", "a..b"]);
        assert_eq!(
            dotted.url(&base("http://h")).unwrap().path(),
            "/operation/subsystem/a..b"
        );
    }

    #[test]
    fn path_is_readable() {
        let req = ApiRequest::get(["operation", "subsystem", "exists", "SYS001"]);
        assert_eq!(req.path(), "/operation/subsystem/exists/SYS001");
    }
}
