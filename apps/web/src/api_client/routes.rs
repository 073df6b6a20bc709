use std::fmt;

/// A relative endpoint on the PulseLoop API: path segments plus query pairs.
///
/// Ids are kept as raw segments and only percent-encoded when joined onto the
/// base URL, so a hostile id cannot escape its path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoute {
    segments: Vec<String>,
    query: Vec<(&'static str, String)>,
}

impl ApiRoute {
    fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    pub fn admin_analytics(organization_id: &str) -> Self {
        Self::new(["api", "admin", "analytics"]).with_query("organization_id", organization_id)
    }

    pub fn feed() -> Self {
        Self::new(["api", "feed"])
    }

    pub fn daily_options() -> Self {
        Self::new(["api", "feed", "daily-options"])
    }

    pub fn content(id: &str) -> Self {
        Self::new(["api", "content", id])
    }

    pub fn content_summary(id: &str) -> Self {
        Self::new(["api", "content", id, "summary"])
    }

    pub fn content_complete(id: &str) -> Self {
        Self::new(["api", "content", id, "complete"])
    }

    pub fn quiz(content_id: &str) -> Self {
        Self::new(["api", "quiz", "content", content_id])
    }

    /// The retry quiz for a content item. When the caller already holds the
    /// chained quiz id it names it explicitly.
    pub fn retry_quiz(content_id: &str, quiz_id: Option<&str>) -> Self {
        let route = Self::new(["api", "quiz", "content", content_id, "retry"]);
        match quiz_id {
            Some(id) => route.with_query("quiz_id", id),
            None => route,
        }
    }

    pub fn submit_quiz(content_id: &str) -> Self {
        Self::new(["api", "quiz", "content", content_id, "submit"])
    }

    pub fn my_stats() -> Self {
        Self::new(["api", "me", "stats"])
    }
}

impl fmt::Display for ApiRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}
