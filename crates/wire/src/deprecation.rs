// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RFC 8594 deprecation headers for endpoints mounted at `/` for backward
//! compatibility.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct DeprecationNotice {
    pub sunset: DateTime<Utc>,
    pub successor_path: String,
}

impl DeprecationNotice {
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Deprecation", "true".to_string()),
            ("Sunset", self.sunset.to_rfc2822()),
            ("Link", format!("<{}>; rel=\"successor-version\"", self.successor_path)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_include_successor_link() {
        let notice = DeprecationNotice {
            sunset: DateTime::parse_from_rfc3339("2027-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            successor_path: "/api/v1/documents".to_string(),
        };
        let headers = notice.headers();
        assert!(headers.iter().any(|(k, v)| *k == "Link" && v.contains("/api/v1/documents")));
        assert!(headers.iter().any(|(k, _)| *k == "Deprecation"));
    }
}
