//! Flat blob paths split into container and listing prefix.

use serde::Serialize;

use crate::naming::ROOT_CONTAINER_NAME;

/// Splits `raw` on its first `/` into a container and an optional prefix.
///
/// Without a separator the whole input is a prefix inside the root
/// container. An empty container maps to the root container and an empty
/// prefix means an unfiltered listing.
pub fn parse_user_prefix(raw: &str) -> (String, Option<String>) {
    let (container, prefix) = match raw.split_once('/') {
        Some((container, prefix)) => (container, prefix),
        None => ("", raw),
    };

    let container = if container.is_empty() {
        ROOT_CONTAINER_NAME
    } else {
        container
    };
    let prefix = (!prefix.is_empty()).then(|| prefix.to_string());

    (container.to_string(), prefix)
}

/// Parameters of a blob enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListBlobsRequest {
    /// Container being listed.
    pub container: String,
    /// Only blobs whose names start with this are returned.
    pub prefix: Option<String>,
    /// Hierarchy delimiter; `None` lists flat.
    pub delimiter: Option<String>,
}

impl ListBlobsRequest {
    /// Builds a request from a flat user path.
    pub fn from_user_prefix(raw: &str, delimiter: Option<String>) -> Self {
        let (container, prefix) = parse_user_prefix(raw);
        Self {
            container,
            prefix,
            delimiter,
        }
    }

    /// Query parameters of the list operation.
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("restype".to_string(), "container".to_string()),
            ("comp".to_string(), "list".to_string()),
        ];
        if let Some(prefix) = &self.prefix {
            query.push(("prefix".to_string(), prefix.clone()));
        }
        if let Some(delimiter) = &self.delimiter {
            query.push(("delimiter".to_string(), delimiter.clone()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> (String, Option<String>) {
        parse_user_prefix(raw)
    }

    #[test]
    fn test_no_separator_lists_root() {
        assert_eq!(parsed("abc"), ("$root".to_string(), Some("abc".to_string())));
        assert_eq!(parsed(""), ("$root".to_string(), None));
    }

    #[test]
    fn test_leading_separator_lists_root() {
        assert_eq!(parsed("/abc"), ("$root".to_string(), Some("abc".to_string())));
        assert_eq!(parsed("/"), ("$root".to_string(), None));
    }

    #[test]
    fn test_container_and_prefix() {
        assert_eq!(parsed("abc/"), ("abc".to_string(), None));
        assert_eq!(parsed("abc/def"), ("abc".to_string(), Some("def".to_string())));
    }

    #[test]
    fn test_only_first_separator_splits() {
        assert_eq!(
            parsed("abc/def/ghi/"),
            ("abc".to_string(), Some("def/ghi/".to_string()))
        );
    }

    #[test]
    fn test_list_query() {
        let request = ListBlobsRequest::from_user_prefix("logs/2024/", Some("/".to_string()));
        assert_eq!(request.container, "logs");
        assert_eq!(
            request.query(),
            vec![
                ("restype".to_string(), "container".to_string()),
                ("comp".to_string(), "list".to_string()),
                ("prefix".to_string(), "2024/".to_string()),
                ("delimiter".to_string(), "/".to_string()),
            ]
        );

        let flat = ListBlobsRequest::from_user_prefix("logs/", None);
        assert_eq!(flat.query().len(), 2);
    }
}
