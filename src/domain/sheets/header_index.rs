use std::collections::HashMap;

/// Lookup from normalized header name (trimmed, lower-cased) to its column position.
///
/// When the same header appears more than once, the leftmost column wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
    normalized: Vec<String>,
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

impl HeaderIndex {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized = headers
            .iter()
            .map(|header| normalize_header(header.as_ref()))
            .collect::<Vec<_>>();

        let mut positions = HashMap::with_capacity(normalized.len());
        for (index, header) in normalized.iter().enumerate() {
            positions.entry(header.clone()).or_insert(index);
        }

        Self {
            positions,
            normalized,
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(&normalize_header(name)).copied()
    }

    /// Returns the names from `required` that have no column.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.position(name).is_none())
            .collect()
    }

    pub fn normalized_headers(&self) -> &[String] {
        &self.normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let index = HeaderIndex::new(&["  Status ", "Convoso List Name", "CONVOSO"]);
        assert_eq!(index.position("status"), Some(0));
        assert_eq!(index.position("convoso list name"), Some(1));
        assert_eq!(index.position("Convoso"), Some(2));
    }

    #[test]
    fn test_duplicate_header_keeps_first_column() {
        let index = HeaderIndex::new(&["Status", "Notes", "status"]);
        assert_eq!(index.position("status"), Some(0));
    }

    #[test]
    fn test_missing_reports_absent_names_in_order() {
        let index = HeaderIndex::new(&["Status", "Owner"]);
        assert_eq!(
            index.missing(&["status", "convoso list name", "convoso"]),
            vec!["convoso list name", "convoso"]
        );
    }

    #[test]
    fn test_normalized_headers() {
        let index = HeaderIndex::new(&[" Status", "Convoso "]);
        assert_eq!(index.normalized_headers(), &["status", "convoso"]);
    }
}
