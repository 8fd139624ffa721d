//! Header resolution: locate configured field names in the header row.

use std::collections::HashMap;

use crate::reader::RawRow;

/// Mapping from configured field name to zero-based column position.
///
/// Fields absent from the header are simply not present in the map; they
/// are skipped for the run, never fatal.
pub type HeaderMap = HashMap<String, usize>;

/// Resolve the column position of each configured field name.
///
/// Matching is exact. If the header contains duplicate names, the first
/// occurrence is authoritative. Pure function of its inputs.
pub fn resolve_headers(header_row: &RawRow, fields: &[String]) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(fields.len());
    for field in fields {
        if let Some(position) = header_row.iter().position(|cell| cell == field) {
            map.insert(field.clone(), position);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_all_fields_found() {
        let header = vec!["name".to_string(), "mail".to_string(), "pass".to_string()];
        let map = resolve_headers(&header, &fields(&["name", "mail", "pass"]));
        assert_eq!(map.get("name"), Some(&0));
        assert_eq!(map.get("mail"), Some(&1));
        assert_eq!(map.get("pass"), Some(&2));
    }

    #[test]
    fn test_arbitrary_column_order() {
        let header = vec!["pass".to_string(), "mail".to_string(), "name".to_string()];
        let map = resolve_headers(&header, &fields(&["name", "mail"]));
        assert_eq!(map.get("name"), Some(&2));
        assert_eq!(map.get("mail"), Some(&1));
    }

    #[test]
    fn test_absent_field_omitted() {
        let header = vec!["name".to_string(), "mail".to_string()];
        let map = resolve_headers(&header, &fields(&["name", "mail", "pass"]));
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("pass"));
    }

    #[test]
    fn test_extra_header_columns_ignored() {
        let header = vec![
            "shoe_size".to_string(),
            "name".to_string(),
            "mail".to_string(),
        ];
        let map = resolve_headers(&header, &fields(&["name", "mail"]));
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("shoe_size"));
    }

    #[test]
    fn test_duplicate_header_first_match_wins() {
        let header = vec!["name".to_string(), "name".to_string()];
        let map = resolve_headers(&header, &fields(&["name"]));
        assert_eq!(map.get("name"), Some(&0));
    }

    #[test]
    fn test_no_partial_matching() {
        let header = vec!["username".to_string(), "mail".to_string()];
        let map = resolve_headers(&header, &fields(&["name", "mail"]));
        assert!(!map.contains_key("name"));
    }
}
