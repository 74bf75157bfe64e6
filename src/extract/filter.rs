use crate::types::Row;

/// Row admission based on accepted values declared per column
///
/// A row is admitted as soon as one filtered column holds one of its accepted
/// values; comparison ignores case and surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    /// (display name, normalized accepted values) in first-declaration order
    rules: Vec<(String, Vec<String>)>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl RowFilter {
    /// Build a filter from `(display name, accepted values)` pairs.
    ///
    /// Returns None when no column declares a filter, meaning every row is
    /// admitted. A repeated display name keeps its first position but takes
    /// the values of its last declaration.
    pub fn from_rules<'a, I>(rules: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut merged: Vec<(String, Vec<String>)> = Vec::new();
        for (name, values) in rules {
            let values: Vec<String> = values.iter().map(|v| normalize(v)).collect();
            match merged.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = values,
                None => merged.push((name.to_string(), values)),
            }
        }
        if merged.is_empty() {
            None
        } else {
            Some(RowFilter { rules: merged })
        }
    }

    pub fn admit(&self, row: &Row) -> bool {
        self.rules.iter().any(|(name, accepted)| {
            row.get(name).is_some_and(|value| {
                let value = normalize(value);
                accepted.iter().any(|a| *a == value)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_rules_means_no_filter() {
        assert!(RowFilter::from_rules(std::iter::empty::<(&str, &[String])>()).is_none());
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let accepted = values(&["  Red "]);
        let filter = RowFilter::from_rules([("color", accepted.as_slice())]).unwrap();

        let row: Row = [("color", "RED\n")].into_iter().collect();
        assert!(filter.admit(&row));

        let row: Row = [("color", "blue")].into_iter().collect();
        assert!(!filter.admit(&row));
    }

    #[test]
    fn test_any_filtered_column_admits() {
        let colors = values(&["red"]);
        let sizes = values(&["xl", "l"]);
        let filter = RowFilter::from_rules([
            ("color", colors.as_slice()),
            ("size", sizes.as_slice()),
        ])
        .unwrap();

        let row: Row = [("color", "blue"), ("size", "L")].into_iter().collect();
        assert!(filter.admit(&row));

        let row: Row = [("color", "blue"), ("size", "s")].into_iter().collect();
        assert!(!filter.admit(&row));
    }

    #[test]
    fn test_unfiltered_columns_never_admit() {
        let accepted = values(&["x"]);
        let filter = RowFilter::from_rules([("a", accepted.as_slice())]).unwrap();

        let row: Row = [("a", "y"), ("b", "x")].into_iter().collect();
        assert!(!filter.admit(&row));
    }

    #[test]
    fn test_adding_values_is_monotonic() {
        let row: Row = [("a", "2")].into_iter().collect();
        let narrow = values(&["1"]);
        let wide = values(&["1", "2"]);

        let narrow = RowFilter::from_rules([("a", narrow.as_slice())]).unwrap();
        let wide = RowFilter::from_rules([("a", wide.as_slice())]).unwrap();
        assert!(!narrow.admit(&row));
        assert!(wide.admit(&row));
    }

    #[test]
    fn test_repeated_name_takes_last_values() {
        let first = values(&["1"]);
        let second = values(&["2"]);
        let filter =
            RowFilter::from_rules([("a", first.as_slice()), ("a", second.as_slice())]).unwrap();

        let row: Row = [("a", "2")].into_iter().collect();
        assert!(filter.admit(&row));
        let row: Row = [("a", "1")].into_iter().collect();
        assert!(!filter.admit(&row));
    }
}
