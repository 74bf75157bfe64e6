use serde::ser::{Serialize, SerializeMap, Serializer};

/// Separator used between the texts of a multi-valued field
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// A column of the output, derived once from a field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Position of the field within its parent group (0-based)
    pub index: usize,

    /// Header text and row key
    pub display_name: String,
}

/// One extracted record - the values for one parent-element occurrence
///
/// Keys keep their first insertion position; inserting an existing key
/// replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Row { values: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values laid out in header order; names missing from the row become empty cells
    pub fn cells<'a>(&'a self, header: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        header.iter().map(move |name| self.get(name).unwrap_or(""))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The output of one parent group: a fixed header and the admitted rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Table {
            header,
            rows: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut row = Row::new();
        row.insert("a", "1");
        row.insert("b", "2");
        row.insert("a", "3");

        assert_eq!(row.len(), 2);
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_cells_follow_header() {
        let row: Row = [("price", "10"), ("name", "pen")].into_iter().collect();
        let header = vec!["name".to_string(), "missing".to_string(), "price".to_string()];

        let cells: Vec<_> = row.cells(&header).collect();
        assert_eq!(cells, vec!["pen", "", "10"]);
    }

    #[test]
    fn test_row_serializes_as_ordered_map() {
        let row: Row = [("z", "1"), ("a", "2")].into_iter().collect();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }
}
