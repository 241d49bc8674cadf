use super::table::TableKind;
use super::value::Value;
use indexmap::IndexMap;

/// A flat, ordered mapping of column name to value.
///
/// A row optionally carries an explicit destination table. When absent, the
/// emitting plugin's default table applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    table: Option<TableKind>,
    columns: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row explicitly routed to `table`.
    pub fn for_table(table: TableKind) -> Self {
        Self {
            table: Some(table),
            columns: IndexMap::new(),
        }
    }

    /// Adds a column and returns the row, for chained construction.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a column. A replaced column keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn table(&self) -> Option<TableKind> {
        self.table
    }

    pub fn set_table(&mut self, table: Option<TableKind>) {
        self.table = table;
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn into_columns(self) -> IndexMap<String, Value> {
        self.columns
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Row {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        row.extend(iter);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_preserves_insertion_order() {
        let row = Row::new()
            .with("path", "/data/1abc.cif")
            .with("n_atoms", 12usize)
            .with("has_nan_coord", false);

        let names: Vec<_> = row.column_names().collect();
        assert_eq!(names, vec!["path", "n_atoms", "has_nan_coord"]);
        assert_eq!(row.get("n_atoms"), Some(&Value::Int(12)));
        assert_eq!(row.table(), None);
    }

    #[test]
    fn insert_replaces_value_in_place() {
        let mut row = Row::new().with("a", 1i64).with("b", 2i64);
        let old = row.insert("a", 10i64);

        assert_eq!(old, Some(Value::Int(1)));
        let names: Vec<_> = row.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Int(10)));
    }

    #[test]
    fn for_table_sets_explicit_override() {
        let row = Row::for_table(TableKind::Roles).with("role", "antigen");
        assert_eq!(row.table(), Some(TableKind::Roles));
    }

    #[test]
    fn collects_from_pairs() {
        let row: Row = vec![("x", 1.5f64), ("y", 2.5f64)].into_iter().collect();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("y"), Some(&Value::Float(2.5)));
    }
}
