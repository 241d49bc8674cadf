use super::row::Row;
use indexmap::IndexSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four logical output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Structures,
    Chains,
    Roles,
    Interfaces,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown table '{0}' (expected one of: structures, chains, roles, interfaces)")]
pub struct UnknownTableError(pub String);

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Structures,
        TableKind::Chains,
        TableKind::Roles,
        TableKind::Interfaces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Structures => "structures",
            TableKind::Chains => "chains",
            TableKind::Roles => "roles",
            TableKind::Interfaces => "interfaces",
        }
    }

    /// The column that, together with `path`, identifies a row.
    ///
    /// `None` for the structures table, which is keyed by `path` alone.
    pub fn sub_key(&self) -> Option<&'static str> {
        match self {
            TableKind::Structures => None,
            TableKind::Chains => Some("chain_id"),
            TableKind::Roles => Some("role"),
            TableKind::Interfaces => Some("pair"),
        }
    }

    /// The column-name prefix used when this table is pivoted into the wide table.
    pub fn wide_prefix(&self) -> &'static str {
        match self {
            TableKind::Structures => "structure",
            TableKind::Chains => "chain",
            TableKind::Roles => "role",
            TableKind::Interfaces => "iface",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = UnknownTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "structures" => Ok(TableKind::Structures),
            "chains" => Ok(TableKind::Chains),
            "roles" => Ok(TableKind::Roles),
            "interfaces" => Ok(TableKind::Interfaces),
            other => Err(UnknownTableError(other.to_string())),
        }
    }
}

/// An append-only collection of rows belonging to one logical table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    kind: TableKind,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn append(&mut self, other: Table) {
        self.rows.extend(other.rows);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the union of column names over all rows, in first-appearance order.
    pub fn columns(&self) -> Vec<String> {
        column_union(&self.rows)
    }
}

/// Returns the union of column names over `rows`, in first-appearance order.
pub fn column_union<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<String> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    for row in rows {
        seen.extend(row.column_names());
    }
    seen.into_iter().map(str::to_string).collect()
}

/// The four metadata tables accumulated over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSet {
    pub structures: Table,
    pub chains: Table,
    pub roles: Table,
    pub interfaces: Table,
}

impl Default for TableSet {
    fn default() -> Self {
        Self {
            structures: Table::new(TableKind::Structures),
            chains: Table::new(TableKind::Chains),
            roles: Table::new(TableKind::Roles),
            interfaces: Table::new(TableKind::Interfaces),
        }
    }
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: TableKind) -> &Table {
        match kind {
            TableKind::Structures => &self.structures,
            TableKind::Chains => &self.chains,
            TableKind::Roles => &self.roles,
            TableKind::Interfaces => &self.interfaces,
        }
    }

    pub fn get_mut(&mut self, kind: TableKind) -> &mut Table {
        match kind {
            TableKind::Structures => &mut self.structures,
            TableKind::Chains => &mut self.chains,
            TableKind::Roles => &mut self.roles,
            TableKind::Interfaces => &mut self.interfaces,
        }
    }

    pub fn push(&mut self, kind: TableKind, row: Row) {
        self.get_mut(kind).push(row);
    }

    /// Appends every table of `other` after the rows already collected.
    pub fn append(&mut self, other: TableSet) {
        self.structures.append(other.structures);
        self.chains.append(other.chains);
        self.roles.append(other.roles);
        self.interfaces.append(other.interfaces);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        TableKind::ALL.into_iter().map(move |kind| self.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_kind_parses_known_names() {
        assert_eq!("chains".parse::<TableKind>(), Ok(TableKind::Chains));
        assert_eq!(" interfaces ".parse::<TableKind>(), Ok(TableKind::Interfaces));
        assert_eq!(TableKind::Roles.to_string(), "roles");
    }

    #[test]
    fn table_kind_rejects_unknown_names() {
        let err = "residues".parse::<TableKind>().unwrap_err();
        assert_eq!(err, UnknownTableError("residues".to_string()));
        assert!(err.to_string().contains("residues"));
    }

    #[test]
    fn columns_are_union_in_first_appearance_order() {
        let mut table = Table::new(TableKind::Structures);
        table.push(Row::new().with("path", "a").with("x", 1i64));
        table.push(Row::new().with("path", "b").with("y", 2i64).with("x", 3i64));

        assert_eq!(table.columns(), vec!["path", "x", "y"]);
    }

    #[test]
    fn rows_sharing_a_key_stay_separate() {
        let mut table = Table::new(TableKind::Chains);
        table.push(
            Row::new()
                .with("path", "p1")
                .with("chain_id", "H")
                .with("id__n_atoms", 10usize),
        );
        table.push(
            Row::new()
                .with("path", "p1")
                .with("chain_id", "H")
                .with("qc__has_break", false),
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("qc__has_break"), None);
        assert_eq!(table.rows()[1].get("id__n_atoms"), None);
        assert_eq!(table.columns(), vec!["path", "chain_id", "id__n_atoms", "qc__has_break"]);
    }

    #[test]
    fn table_set_routes_and_appends() {
        let mut first = TableSet::new();
        first.push(TableKind::Chains, Row::new().with("path", "a"));
        let mut second = TableSet::new();
        second.push(TableKind::Chains, Row::new().with("path", "b"));
        second.push(TableKind::Interfaces, Row::new().with("path", "b"));

        first.append(second);

        assert_eq!(first.chains.len(), 2);
        assert_eq!(first.interfaces.len(), 1);
        assert!(first.structures.is_empty());
        assert_eq!(first.iter().count(), 4);
    }
}
