use super::row::Row;
use super::table::{Table, TableKind, TableSet};
use super::value::Value;
use indexmap::{IndexMap, IndexSet};

const PIVOT_EXCLUDED_COLUMNS: [&str; 2] = ["path", "assembly_id"];

/// One pivoted table: per path, the wide columns it contributes.
struct Pivot {
    columns: Vec<String>,
    values: IndexMap<String, IndexMap<String, Value>>,
}

/// Builds the denormalized per-structure table.
///
/// The base is the structures table deduplicated by `path` (first row wins).
/// The chains, roles and interfaces tables are pivoted on their sub-key so
/// that each `(sub-key, feature)` pair becomes a column named
/// `{kind}_{subkey}__{feature}`, and each pivot is left-joined onto the base
/// by path. Paths absent from a pivoted table get nulls for its columns; no
/// base row is ever dropped.
///
/// # Arguments
///
/// * `tables` - The append-only metadata tables, as emitted.
///
/// # Return
///
/// Returns a table with exactly one row per distinct structure path.
pub fn build_wide_table(tables: &TableSet) -> Table {
    let mut base: IndexMap<String, Row> = IndexMap::new();
    for row in tables.structures.rows() {
        let Some(path) = row.get("path").filter(|v| !v.is_null()) else {
            continue;
        };
        base.entry(path.to_string()).or_insert_with(|| {
            let mut fresh = row.clone();
            fresh.set_table(None);
            fresh
        });
    }

    let pivots: Vec<Pivot> = [&tables.chains, &tables.roles, &tables.interfaces]
        .into_iter()
        .filter_map(pivot)
        .collect();

    let mut wide = Table::new(TableKind::Structures);
    for (path, mut row) in base {
        for p in &pivots {
            let contributed = p.values.get(&path);
            for column in &p.columns {
                let value = contributed
                    .and_then(|cols| cols.get(column))
                    .cloned()
                    .unwrap_or(Value::Null);
                row.insert(column.clone(), value);
            }
        }
        wide.push(row);
    }
    wide
}

fn pivot(table: &Table) -> Option<Pivot> {
    let key_column = table.kind().sub_key()?;
    if table.is_empty() {
        return None;
    }
    let prefix = table.kind().wide_prefix();

    let mut sub_keys: IndexSet<String> = IndexSet::new();
    let mut features: IndexSet<String> = IndexSet::new();
    let mut present: IndexSet<(String, String)> = IndexSet::new();
    let mut values: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();

    for row in table.rows() {
        let (Some(path), Some(sub_key)) = (
            row.get("path").filter(|v| !v.is_null()),
            row.get(key_column).filter(|v| !v.is_null()),
        ) else {
            continue;
        };
        let sub_key = sub_key.to_string();
        sub_keys.insert(sub_key.clone());

        let per_path = values.entry(path.to_string()).or_default();
        for (name, value) in row.columns() {
            if name == key_column || PIVOT_EXCLUDED_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            features.insert(name.clone());
            present.insert((sub_key.clone(), name.clone()));

            let column = wide_column(prefix, &sub_key, name);
            let slot = per_path.entry(column).or_insert(Value::Null);
            if slot.is_null() {
                *slot = value.clone();
            }
        }
    }

    let mut columns = Vec::with_capacity(present.len());
    for sub_key in &sub_keys {
        for feature in &features {
            if present.contains(&(sub_key.clone(), feature.clone())) {
                columns.push(wide_column(prefix, sub_key, feature));
            }
        }
    }

    Some(Pivot { columns, values })
}

fn wide_column(prefix: &str, sub_key: &str, feature: &str) -> String {
    format!("{}_{}__{}", prefix, sub_key, feature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_row(path: &str, chain: &str, n: i64) -> Row {
        Row::new()
            .with("path", path)
            .with("assembly_id", "1")
            .with("chain_id", chain)
            .with("id__n_atoms", n)
    }

    #[test]
    fn structures_only_path_is_kept_with_null_pivot_columns() {
        let mut tables = TableSet::new();
        tables
            .structures
            .push(Row::new().with("path", "p1").with("id__n_chains", 2i64));
        tables
            .structures
            .push(Row::new().with("path", "p2").with("id__n_chains", 1i64));
        tables.chains.push(chain_row("p1", "H", 100));

        let wide = build_wide_table(&tables);

        assert_eq!(wide.len(), 2);
        let p2 = &wide.rows()[1];
        assert_eq!(p2.get("path"), Some(&Value::from("p2")));
        assert_eq!(p2.get("chain_H__id__n_atoms"), Some(&Value::Null));
        assert_eq!(
            wide.rows()[0].get("chain_H__id__n_atoms"),
            Some(&Value::Int(100))
        );
    }

    #[test]
    fn duplicate_structure_paths_keep_first_row() {
        let mut tables = TableSet::new();
        tables
            .structures
            .push(Row::new().with("path", "p").with("v", 1i64));
        tables
            .structures
            .push(Row::new().with("path", "p").with("v", 2i64).with("extra", 3i64));

        let wide = build_wide_table(&tables);
        assert_eq!(wide.len(), 1);
        assert_eq!(wide.rows()[0].get("v"), Some(&Value::Int(1)));
        assert_eq!(wide.rows()[0].get("extra"), None);
    }

    #[test]
    fn rows_from_two_plugins_share_one_pivot_group() {
        let mut tables = TableSet::new();
        tables.structures.push(Row::new().with("path", "p"));
        tables.chains.push(chain_row("p", "H", 7));
        tables.chains.push(
            Row::new()
                .with("path", "p")
                .with("chain_id", "H")
                .with("id__n_atoms", Value::Null)
                .with("qc__n_breaks", 0i64),
        );

        let wide = build_wide_table(&tables);

        let row = &wide.rows()[0];
        assert_eq!(row.get("chain_H__id__n_atoms"), Some(&Value::Int(7)));
        assert_eq!(row.get("chain_H__qc__n_breaks"), Some(&Value::Int(0)));
        assert_eq!(tables.chains.len(), 2);
    }

    #[test]
    fn pivot_columns_follow_subkey_then_feature_order() {
        let mut tables = TableSet::new();
        tables.structures.push(Row::new().with("path", "p"));
        tables.chains.push(chain_row("p", "L", 5));
        tables.chains.push(chain_row("p", "H", 7));
        tables.interfaces.push(
            Row::new()
                .with("path", "p")
                .with("pair", "antibody__antigen")
                .with("role_left", "antibody")
                .with("iface__min_dist", 3.2f64),
        );

        let wide = build_wide_table(&tables);
        let columns = wide.columns();
        assert_eq!(
            columns,
            vec![
                "path",
                "chain_L__id__n_atoms",
                "chain_H__id__n_atoms",
                "iface_antibody__antigen__role_left",
                "iface_antibody__antigen__iface__min_dist",
            ]
        );
        assert!(!columns.iter().any(|c| c.contains("assembly_id")));
    }

    #[test]
    fn combinations_never_observed_are_not_materialized() {
        let mut tables = TableSet::new();
        tables.structures.push(Row::new().with("path", "p"));
        tables.roles.push(
            Row::new()
                .with("path", "p")
                .with("role", "vh")
                .with("paragraph__cutoff", 0.5f64),
        );
        tables.roles.push(
            Row::new()
                .with("path", "p")
                .with("role", "antigen")
                .with("id__n_atoms", 10i64),
        );

        let columns = build_wide_table(&tables).columns();
        assert!(columns.contains(&"role_vh__paragraph__cutoff".to_string()));
        assert!(columns.contains(&"role_antigen__id__n_atoms".to_string()));
        assert!(!columns.contains(&"role_antigen__paragraph__cutoff".to_string()));
    }

    #[test]
    fn empty_structures_table_yields_empty_wide_table() {
        let mut tables = TableSet::new();
        tables.chains.push(chain_row("p", "H", 1));
        assert!(build_wide_table(&tables).is_empty());
    }
}
