use super::{Plugin, RowStream};
use crate::core::io::predictions::PredictionRecord;
use crate::core::tables::row::Row;
use crate::core::tables::table::TableKind;
use crate::core::utils::geometry::summarize_points;
use crate::engine::context::ExecutionContext;
use crate::engine::error::EngineError;
use indexmap::IndexMap;
use nalgebra::Point3;
use std::iter;

const PLUGIN_NAME: &str = "paragraph_paratope";

/// Summaries of per-residue paratope predictions.
///
/// Emits one chains row per predicted chain and one roles row per configured
/// summary role, covering residues with a score at or above the cutoff.
pub struct ParatopePlugin;

/// A prediction with both score and position resolved.
struct Scored<'a> {
    record: &'a PredictionRecord,
    score: f64,
    position: Point3<f64>,
}

fn scored(record: &PredictionRecord) -> Option<Scored<'_>> {
    if record.chain_id.is_empty() || record.imgt.is_empty() {
        return None;
    }
    let score = record.score?;
    let [x, y, z] = record.position;
    Some(Scored {
        record,
        score,
        position: Point3::new(x?, y?, z?),
    })
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    (n > 0).then(|| values.sum::<f64>() / n as f64)
}

/// Fills `row` with the summary columns of one group of scored residues.
fn summarize_into(mut row: Row, group: &[&Scored<'_>], cutoff: f64) -> Result<Row, EngineError> {
    let hits: Vec<&Scored<'_>> = group.iter().copied().filter(|s| s.score >= cutoff).collect();
    let points: Vec<Point3<f64>> = hits.iter().map(|s| s.position).collect();
    let labels: Vec<String> = hits.iter().map(|s| s.record.label()).collect();
    let summary = summarize_points(&points, &labels).map_err(|source| EngineError::Geometry {
        plugin: PLUGIN_NAME,
        source,
    })?;

    let score_max = group.iter().map(|s| s.score).fold(f64::NEG_INFINITY, f64::max);
    row.insert("cutoff", cutoff);
    row.insert("n_res_scored", group.len());
    row.insert("score_mean_all_scored", mean(group.iter().map(|s| s.score)));
    row.insert("score_max", score_max);
    row.extend(summary.to_columns("paratope"));
    row.insert("paratope_score_mean", mean(hits.iter().map(|s| s.score)));
    Ok(row)
}

impl Plugin for ParatopePlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn prefix(&self) -> &'static str {
        "paragraph"
    }

    fn table(&self) -> TableKind {
        TableKind::Chains
    }

    fn run<'a>(&'a self, ctx: &'a ExecutionContext<'a>) -> RowStream<'a> {
        let Some(predictions) = ctx.predictions else {
            return Box::new(iter::empty());
        };
        let settings = &ctx.config.paratope;
        let records: Vec<Scored<'a>> = predictions
            .for_structure(&ctx.path, settings.id_mode)
            .into_iter()
            .filter_map(scored)
            .collect();
        if records.is_empty() {
            return Box::new(iter::empty());
        }

        let mut by_chain: IndexMap<&str, Vec<&Scored<'_>>> = IndexMap::new();
        for s in &records {
            by_chain.entry(s.record.chain_id.as_str()).or_default().push(s);
        }

        let mut rows = Vec::new();
        for (chain_id, group) in &by_chain {
            if !ctx.chains.is_empty() && !ctx.chains.contains_key(*chain_id) {
                continue;
            }
            let row = ctx.row().with("chain_id", *chain_id);
            rows.push(summarize_into(row, group, settings.cutoff));
        }

        for role in &settings.summary_roles {
            let Some(spec) = ctx.config.roles.get(role) else {
                continue;
            };
            if spec.is_empty() {
                continue;
            }
            let group: Vec<&Scored<'_>> = records
                .iter()
                .filter(|s| spec.contains(&s.record.chain_id))
                .collect();
            if group.is_empty() {
                continue;
            }
            let row = ctx.row_for(TableKind::Roles).with("role", role.as_str());
            rows.push(summarize_into(row, &group, settings.cutoff));
        }

        Box::new(rows.into_iter())
    }
}
