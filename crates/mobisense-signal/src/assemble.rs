//! Assembly of per-source feature rows into one fixed-order matrix.
//!
//! Each source (a feature set or an aggregated stream) contributes a
//! list of rows, one per window at its own cadence. The assembler
//! replays the last available row of a slower source against each
//! target row, projects the merged map onto the header order, and
//! replaces every NaN with `0.0` so the matrix is classifier-ready.

use tracing::debug;

use mobisense_core::types::{FeatureMatrix, FeatureRow};

/// Assembles per-source rows into a [`FeatureMatrix`].
///
/// For target row `r`, each non-empty source contributes its row at
/// `min(r, len - 1)`, so sources with fewer rows than `target_rows`
/// replay their last row rather than leaving gaps. Headers absent from
/// every contributing source are omitted from that row; NaN values are
/// written as `0.0`.
#[must_use]
pub fn assemble(
    rows_by_source: &[(String, Vec<FeatureRow>)],
    header: &[String],
    target_rows: usize,
) -> FeatureMatrix {
    let mut rows = Vec::with_capacity(target_rows);
    for r in 0..target_rows {
        let mut merged = FeatureRow::new();
        for (source, source_rows) in rows_by_source {
            let Some(row) = source_rows.get(r.min(source_rows.len().saturating_sub(1))) else {
                debug!(source = %source, row = r, "source contributed no rows");
                continue;
            };
            merged.extend(row.iter().map(|(k, v)| (k.clone(), *v)));
        }

        let row: Vec<f64> = header
            .iter()
            .filter_map(|key| merged.get(key))
            .map(|&v| if v.is_nan() { 0.0 } else { v })
            .collect();
        rows.push(row);
    }

    FeatureMatrix::new(header.to_vec(), rows)
}
