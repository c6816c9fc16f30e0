// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Turns a constraint set into concrete paths and a read offset.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::constraint::{ConstraintSet, Operator};
use crate::error::Result;
use crate::fs::FileSource;
use crate::pattern::like_to_glob;

pub const PATH_COLUMN: &str = "path";
pub const OFFSET_COLUMN: &str = "offset";

/// Output of constraint resolution for one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// Deduplicated, in path order
    pub paths: BTreeSet<PathBuf>,
    pub offset: u64,
}

/// Resolve `path` (EQUALS and LIKE) and `offset` (EQUALS) constraints.
///
/// A LIKE pattern that fails to expand contributes no paths and does not
/// affect the others. An invalid offset fails the query.
pub async fn resolve(constraints: &ConstraintSet, files: &dyn FileSource) -> Result<ResolvedQuery> {
    let offset = resolve_offset(constraints)?;

    let mut paths: BTreeSet<PathBuf> = constraints
        .texts(PATH_COLUMN, Operator::Equals)
        .into_iter()
        .map(PathBuf::from)
        .collect();

    for like in constraints.texts(PATH_COLUMN, Operator::Like) {
        let glob = like_to_glob(&like);
        match files.expand_pattern(&glob).await {
            Ok(expanded) => {
                let count = expanded.len();
                diagnostics::log_debug!("Pattern {pattern} matched {count} paths", pattern: like, count: count);
                paths.extend(expanded);
            }
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_debug!("Pattern {pattern} did not expand: {error}", pattern: like, error: error);
            }
        }
    }

    Ok(ResolvedQuery { paths, offset })
}

/// First `offset = N` constraint, or 0
fn resolve_offset(constraints: &ConstraintSet) -> Result<u64> {
    let supplied = constraints.count(OFFSET_COLUMN, Operator::Equals);
    let offset = constraints
        .first_unsigned(OFFSET_COLUMN, Operator::Equals)?
        .unwrap_or(0);

    if supplied > 1 {
        diagnostics::log_warn!("{supplied} offset constraints supplied, using the first: {offset}", supplied: supplied, offset: offset);
    }
    Ok(offset)
}
