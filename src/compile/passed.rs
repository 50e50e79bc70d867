//! Projection of `passed` constraints onto a job's fetched resources

use crate::compile::columns::Columns;
use crate::core::Job;
use crate::model;

/// Jobs that must have handled `resource` before a job in `column` may fetch it
///
/// Walks the earlier columns nearest first and stops at the first one
/// holding any job that reads or writes the resource; every such job of
/// that column is listed, by name.
pub fn nearest_referencers(columns: &Columns<'_>, column: usize, resource: &str) -> Vec<String> {
    for preceding in columns.preceding(column) {
        let referencers: Vec<String> = preceding
            .iter()
            .filter(|job| job.references(resource))
            .map(|job| job.name.clone())
            .collect();
        if !referencers.is_empty() {
            return referencers;
        }
    }
    Vec::new()
}

/// The fetch block of a job: one `get` per distinct input, sorted by name
pub fn project_gets(columns: &Columns<'_>, column: usize, job: &Job) -> Vec<model::Get> {
    job.fetched_resources()
        .into_iter()
        .map(|reference| model::Get {
            get: reference.name.clone(),
            trigger: reference.trigger,
            passed: nearest_referencers(columns, column, &reference.name),
            params: reference.params.clone(),
        })
        .collect()
}
