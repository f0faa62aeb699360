use std::collections::HashMap;

use csv::StringRecord;
use serde::Serialize;

use crate::error::PipelineError;

/// One output document. Field names are the template placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl Page {
    /// Build a page from positional fields 0/1/2. `line` is only used for the error.
    pub fn from_record(record: &StringRecord, line: u64) -> Result<Page, PipelineError> {
        match (record.get(0), record.get(1), record.get(2)) {
            (Some(slug), Some(title), Some(description)) => Ok(Page {
                slug: slug.to_string(),
                title: title.to_string(),
                description: description.to_string(),
            }),
            _ => Err(PipelineError::Mapping {
                line,
                fields: record.len(),
            }),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Skip the header row and map every data row to a [`Page`], preserving order.
/// The first malformed row aborts the mapping.
pub fn pages_from_records(records: &[StringRecord]) -> Result<Vec<Page>, PipelineError> {
    records
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, record)| {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 1);
            Page::from_record(record, line)
        })
        .collect()
}

/// A slug is safe when it names exactly one file inside the output directory.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}

/// Slugs used by more than one page, in order of first appearance.
pub fn duplicate_slugs(pages: &[Page]) -> Vec<&str> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut dups = Vec::new();
    for page in pages {
        let count = seen.entry(page.slug.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            dups.push(page.slug.as_str());
        }
    }
    dups
}
