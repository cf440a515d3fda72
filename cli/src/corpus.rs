//! Parsers for the Cranfield-style collection files: the document
//! collection, the query file, and the relevance judgments.
//!
//! Collection and query files share a marker format: `.I <id>` opens a
//! record, `.T`/`.A`/`.B`/`.W` switch to title, author, bibliography, and
//! body sections. The bibliography section is read and discarded.

use anyhow::{bail, Context, Result};
use retriever_core::eval::Qrels;
use retriever_core::{Document, Query};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy)]
enum Section {
    None,
    Title,
    Author,
    Bibliography,
    Body,
}

struct RawRecord {
    id: u32,
    title: String,
    author: String,
    body: String,
}

fn parse_marker_file(path: &Path) -> Result<Vec<RawRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut records: Vec<RawRecord> = Vec::new();
    let mut current: Option<RawRecord> = None;
    let mut section = Section::None;

    for (lineno, line) in text.lines().enumerate() {
        if let Some(id_text) = line.strip_prefix(".I ") {
            if let Some(done) = current.take() {
                records.push(done);
            }
            let id: u32 = id_text
                .trim()
                .parse()
                .with_context(|| format!("{}:{}: bad record id", path.display(), lineno + 1))?;
            current = Some(RawRecord {
                id,
                title: String::new(),
                author: String::new(),
                body: String::new(),
            });
            section = Section::None;
            continue;
        }
        match line.trim_end() {
            ".T" => section = Section::Title,
            ".A" => section = Section::Author,
            ".B" => section = Section::Bibliography,
            ".W" => section = Section::Body,
            content => {
                let Some(record) = current.as_mut() else {
                    continue;
                };
                let field = match section {
                    Section::Title => &mut record.title,
                    Section::Author => &mut record.author,
                    Section::Body => &mut record.body,
                    Section::Bibliography | Section::None => continue,
                };
                if !field.is_empty() {
                    field.push(' ');
                }
                field.push_str(content.trim());
            }
        }
    }
    if let Some(done) = current.take() {
        records.push(done);
    }
    if records.is_empty() {
        bail!("{}: no records found", path.display());
    }
    Ok(records)
}

/// Parse the document collection file.
pub fn load_collection(path: &Path) -> Result<Vec<Document>> {
    let docs = parse_marker_file(path)?
        .into_iter()
        .map(|r| Document {
            id: r.id,
            title: r.title,
            author: r.author,
            body: r.body,
        })
        .collect::<Vec<_>>();
    tracing::info!(path = %path.display(), n_docs = docs.len(), "collection loaded");
    Ok(docs)
}

/// Parse the query file. Queries carry only an id and body text.
pub fn load_queries(path: &Path) -> Result<Vec<Query>> {
    let queries = parse_marker_file(path)?
        .into_iter()
        .map(|r| Query {
            id: r.id,
            text: r.body,
        })
        .collect::<Vec<_>>();
    tracing::info!(path = %path.display(), n_queries = queries.len(), "queries loaded");
    Ok(queries)
}

/// Parse the relevance judgments file: whitespace-separated lines of
/// `queryOrdinal docID relevanceMarker score`.
///
/// The first column is the query's 1-based position in the query file, not
/// its identifier, so judgments are remapped through `queries` before use.
/// Malformed or out-of-range lines are skipped with a warning.
pub fn load_qrels(path: &Path, queries: &[Query]) -> Result<Qrels> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut qrels = Qrels::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.split_whitespace();
        let parsed = match (cols.next(), cols.next()) {
            (Some(ordinal), Some(doc_id)) => {
                ordinal.parse::<usize>().ok().zip(doc_id.parse::<u32>().ok())
            }
            _ => None,
        };
        let Some((ordinal, doc_id)) = parsed else {
            tracing::warn!(line = lineno + 1, "unparseable judgment line, skipping");
            continue;
        };
        let Some(query) = ordinal.checked_sub(1).and_then(|i| queries.get(i)) else {
            tracing::warn!(line = lineno + 1, ordinal, "judgment for unknown query, skipping");
            continue;
        };
        qrels
            .entry(query.id)
            .or_insert_with(HashSet::new)
            .insert(doc_id);
    }
    tracing::info!(path = %path.display(), n_queries = qrels.len(), "judgments loaded");
    Ok(qrels)
}
