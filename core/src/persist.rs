use crate::error::{Error, Result};
use crate::index::{compute_doc_norms, InvertedIndex, TermEntry};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

const FORMAT_VERSION: u32 = 1;

/// On-disk shape of a built index: one bincode blob holding the term
/// table, document count, and document-length table. Vector norms are
/// derived data and recomputed on load.
#[derive(Serialize, Deserialize)]
struct IndexBlob {
    version: u32,
    n_docs: u32,
    doc_lengths: HashMap<DocId, u32>,
    entries: HashMap<String, TermEntry>,
}

impl InvertedIndex {
    /// Serialize the whole index to `path` as a single unit. The blob is
    /// staged to a sibling temp file and renamed into place, so `path`
    /// never holds a partially written index.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let blob = IndexBlob {
            version: FORMAT_VERSION,
            n_docs: self.n_docs,
            doc_lengths: self.doc_lengths.clone(),
            entries: self.entries.clone(),
        };
        let bytes = bincode::serialize(&blob)?;
        let staging = path.with_extension("tmp");
        fs::write(&staging, &bytes)?;
        fs::rename(&staging, path)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "index saved");
        Ok(())
    }

    /// Load a previously saved index. The blob is validated structurally
    /// before any query can run; a failed check is `Error::CorruptIndex`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut f = File::open(path.as_ref())?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        let blob: IndexBlob = bincode::deserialize(&buf)
            .map_err(|e| Error::CorruptIndex(format!("undecodable blob: {e}")))?;
        let index = validate(blob)?;
        tracing::info!(
            path = %path.as_ref().display(),
            n_docs = index.n_docs,
            n_terms = index.entries.len(),
            "index loaded"
        );
        Ok(index)
    }
}

fn validate(blob: IndexBlob) -> Result<InvertedIndex> {
    if blob.version != FORMAT_VERSION {
        return Err(Error::CorruptIndex(format!(
            "unsupported format version {}",
            blob.version
        )));
    }
    if blob.doc_lengths.len() as u32 != blob.n_docs {
        return Err(Error::CorruptIndex(format!(
            "document count {} does not match length table of {} entries",
            blob.n_docs,
            blob.doc_lengths.len()
        )));
    }
    for (term, entry) in &blob.entries {
        if *term != entry.term {
            return Err(Error::CorruptIndex(format!(
                "term table key {term:?} holds entry for {:?}",
                entry.term
            )));
        }
        if entry.sorted_doc_ids.len() != entry.postings.len() {
            return Err(Error::CorruptIndex(format!(
                "term {term:?}: sorted view out of sync with postings"
            )));
        }
        if !entry.sorted_doc_ids.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::CorruptIndex(format!(
                "term {term:?}: doc ids not strictly ascending"
            )));
        }
        if let Some(stray) = entry
            .sorted_doc_ids
            .iter()
            .find(|id| !entry.postings.contains_key(*id))
        {
            return Err(Error::CorruptIndex(format!(
                "term {term:?}: sorted view lists doc {stray} with no posting"
            )));
        }
        for (&doc_id, posting) in &entry.postings {
            if posting.doc_id != doc_id {
                return Err(Error::CorruptIndex(format!(
                    "term {term:?}: posting keyed by {doc_id} claims doc {}",
                    posting.doc_id
                )));
            }
            let Some(&len) = blob.doc_lengths.get(&doc_id) else {
                return Err(Error::CorruptIndex(format!(
                    "term {term:?}: posting references unknown doc {doc_id}"
                )));
            };
            if posting.positions.is_empty() {
                return Err(Error::CorruptIndex(format!(
                    "term {term:?}: empty posting for doc {doc_id}"
                )));
            }
            if !posting.positions.windows(2).all(|w| w[0] < w[1]) {
                return Err(Error::CorruptIndex(format!(
                    "term {term:?}: positions not strictly ascending in doc {doc_id}"
                )));
            }
            if posting.positions.last().is_some_and(|&p| p >= len) {
                return Err(Error::CorruptIndex(format!(
                    "term {term:?}: position past end of doc {doc_id} (length {len})"
                )));
            }
        }
    }
    let doc_norms = compute_doc_norms(&blob.entries, blob.n_docs);
    Ok(InvertedIndex {
        entries: blob.entries,
        n_docs: blob.n_docs,
        doc_lengths: blob.doc_lengths,
        doc_norms,
    })
}
