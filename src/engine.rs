//! G3 — Engine.
//!
//! Ties the kernel together into something an application actually calls:
//! install a batch of records under a set of field paths, then search them
//! with a query string and get back ranked, highlighted results.

use crate::aggregate::score_item;
use crate::align::{align_highlight, AlignRange};
use crate::assignment::solve_assignment;
use crate::config::Options;
use crate::field_score::build_score_matrix;
use crate::normalize::{normalize, tokenize};
use crate::query::Query;
use crate::record::FieldSource;
use crate::util::join_tokens_with_offsets;
use tracing::debug;

/// One record plus its pre-tokenised field text, ready to be scored
/// against any number of queries without re-normalising the record.
struct IndexedRecord<T> {
    record: T,
    sort_key: usize,
    fields: Vec<Vec<Vec<char>>>,
}

/// A ranked search hit.
pub struct SearchResult<'a, T> {
    pub record: &'a T,
    pub score: f64,
    /// Highlight ranges for the best-scoring field, paired with that
    /// field's space-joined, normalised display text (the same text the
    /// scorer saw — not the record's original, pre-normalisation text).
    pub highlight: Option<(String, Vec<AlignRange>)>,
}

/// An installed, searchable collection of records of type `T`.
pub struct Engine<T> {
    field_paths: Vec<String>,
    records: Vec<IndexedRecord<T>>,
    opts: Options,
}

impl<T: FieldSource> Engine<T> {
    pub fn new(opts: Options) -> Self {
        Engine {
            field_paths: Vec::new(),
            records: Vec::new(),
            opts,
        }
    }

    /// Normalise and tokenise `records` under `field_paths`, replacing any
    /// previously installed records.
    pub fn install(&mut self, records: Vec<T>, field_paths: &[&str]) {
        self.field_paths = field_paths.iter().map(|s| s.to_string()).collect();
        self.records = records
            .into_iter()
            .enumerate()
            .map(|(sort_key, record)| {
                let fields: Vec<Vec<Vec<char>>> = self
                    .field_paths
                    .iter()
                    .map(|path| {
                        record
                            .extract(path)
                            .iter()
                            .flat_map(|leaf| {
                                let normalized = normalize(leaf);
                                tokenize(
                                    &normalized,
                                    self.opts.token_field_min_length,
                                    self.opts.token_field_max_length,
                                )
                            })
                            .collect()
                    })
                    .collect();
                IndexedRecord {
                    record,
                    sort_key,
                    fields,
                }
            })
            .collect();
        debug!(count = self.records.len(), "installed records");
    }

    /// Rank every installed record against `query_str`. Returns an empty
    /// list for an empty (post-normalisation) query.
    pub fn search(&self, query_str: &str) -> Vec<SearchResult<'_, T>> {
        let query = Query::prepare(query_str, &self.opts);
        if query.tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, f64, usize, Option<usize>)> = Vec::new(); // (index, score, sort_key, best_field)
        let mut best_so_far = 0.0f64;

        for (idx, indexed) in self.records.iter().enumerate() {
            let scored = score_item(&query, &indexed.fields, &self.opts);
            if scored.total > best_so_far {
                best_so_far = scored.total;
            }
            let threshold =
                (best_so_far * self.opts.thresh_relative_to_best).max(self.opts.thresh_include);
            if scored.total >= threshold {
                hits.push((idx, scored.total, indexed.sort_key, scored.best_field_index));
            }
        }

        // Earlier inclusions are never retroactively dropped even if a
        // later, higher-scoring item raises the running threshold; the
        // comparator below still ranks everything by score first.
        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap()
                .then_with(|| a.2.cmp(&b.2))
        });

        if self.opts.output_limit > 0 {
            hits.truncate(self.opts.output_limit);
        }

        hits.into_iter()
            .map(|(idx, score, _, best_field_index)| {
                let indexed = &self.records[idx];
                let highlight = best_field_index
                    .and_then(|field_idx| indexed.fields.get(field_idx))
                    .filter(|tokens| !tokens.is_empty())
                    .and_then(|tokens| highlight_field(&query, tokens, &self.opts));

                SearchResult {
                    record: &indexed.record,
                    score,
                    highlight,
                }
            })
            .collect()
    }
}

/// On-demand highlighting for one field: C5 picks the best one-to-one
/// pairing between query tokens and this field's tokens, then C8 locates
/// the substring ranges worth marking for each paired token, translated
/// into offsets within the field's space-joined display text.
fn highlight_field(query: &Query, tokens: &[Vec<char>], opts: &Options) -> Option<(String, Vec<AlignRange>)> {
    let matrix = build_score_matrix(query, tokens, opts);
    let assignment = solve_assignment(&matrix, opts);

    let (display_chars, offsets) = join_tokens_with_offsets(tokens);

    let mut ranges: Vec<AlignRange> = Vec::new();
    for (query_idx, field_col) in assignment.mapping.iter().enumerate() {
        let Some(col) = field_col else { continue };
        let Some(query_token) = query.tokens.get(query_idx) else { continue };
        let Some(field_token) = tokens.get(*col) else { continue };
        let offset = offsets[*col];
        for r in align_highlight(query_token, field_token, &opts.align) {
            ranges.push(AlignRange {
                start: r.start + offset,
                end: r.end + offset,
            });
        }
    }

    if ranges.is_empty() {
        return None;
    }

    ranges.sort_by_key(|r| r.start);
    let merged = merge_ranges(ranges);
    let display: String = display_chars.into_iter().collect();
    Some((display, merged))
}

/// Merge overlapping or touching ranges produced by separately-aligned
/// token pairs into a minimal, left-to-right ordered set.
fn merge_ranges(ranges: Vec<AlignRange>) -> Vec<AlignRange> {
    let mut out: Vec<AlignRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        if let Some(last) = out.last_mut() {
            if r.start <= last.end {
                last.end = last.end.max(r.end);
                continue;
            }
        }
        out.push(r);
    }
    out
}
