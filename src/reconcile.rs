//! Offset reconciliation for TimeML annotations.
//!
//! HeidelTime copies the annotated text into each `TIMEX3` element but does
//! not report where that text sits in the input. The scan here recovers a
//! half-open `[start, end)` character range for every annotation by searching
//! the container text left to right, never looking behind the end of the
//! previous match. That cursor is what keeps repeated phrases apart:
//!
//! ```text
//! "Monday we met Monday's client"
//!  ^^^^^^        ^^^^^^
//!  t1 [0,6)      t2 [14,20)   second search starts at 6, not 0
//! ```
//!
//! The scan is only correct if annotations arrive in document order. When an
//! annotation's text is missing from the unconsumed suffix, [`MissPolicy`]
//! decides between the compatible fallback (match position 0 relative to the
//! cursor, reported as a [`ScanAnomaly`]) and a hard error.
//!
//! Offsets count Unicode scalar values, not bytes.

use crate::error::{HeidelTimeError, Result};
use crate::markup::{AnnotationTag, ExtractedMarkup, MarkupParser, MarkupSchema, XmlMarkupParser};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};

/// Characters HeidelTime puts between the container tags and the document on each side.
/// TimeML output is always `<TimeML>\n{document}\n</TimeML>`; an upstream that changes
/// this wrapper shifts every offset, so the count is fixed rather than trimmed.
pub const CONTAINER_BOUNDARY_CHARS: usize = 1;

/// Record keys owned by the reconciler; they override same-named attributes
pub const RESERVED_KEYS: [&str; 2] = ["text", "char_pos"];

/// What to do when an annotation's text is not in the unconsumed suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Place the annotation at the cursor, log a warning and record an anomaly
    #[default]
    Lenient,
    /// Fail with `OffsetNotFound` or `OrderViolation`
    Strict,
}

/// One annotation with its recovered position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Attributes copied from the annotation element, in element order
    pub attributes: Vec<(String, String)>,
    pub text: String,
    /// `[start, end)` in characters over the container text
    pub char_pos: [usize; 2],
}

impl AnnotationRecord {
    pub fn start(&self) -> usize {
        self.char_pos[0]
    }

    pub fn end(&self) -> usize {
        self.char_pos[1]
    }

    /// Attribute lookup; reserved keys are not attributes
    pub fn attribute(&self, key: &str) -> Option<&str> {
        if RESERVED_KEYS.contains(&key) {
            return None;
        }
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Flat JSON object: attributes, then `text` and `char_pos`
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in self.visible_attributes() {
            map.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        map.insert("text".to_string(), serde_json::Value::String(self.text.clone()));
        map.insert("char_pos".to_string(), serde_json::json!(self.char_pos));
        serde_json::Value::Object(map)
    }

    fn visible_attributes(&self) -> impl Iterator<Item = &(String, String)> {
        self.attributes
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
    }
}

impl Serialize for AnnotationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let visible: Vec<&(String, String)> = self.visible_attributes().collect();
        let mut map = serializer.serialize_map(Some(visible.len() + 2))?;
        for (key, value) in visible {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("text", &self.text)?;
        map.serialize_entry("char_pos", &self.char_pos)?;
        map.end()
    }
}

/// An annotation that fell back to the cursor position under [`MissPolicy::Lenient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanAnomaly {
    /// Position of the annotation in markup order
    pub index: usize,
    pub text: String,
    /// Cursor offset the fallback placed the annotation at
    pub offset: usize,
    /// The text does occur, but only before the cursor
    pub order_violation: bool,
}

/// Records plus any fallback placements made while scanning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<AnnotationRecord>,
    pub anomalies: Vec<ScanAnomaly>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Scan state: byte position into the container text and the characters consumed so far.
/// `offset` always equals the character count of `text[..pos]`.
#[derive(Debug, Clone, Copy)]
struct ScanCursor<'a> {
    text: &'a str,
    pos: usize,
    offset: usize,
}

impl<'a> ScanCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0, offset: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn consumed(&self) -> &'a str {
        &self.text[..self.pos]
    }

    /// Moves past `bytes` bytes of the remaining text, which hold `chars` characters
    fn advance(self, bytes: usize, chars: usize) -> Self {
        Self {
            text: self.text,
            pos: self.pos + bytes,
            offset: self.offset + chars,
        }
    }
}

/// Strips [`CONTAINER_BOUNDARY_CHARS`] characters from each end of the container text
pub fn strip_container_boundary(container_text: &str) -> &str {
    let n = CONTAINER_BOUNDARY_CHARS;
    if container_text.chars().count() <= 2 * n {
        return "";
    }
    let start = container_text
        .char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(container_text.len());
    let end = container_text
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(start);
    &container_text[start..end]
}

/// Byte length of the first `chars` characters of `text`, clamped to its end
fn byte_len_of_chars(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// One step of the scan: locate `tag` after the cursor, emit its record, advance.
fn scan_step<'a>(
    cursor: ScanCursor<'a>,
    index: usize,
    tag: &AnnotationTag,
    policy: MissPolicy,
) -> Result<(ScanCursor<'a>, AnnotationRecord, Option<ScanAnomaly>)> {
    let remaining = cursor.remaining();
    let text_chars = tag.text.chars().count();

    let (next, match_chars, anomaly) = match remaining.find(tag.text.as_str()) {
        Some(match_byte) => {
            let match_chars = remaining[..match_byte].chars().count();
            let next = cursor.advance(match_byte + tag.text.len(), match_chars + text_chars);
            (next, match_chars, None)
        }
        None => {
            let order_violation = !tag.text.is_empty() && cursor.consumed().contains(tag.text.as_str());
            if policy == MissPolicy::Strict {
                return Err(if order_violation {
                    HeidelTimeError::OrderViolation {
                        index,
                        text: tag.text.clone(),
                        offset: cursor.offset,
                    }
                } else {
                    HeidelTimeError::OffsetNotFound {
                        index,
                        text: tag.text.clone(),
                        offset: cursor.offset,
                    }
                });
            }

            warn!(
                index,
                text = %tag.text,
                offset = cursor.offset,
                order_violation,
                "Annotation text not found after cursor, placing it at the cursor"
            );

            let skip_bytes = byte_len_of_chars(remaining, text_chars);
            let skip_chars = remaining[..skip_bytes].chars().count();
            let anomaly = ScanAnomaly {
                index,
                text: tag.text.clone(),
                offset: cursor.offset,
                order_violation,
            };
            (cursor.advance(skip_bytes, skip_chars), 0, Some(anomaly))
        }
    };

    let start = cursor.offset + match_chars;
    let record = AnnotationRecord {
        attributes: tag.attributes.clone(),
        text: tag.text.clone(),
        char_pos: [start, start + text_chars],
    };
    debug!(index, start, end = start + text_chars, "Placed annotation");

    Ok((next, record, anomaly))
}

/// Runs the scan over already-stripped text.
///
/// `raw_text` must be the document the tags were produced from; use
/// [`strip_container_boundary`] when starting from a container's flattened text.
pub fn reconcile_tags(raw_text: &str, tags: &[AnnotationTag], policy: MissPolicy) -> Result<Reconciliation> {
    let (_, reconciliation) = tags.iter().enumerate().try_fold(
        (ScanCursor::new(raw_text), Reconciliation::default()),
        |(cursor, mut acc), (index, tag)| {
            let (next, record, anomaly) = scan_step(cursor, index, tag, policy)?;
            acc.records.push(record);
            acc.anomalies.extend(anomaly);
            Ok::<_, HeidelTimeError>((next, acc))
        },
    )?;
    Ok(reconciliation)
}

/// Runs the scan over parser output
pub fn reconcile_extracted(extracted: &ExtractedMarkup, policy: MissPolicy) -> Result<Reconciliation> {
    let raw_text = strip_container_boundary(&extracted.container_text);
    reconcile_tags(raw_text, &extracted.tags, policy)
}

/// Parses markup and reconciles its annotations
#[derive(Debug, Clone)]
pub struct Reconciler<P = XmlMarkupParser> {
    parser: P,
    schema: MarkupSchema,
    policy: MissPolicy,
}

impl Reconciler<XmlMarkupParser> {
    pub fn new() -> Self {
        Self::with_parser(XmlMarkupParser)
    }
}

impl Default for Reconciler<XmlMarkupParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: MarkupParser> Reconciler<P> {
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            schema: MarkupSchema::default(),
            policy: MissPolicy::default(),
        }
    }

    pub fn policy(mut self, policy: MissPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn schema(mut self, schema: MarkupSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn reconcile(&self, markup: &str) -> Result<Reconciliation> {
        let extracted = self.parser.extract(markup, &self.schema)?.ok_or_else(|| {
            HeidelTimeError::malformed_output(format!(
                "no <{}> element in HeidelTime output",
                self.schema.container
            ))
        })?;

        let reconciliation = reconcile_extracted(&extracted, self.policy)?;
        info!(
            annotations = reconciliation.records.len(),
            anomalies = reconciliation.anomalies.len(),
            "Reconciled annotation offsets"
        );
        Ok(reconciliation)
    }
}

/// Reconciles TimeML markup with the default parser, schema and lenient policy
pub fn reconcile(markup: &str) -> Result<Vec<AnnotationRecord>> {
    Reconciler::new().reconcile(markup).map(|r| r.records)
}
