//! Declarative field mapping from source records to destination payloads.
//!
//! A mapping entry translates one destination field from either a plain
//! source column reference or a template string with `{column}` placeholders.
//! Expressions are compiled once at startup; rendering is pure and never
//! fails: an absent source column renders as the empty string.

use listsync_config::shared::MappingConfig;

use crate::types::{ItemPayload, SourceRecord, value_to_string};

/// One parsed source expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceExpr {
    /// Direct reference to a source column.
    Column(String),
    /// Template interleaving literal text and column placeholders.
    Template(Vec<TemplateSegment>),
}

/// One segment of a template expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateSegment {
    Literal(String),
    Placeholder(String),
}

/// Compiled field-mapping rules for one collection.
///
/// Construct once from configuration via [`FieldMapping::from_config`] and
/// share by reference across passes.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    key_column: String,
    key_field: String,
    fields: Vec<(String, SourceExpr)>,
}

impl FieldMapping {
    /// Compiles the mapping rules from their configuration form.
    pub fn from_config(config: &MappingConfig) -> Self {
        let fields = config
            .fields
            .iter()
            .map(|(field, raw)| (field.clone(), parse_expr(raw)))
            .collect();

        Self {
            key_column: config.key_column.clone(),
            key_field: config.key_field.clone(),
            fields,
        }
    }

    /// Source column holding the reconciliation key.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Destination field holding the reconciliation key.
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Renders the destination payload for one source record.
    ///
    /// Rendering is pure and deterministic. Template expressions substitute
    /// every placeholder with the stringified column value; if any referenced
    /// column is absent the whole rendered value becomes the empty string.
    /// Plain column references render the column value directly, or the empty
    /// string when the column is absent.
    pub fn render(&self, record: &SourceRecord) -> ItemPayload {
        let mut payload = ItemPayload::new();

        for (field, expr) in &self.fields {
            let value = match expr {
                SourceExpr::Column(column) => record
                    .get(column)
                    .map(value_to_string)
                    .unwrap_or_default(),
                SourceExpr::Template(segments) => {
                    render_template(segments, record).unwrap_or_default()
                }
            };

            payload.insert(field.clone(), value);
        }

        payload
    }
}

/// Parses a raw source expression into its compiled form.
///
/// An expression containing both `{` and `}` is treated as a template;
/// anything else is a plain column reference.
fn parse_expr(raw: &str) -> SourceExpr {
    if !(raw.contains('{') && raw.contains('}')) {
        return SourceExpr::Column(raw.to_string());
    }

    let mut segments = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            // Unbalanced brace: keep the remainder as literal text.
            break;
        };

        if open > 0 {
            segments.push(TemplateSegment::Literal(rest[..open].to_string()));
        }

        segments.push(TemplateSegment::Placeholder(
            rest[open + 1..open + close].to_string(),
        ));
        rest = &rest[open + close + 1..];
    }

    if !rest.is_empty() {
        segments.push(TemplateSegment::Literal(rest.to_string()));
    }

    SourceExpr::Template(segments)
}

/// Renders a template against a record.
///
/// Returns `None` as soon as any referenced column is absent, which the
/// caller turns into an empty rendered value.
fn render_template(segments: &[TemplateSegment], record: &SourceRecord) -> Option<String> {
    let mut out = String::new();

    for segment in segments {
        match segment {
            TemplateSegment::Literal(text) => out.push_str(text),
            TemplateSegment::Placeholder(column) => {
                out.push_str(&value_to_string(record.get(column)?));
            }
        }
    }

    Some(out)
}
