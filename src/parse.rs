//! Enum extraction: walk a parsed Go file and assemble `EnumGroup`s.
//!
//! One pass per source unit, no shared state between units. Cancellation is
//! checked at entry, after reading content, and after tree construction;
//! the member loop itself is CPU-bound and runs to completion. A panic
//! anywhere inside extraction is caught at this boundary and reported as an
//! internal fault for the one unit, never crossing into sibling parses.

pub mod ast;
pub mod comment;
pub mod lex;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::coerce::coerce;
use crate::error::ParseFailure;
use crate::model::{EnumGroup, EnumMember, Field};
use crate::parse::ast::{BinOp, ConstBlock, Decl, Expr, File};
use crate::parse::comment::{decode_member, decode_schema, DEFAULT_INVALID_MARKER};
use crate::source::Source;

// ------------------------------ Context ----------------------------------- //

/// Cooperative cancellation signal shared with an outer driver.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Explicit per-run context threaded into the walker; replaces any global
/// logging/version side channel.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub version: &'static str,
    /// Marker token that flags a member comment as the invalid sentinel.
    pub marker: String,
    pub cancel: CancelToken,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            version: crate::VERSION,
            marker: DEFAULT_INVALID_MARKER.to_string(),
            cancel: CancelToken::new(),
        }
    }
}

/// Everything extracted from one source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub package: String,
    pub groups: Vec<EnumGroup>,
}

// ------------------------------ Front API --------------------------------- //

pub fn parse_source(source: &dyn Source, ctx: &ParseContext) -> Result<Extraction, ParseFailure> {
    let filename = source.filename().to_string();

    if ctx.cancel.is_cancelled() {
        return Err(ParseFailure::Cancelled);
    }

    let bytes = source.content().map_err(|source| ParseFailure::Read {
        filename: filename.clone(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    if ctx.cancel.is_cancelled() {
        return Err(ParseFailure::Cancelled);
    }

    let tokens = lex::lex(&text).map_err(|source| ParseFailure::Syntax {
        filename: filename.clone(),
        source,
    })?;
    let file = ast::parse_file(&tokens).map_err(|source| ParseFailure::Syntax {
        filename: filename.clone(),
        source,
    })?;

    if ctx.cancel.is_cancelled() {
        return Err(ParseFailure::Cancelled);
    }

    let groups = catch_unwind(AssertUnwindSafe(|| extract_groups(&file, ctx))).map_err(|panic| {
        let message = panic_message(panic);
        tracing::error!(
            version = ctx.version,
            file = %filename,
            "parser fault during extraction: {message}"
        );
        ParseFailure::Internal { filename: filename.clone(), message }
    })?;

    if groups.is_empty() {
        return Err(ParseFailure::NoEnumsFound { filename });
    }

    tracing::debug!(file = %filename, groups = groups.len(), "extraction complete");
    Ok(Extraction { package: file.package.clone(), groups })
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ------------------------------- Walker ----------------------------------- //

fn extract_groups(file: &File, ctx: &ParseContext) -> Vec<EnumGroup> {
    // Pass 1: type comments carry the field schemas. Insertion order is
    // kept so re-extraction is structurally identical.
    let mut schemas: IndexMap<&str, Vec<Field>> = IndexMap::new();
    for decl in &file.decls {
        if let Decl::Type(t) = decl {
            if let Some(comment) = &t.comment {
                let fields = decode_schema(comment);
                if !fields.is_empty() {
                    schemas.insert(t.name.as_str(), fields);
                }
            }
        }
    }

    // Pass 2: const blocks accumulate members into groups keyed by type
    // name; several blocks may feed one logical enumeration.
    let mut groups: IndexMap<String, EnumGroup> = IndexMap::new();
    for decl in &file.decls {
        let Decl::Const(block) = decl else { continue };
        walk_const_block(block, &schemas, &mut groups, ctx);
    }

    groups
        .into_values()
        .filter(|g| !g.members.is_empty())
        .collect()
}

fn walk_const_block(
    block: &ConstBlock,
    schemas: &IndexMap<&str, Vec<Field>>,
    groups: &mut IndexMap<String, EnumGroup>,
    ctx: &ParseContext,
) {
    let Some(first) = block.specs.first() else { return };

    // Admission: the first initializer must be iota or iota <op> literal.
    let start = match &first.init {
        Some(Expr::Iota) => 0,
        Some(Expr::IotaBinary { op, operand }) => match eval_start(*op, *operand) {
            Some(v) => v,
            None => return,
        },
        _ => return,
    };
    let Some(type_name) = first.type_name.as_deref() else { return };

    let schema = schemas.get(type_name).cloned().unwrap_or_default();
    let group = groups
        .entry(type_name.to_string())
        .or_insert_with(|| EnumGroup {
            type_name: type_name.to_string(),
            start_index: start,
            field_schema: schema.clone(),
            members: Vec::new(),
        });

    // iota advances once per spec line; every name on a line shares the
    // slot, and `_` consumes the slot without producing a member.
    let mut slot: i64 = 0;
    for spec in &block.specs {
        let ordinal = start + slot;
        slot += 1;
        for name in &spec.names {
            if name == "_" {
                continue;
            }
            let decoded = match &spec.comment {
                Some(c) => decode_member(c, name, &ctx.marker),
                None => decode_member("", name, &ctx.marker),
            };
            let field_values = decoded
                .payload
                .iter()
                .zip(schema.iter())
                .map(|(raw, field)| coerce(field.tag, raw))
                .collect();
            group.members.push(EnumMember {
                name: name.clone(),
                ordinal,
                valid: decoded.valid,
                aliases: decoded.aliases,
                field_values,
            });
        }
    }
}

/// Start index for `iota <op> literal` with iota = 0 on the first line.
fn eval_start(op: BinOp, operand: i64) -> Option<i64> {
    match op {
        BinOp::Add => Some(operand),
        BinOp::Sub => Some(-operand),
        BinOp::Mul => Some(0),
        BinOp::Div => {
            if operand == 0 {
                None
            } else {
                Some(0)
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeTag;
    use crate::source::MemorySource;

    fn parse(src: &str) -> Extraction {
        let source = MemorySource::new("test.go", src);
        parse_source(&source, &ParseContext::default()).unwrap()
    }

    fn parse_err(src: &str) -> ParseFailure {
        let source = MemorySource::new("test.go", src);
        parse_source(&source, &ParseContext::default()).unwrap_err()
    }

    #[test]
    fn plain_members_get_sequential_ordinals() {
        let out = parse(
            "package validator\n\
             type status int\n\
             const (\n\
             \tfailed status = iota\n\
             \tpassed\n\
             \tskipped\n\
             )\n",
        );
        assert_eq!(out.package, "validator");
        assert_eq!(out.groups.len(), 1);
        let g = &out.groups[0];
        assert_eq!(g.type_name, "status");
        assert_eq!(g.start_index, 0);
        assert_eq!(g.members.len(), 3);
        for (i, (m, name)) in g.members.iter().zip(["failed", "passed", "skipped"]).enumerate() {
            assert_eq!(m.name, name);
            assert_eq!(m.ordinal, i as i64);
            assert!(m.valid);
            assert_eq!(m.aliases, vec![name.to_string()]);
            assert!(m.field_values.is_empty());
        }
    }

    #[test]
    fn invalid_marker_clears_validity() {
        let out = parse(
            "package p\n\
             type status int\n\
             const (\n\
             \tunknown status = iota // invalid\n\
             \tactive\n\
             )\n",
        );
        let g = &out.groups[0];
        assert_eq!(g.members.len(), 2);
        assert!(!g.members[0].valid);
        assert_eq!(g.members[0].ordinal, 0);
        assert!(g.members[1].valid);
        assert_eq!(g.members[1].ordinal, 1);
    }

    #[test]
    fn schema_and_payload_align() {
        let out = parse(
            "package astro\n\
             type planet int // Gravity[float64]\n\
             const (\n\
             \tmercury planet = iota // Mercury 0.378\n\
             )\n",
        );
        let g = &out.groups[0];
        assert_eq!(g.field_schema.len(), 1);
        assert_eq!(g.field_schema[0].name, "Gravity");
        assert_eq!(g.field_schema[0].tag, TypeTag::Float64);
        assert_eq!(g.members[0].aliases, vec!["Mercury"]);
        assert_eq!(g.members[0].field_values, vec!["0.378"]);
    }

    #[test]
    fn non_iota_block_is_skipped() {
        let err = parse_err(
            "package p\n\
             type status int\n\
             const (\n\
             \ta status = 5\n\
             \tb\n\
             )\n",
        );
        assert!(matches!(err, ParseFailure::NoEnumsFound { .. }));
    }

    #[test]
    fn skip_identifier_consumes_a_slot() {
        let out = parse(
            "package p\n\
             type level int\n\
             const (\n\
             \tlow level = iota\n\
             \t_\n\
             \thigh\n\
             )\n",
        );
        let g = &out.groups[0];
        assert_eq!(g.members.len(), 2);
        assert_eq!(g.members[0].ordinal, 0);
        assert_eq!(g.members[1].ordinal, 2);
    }

    #[test]
    fn arithmetic_start_offsets() {
        let out = parse(
            "package p\n\
             type a int\n\
             type b int\n\
             const (\n\
             \tx a = iota + 1\n\
             \ty\n\
             )\n\
             const (\n\
             \tp b = iota - 1\n\
             \tq\n\
             )\n",
        );
        assert_eq!(out.groups[0].start_index, 1);
        assert_eq!(out.groups[0].members[0].ordinal, 1);
        assert_eq!(out.groups[0].members[1].ordinal, 2);
        assert_eq!(out.groups[1].start_index, -1);
        assert_eq!(out.groups[1].members[0].ordinal, -1);
        assert_eq!(out.groups[1].members[1].ordinal, 0);
    }

    #[test]
    fn blocks_sharing_a_type_merge() {
        let out = parse(
            "package p\n\
             type status int\n\
             const (\n\
             \ta status = iota\n\
             )\n\
             const (\n\
             \tb status = iota + 1\n\
             )\n",
        );
        assert_eq!(out.groups.len(), 1);
        let g = &out.groups[0];
        assert_eq!(g.members.len(), 2);
        assert_eq!(g.start_index, 0); // first block wins
        assert_eq!(g.members[1].ordinal, 1); // second block's own start
    }

    #[test]
    fn unknown_type_still_produces_members() {
        let out = parse(
            "package p\n\
             const (\n\
             \ta mystery = iota // Alias 1,2\n\
             )\n",
        );
        let g = &out.groups[0];
        assert_eq!(g.type_name, "mystery");
        assert!(g.field_schema.is_empty());
        assert_eq!(g.members[0].aliases, vec!["Alias"]);
        // no schema to zip against
        assert!(g.members[0].field_values.is_empty());
    }

    #[test]
    fn partial_payload_is_tolerated() {
        let out = parse(
            "package p\n\
             type planet int // Gravity[float64], RadiusKm[float64]\n\
             const (\n\
             \tmercury planet = iota // Mercury 0.378\n\
             \tvenus // Venus 0.907, 6051.8\n\
             )\n",
        );
        let g = &out.groups[0];
        assert_eq!(g.members[0].field_values, vec!["0.378"]);
        assert_eq!(g.members[1].field_values, vec!["0.907", "6051.8"]);
    }

    #[test]
    fn excess_payload_is_truncated_to_schema() {
        let out = parse(
            "package p\n\
             type planet int // Gravity[float64]\n\
             const (\n\
             \tmercury planet = iota // Mercury 0.378, 6051.8, true\n\
             )\n",
        );
        assert_eq!(out.groups[0].members[0].field_values, vec!["0.378"]);
    }

    #[test]
    fn type_after_const_block_still_supplies_schema() {
        let out = parse(
            "package p\n\
             const (\n\
             \tmercury planet = iota // Mercury 0.378\n\
             )\n\
             type planet int // Gravity[float64]\n",
        );
        assert_eq!(out.groups[0].field_schema.len(), 1);
        assert_eq!(out.groups[0].members[0].field_values, vec!["0.378"]);
    }

    #[test]
    fn ordinal_monotonicity_across_multi_name_lines() {
        let out = parse(
            "package p\n\
             type t int\n\
             const (\n\
             \ta t = iota\n\
             \tb, c\n\
             \td\n\
             )\n",
        );
        let g = &out.groups[0];
        let ordinals: Vec<i64> = g.members.iter().map(|m| m.ordinal).collect();
        // b and c share one iota slot, Go-style
        assert_eq!(ordinals, vec![0, 1, 1, 2]);
    }

    #[test]
    fn re_extraction_is_idempotent() {
        let src = "package p\n\
                   type status int // Weight[int]\n\
                   const (\n\
                   \tunknown status = iota // invalid\n\
                   \tactive // \"Active\", on 10\n\
                   \t_\n\
                   \tdone\n\
                   )\n";
        let a = parse(src);
        let b = parse(src);
        assert_eq!(a, b);
    }

    #[test]
    fn no_enums_found_is_distinct() {
        let err = parse_err("package p\nfunc main() {}\n");
        assert!(matches!(err, ParseFailure::NoEnumsFound { .. }));
    }

    #[test]
    fn syntax_failure_is_reported() {
        let err = parse_err("func main() {}\n");
        assert!(matches!(err, ParseFailure::Syntax { .. }));
    }

    #[test]
    fn read_failure_is_reported() {
        let source = crate::source::FileSource::new("/definitely/not/here.go");
        let err = parse_source(&source, &ParseContext::default()).unwrap_err();
        assert!(matches!(err, ParseFailure::Read { .. }));
    }

    #[test]
    fn cancellation_is_observed_at_entry() {
        let ctx = ParseContext::default();
        ctx.cancel.cancel();
        let source = MemorySource::new("test.go", "package p\n");
        let err = parse_source(&source, &ctx).unwrap_err();
        assert!(matches!(err, ParseFailure::Cancelled));
    }

    #[test]
    fn custom_marker_threads_through() {
        let ctx = ParseContext { marker: "sentinel".to_string(), ..Default::default() };
        let source = MemorySource::new(
            "test.go",
            "package p\n\
             type s int\n\
             const (\n\
             \tnone s = iota // sentinel\n\
             \tsome\n\
             )\n",
        );
        let out = parse_source(&source, &ctx).unwrap();
        assert!(!out.groups[0].members[0].valid);
        assert!(out.groups[0].members[1].valid);
    }
}
