//! Trailing-comment decoder: validity marker, alias lists, field payloads,
//! and field-schema declarations.
//!
//! There is no grammar here on purpose. The encodings are positional and
//! delimiter-driven, and every malformed fragment degrades to "nothing
//! extracted" rather than an error, so a half-annotated const block still
//! generates as much as it can.
//!
//! The alias/payload boundary is the one genuinely fragile rule and lives
//! entirely in [`split_alias_payload`]:
//! - empty text → identifier stands, no payload
//! - leading `"` → quoted primary alias, then an optional comma-led alias
//!   list, then an optional payload starting at the next quoted span
//! - no spaces → the whole token is the alias
//! - otherwise → first whitespace-delimited token is the alias, the rest is
//!   payload

use crate::model::{Field, TypeTag};

/// Marker token whose presence flags a member as the sentinel value.
pub const DEFAULT_INVALID_MARKER: &str = "invalid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMember {
    pub valid: bool,
    /// First alias is canonical. Never empty.
    pub aliases: Vec<String>,
    /// Raw payload tokens, trimmed and unquoted, not yet coerced.
    pub payload: Vec<String>,
}

/// Decode one member's trailing comment. `ident` is the member's own
/// identifier, used whenever no alias override applies.
pub fn decode_member(raw: &str, ident: &str, marker: &str) -> DecodedMember {
    let mut valid = true;
    let mut text = raw.trim().to_string();
    if !marker.is_empty() && text.contains(marker) {
        valid = false;
        text = text.replacen(marker, "", 1);
    }
    let text = text.trim();

    let (aliases, payload) = split_alias_payload(text, ident, marker);
    DecodedMember { valid, aliases, payload }
}

fn split_alias_payload(text: &str, ident: &str, marker: &str) -> (Vec<String>, Vec<String>) {
    if text.is_empty() {
        return (vec![ident.to_string()], Vec::new());
    }

    if text.starts_with('"') {
        return split_quoted_lead(text, ident);
    }

    if !text.contains(' ') {
        // Whole token is the alias, unless the marker survived stripping
        // (it can appear twice); then the identifier stands.
        if !marker.is_empty() && text.contains(marker) {
            return (vec![ident.to_string()], Vec::new());
        }
        return (vec![text.to_string()], Vec::new());
    }

    // First whitespace-delimited token is the alias, remainder is payload.
    let (head, tail) = match text.split_once(' ') {
        Some(pair) => pair,
        None => (text, ""),
    };
    (vec![head.to_string()], split_payload(tail))
}

/// Quoted-lead form: `"primary"[, alias[, alias...]] ["payload,..."]`.
fn split_quoted_lead(text: &str, ident: &str) -> (Vec<String>, Vec<String>) {
    let Some((primary, mut rest)) = take_quoted(text) else {
        // Unterminated quote: treat everything after it as a plain alias.
        let bare = text.trim_matches('"').trim();
        if bare.is_empty() {
            return (vec![ident.to_string()], Vec::new());
        }
        return (vec![bare.to_string()], Vec::new());
    };

    let mut aliases = vec![primary];
    rest = rest.trim_start();

    while let Some(after_comma) = rest.strip_prefix(',') {
        rest = after_comma.trim_start();
        if rest.is_empty() {
            break;
        }
        if rest.starts_with('"') {
            match take_quoted(rest) {
                Some((alias, r)) => {
                    aliases.push(alias);
                    rest = r.trim_start();
                }
                None => {
                    rest = "";
                    break;
                }
            }
        } else {
            // Bare alias token: ends at the next comma, or at the first
            // quote, which starts the payload.
            let stop = rest
                .char_indices()
                .find(|&(_, c)| c == ',' || c == '"')
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let token = rest[..stop].trim();
            if !token.is_empty() {
                aliases.push(token.to_string());
            }
            rest = &rest[stop..];
            if rest.starts_with('"') {
                break;
            }
        }
    }

    let rest = rest.trim();
    let payload = if rest.is_empty() { Vec::new() } else { split_payload(rest) };
    (aliases, payload)
}

/// Comma-split a payload, trimming and unquoting each piece.
fn split_payload(s: &str) -> Vec<String> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',').map(|piece| unquote(piece.trim()).to_string()).collect()
}

/// Strip one pair of surrounding double quotes, if present.
fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Take the leading quoted span of `s` (which must start with `"`).
/// Returns the unquoted content and the remainder after the closing quote.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    debug_assert!(s.starts_with('"'));
    let inner = &s[1..];
    let close = inner.find('"')?;
    Some((inner[..close].to_string(), &inner[close + 1..]))
}

/// Parse a type-level schema comment into `(name, type)` fields.
///
/// Three piece syntaxes: `Name Type`, `Name[Type]`, `Name(Type)`. Malformed
/// pieces (no delimiter, missing closer, empty name or type, unknown type
/// tag) are skipped without aborting the rest.
pub fn decode_schema(raw: &str) -> Vec<Field> {
    let mut out = Vec::new();
    for piece in raw.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let (name, ty) = if let Some(open) = piece.find('[') {
            let Some(close) = piece[open + 1..].find(']') else { continue };
            (&piece[..open], &piece[open + 1..open + 1 + close])
        } else if let Some(open) = piece.find('(') {
            let Some(close) = piece[open + 1..].find(')') else { continue };
            (&piece[..open], &piece[open + 1..open + 1 + close])
        } else if let Some(space) = piece.find(' ') {
            (&piece[..space], &piece[space + 1..])
        } else {
            continue;
        };
        let name = name.trim();
        let ty = ty.trim();
        if name.is_empty() || ty.is_empty() {
            continue;
        }
        let Some(tag) = TypeTag::parse(ty) else { continue };
        out.push(Field { name: name.to_string(), tag });
    }
    out
}
