//! Identifier casing and a minimal English pluralizer for generated names.

/// `parse_status` / `parseStatus` / `ParseStatus` → `ParseStatus`.
pub fn pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub fn camel_case(s: &str) -> String {
    let pascal = pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => pascal,
    }
}

/// Good enough for type names; irregular nouns are not worth the weight.
pub fn plural(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let lower = s.to_lowercase();
    if let Some(stem) = s.strip_suffix('y') {
        let before_y = lower.chars().rev().nth(1);
        let vowel = matches!(before_y, Some('a' | 'e' | 'i' | 'o' | 'u'));
        if !vowel {
            return format!("{stem}ies");
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{s}es");
    }
    format!("{s}s")
}
