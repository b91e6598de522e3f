//! Generation request assembly: one request per extracted group, carrying
//! the run configuration through unchanged plus the computed import list
//! and output path.

use std::path::Path;

use crate::casing::plural;
use crate::model::{Config, EnumGroup, GenerationRequest, Protocol};
use crate::parse::Extraction;

pub fn assemble(
    extraction: &Extraction,
    config: &Config,
    source_filename: &str,
) -> Vec<GenerationRequest> {
    extraction
        .groups
        .iter()
        .map(|group| GenerationRequest {
            package: extraction.package.clone(),
            group: group.clone(),
            version: crate::VERSION.to_string(),
            source_filename: source_filename.to_string(),
            output_filename: output_path(source_filename, group),
            config: config.clone(),
            imports: imports_for(group, config),
        })
        .collect()
}

/// `dir/of/source/<plural type name>_enumgen.go`.
fn output_path(source_filename: &str, group: &EnumGroup) -> String {
    let stem = format!("{}_enumgen.go", plural(&group.type_name.to_lowercase()));
    match Path::new(source_filename).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            dir.join(stem).to_string_lossy().into_owned()
        }
        _ => stem,
    }
}

fn imports_for(group: &EnumGroup, config: &Config) -> Vec<String> {
    let mut imports = vec!["fmt".to_string()];
    if !config.legacy {
        imports.push("iter".to_string());
    }
    if config.insensitive {
        imports.push("strings".to_string());
    }
    if config.protocols.contains(&Protocol::Json) {
        imports.push("strconv".to_string());
    }
    if config.protocols.contains(&Protocol::Sql) {
        imports.push("database/sql/driver".to_string());
    }
    if group.field_schema.iter().any(|f| f.tag.import().is_some()) {
        imports.push("time".to_string());
    }
    if config.constraints {
        imports.push("golang.org/x/exp/constraints".to_string());
    }
    imports.sort();
    imports.dedup();
    imports
}
