// Strongly-typed extraction model handed to request assembly and codegen.
// No raw comment text survives past this layer.

/// Fixed vocabulary of field types a schema comment may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    String,
    Duration,
    Time,
}

impl TypeTag {
    /// Recognize a type tag as written in a schema comment. Anything outside
    /// the vocabulary is malformed and the caller skips the piece.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "bool" => Self::Bool,
            "string" => Self::String,
            "time.Duration" | "duration" => Self::Duration,
            "time.Time" | "time" => Self::Time,
            _ => return None,
        })
    }

    /// Spelling of the tag in generated Go source.
    pub fn go_name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Duration => "time.Duration",
            Self::Time => "time.Time",
        }
    }

    /// Import the generated code needs to spell values of this tag.
    pub fn import(&self) -> Option<&'static str> {
        match self {
            Self::Duration | Self::Time => Some("time"),
            _ => None,
        }
    }
}

/// One `(name, type)` pair from a type-level schema comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub tag: TypeTag,
}

/// One named constant of an iota group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub ordinal: i64,
    /// False iff the trailing comment carried the sentinel marker token.
    pub valid: bool,
    /// First alias is canonical for string conversion. Never empty:
    /// defaults to `[name]`.
    pub aliases: Vec<String>,
    /// Rendered Go expressions, positionally aligned to the group schema.
    /// May be shorter than the schema when the payload was partial.
    pub field_values: Vec<String>,
}

/// One iota-driven constant-type declaration (possibly merged from several
/// const blocks sharing the type name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumGroup {
    pub type_name: String,
    /// Ordinal of the first member; shifted when the first initializer is
    /// `iota <op> literal`.
    pub start_index: i64,
    pub field_schema: Vec<Field>,
    pub members: Vec<EnumMember>,
}

/// Serialization protocols the emitter can write hooks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Protocol {
    Json,
    Text,
    Sql,
    Binary,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Sql => "sql",
            Self::Binary => "binary",
        })
    }
}

/// Run configuration, threaded through to the generation request unchanged.
/// Extraction never branches on any of these flags.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Generated `Parse*` returns an error on no-match instead of the
    /// invalid zero value.
    pub failfast: bool,
    /// Emit slice-based iteration instead of `iter.Seq`.
    pub legacy: bool,
    /// Generated string matching is case-insensitive.
    pub insensitive: bool,
    /// Import `constraints` instead of inlining the numeric constraint.
    pub constraints: bool,
    pub protocols: Vec<Protocol>,
}

/// Everything the emitter needs for one output file.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub package: String,
    pub group: EnumGroup,
    pub version: String,
    pub source_filename: String,
    pub output_filename: String,
    pub config: Config,
    pub imports: Vec<String>,
}
