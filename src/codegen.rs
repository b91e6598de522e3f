//! Go source emitter: template-free text assembly of the wrapper file.
//!
//! Mechanical by design; all the judgement lives upstream in extraction.
//! The emitted file carries: a wrapper struct embedding the underlying
//! type plus schema fields, one exported value per member, canonical
//! string conversion, alias parsing, validation, iteration, and the
//! serialization hooks the run configuration asked for.

use std::collections::HashSet;
use std::fmt::Write;

use crate::casing::{camel_case, pascal_case, plural};
use crate::model::{EnumGroup, EnumMember, GenerationRequest, Protocol, TypeTag};

pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn emit(&mut self, req: &GenerationRequest) {
        let names = Names::of(&req.group);

        let _ = writeln!(
            self.out,
            "// Code generated by enumgen v{} from {}. DO NOT EDIT.",
            req.version, req.source_filename
        );
        self.blank();
        let _ = writeln!(self.out, "package {}", req.package);
        self.blank();
        self.emit_imports(&req.imports);

        self.emit_wrapper(req, &names);
        self.emit_values(req, &names);
        self.emit_string(req, &names);
        self.emit_iteration(req, &names);
        self.emit_is_valid(&names);
        self.emit_parse(req, &names);
        self.emit_from_ordinal(req, &names);

        for protocol in &req.config.protocols {
            match protocol {
                Protocol::Json => self.emit_json(&names),
                Protocol::Text => self.emit_text(&names),
                Protocol::Sql => self.emit_sql(&names),
                Protocol::Binary => self.emit_binary(&names),
            }
        }

        if req.group.field_schema.iter().any(|f| f.tag == TypeTag::Time) {
            self.emit_time_helper();
        }
    }

    fn emit_imports(&mut self, imports: &[String]) {
        if imports.is_empty() {
            return;
        }
        self.line("import (");
        for import in imports {
            let _ = writeln!(self.out, "\t\"{import}\"");
        }
        self.line(")");
        self.blank();
    }

    fn emit_wrapper(&mut self, req: &GenerationRequest, names: &Names) {
        let _ = writeln!(
            self.out,
            "// {} is the wrapper type for {} values.",
            names.wrapper, names.underlying
        );
        let _ = writeln!(self.out, "type {} struct {{", names.wrapper);
        let _ = writeln!(self.out, "\t{}", names.underlying);
        for field in &req.group.field_schema {
            let _ = writeln!(self.out, "\t{} {}", field.name, field.tag.go_name());
        }
        self.line("}");
        self.blank();
    }

    fn emit_values(&mut self, req: &GenerationRequest, names: &Names) {
        self.line("var (");
        for member in &req.group.members {
            let mut literal = format!("{}{{{}: {}", names.wrapper, names.underlying, member.name);
            for (field, value) in req.group.field_schema.iter().zip(&member.field_values) {
                let _ = write!(literal, ", {}: {}", field.name, value);
            }
            literal.push('}');
            let _ = writeln!(self.out, "\t{} = {literal}", names.value(member));
        }
        self.line(")");
        self.blank();

        let _ = writeln!(
            self.out,
            "// {} is the zero value returned when no {} matches.",
            names.invalid, names.underlying
        );
        let _ = writeln!(self.out, "var {} = {}{{}}", names.invalid, names.wrapper);
        self.blank();

        let _ = writeln!(self.out, "var {} = []{}{{", names.all, names.wrapper);
        for member in req.group.members.iter().filter(|m| m.valid) {
            let _ = writeln!(self.out, "\t{},", names.value(member));
        }
        self.line("}");
        self.blank();
    }

    fn emit_string(&mut self, req: &GenerationRequest, names: &Names) {
        let _ = writeln!(self.out, "func (s {}) String() string {{", names.wrapper);
        let _ = writeln!(self.out, "\tswitch s.{} {{", names.underlying);
        for member in req.group.members.iter().filter(|m| m.valid) {
            let canonical = member.aliases.first().map(String::as_str).unwrap_or(&member.name);
            let _ = writeln!(self.out, "\tcase {}:", member.name);
            let _ = writeln!(self.out, "\t\treturn {}", go_str(canonical));
        }
        self.line("\t}");
        let _ = writeln!(
            self.out,
            "\treturn fmt.Sprintf(\"{}(%d)\", int(s.{}))",
            names.underlying, names.underlying
        );
        self.line("}");
        self.blank();
    }

    fn emit_iteration(&mut self, req: &GenerationRequest, names: &Names) {
        let _ = writeln!(
            self.out,
            "// {} yields every valid {} in declaration order.",
            names.all_fn, names.underlying
        );
        if req.config.legacy {
            let _ = writeln!(self.out, "func {}() []{} {{", names.all_fn, names.wrapper);
            let _ = writeln!(self.out, "\tout := make([]{}, len({}))", names.wrapper, names.all);
            let _ = writeln!(self.out, "\tcopy(out, {})", names.all);
            self.line("\treturn out");
            self.line("}");
        } else {
            let _ = writeln!(self.out, "func {}() iter.Seq[{}] {{", names.all_fn, names.wrapper);
            let _ = writeln!(self.out, "\treturn func(yield func({}) bool) {{", names.wrapper);
            let _ = writeln!(self.out, "\t\tfor _, v := range {} {{", names.all);
            self.line("\t\t\tif !yield(v) {");
            self.line("\t\t\t\treturn");
            self.line("\t\t\t}");
            self.line("\t\t}");
            self.line("\t}");
            self.line("}");
        }
        self.blank();
    }

    fn emit_is_valid(&mut self, names: &Names) {
        let _ = writeln!(
            self.out,
            "// IsValid reports whether s is one of the declared {} values.",
            names.underlying
        );
        let _ = writeln!(self.out, "func (s {}) IsValid() bool {{", names.wrapper);
        let _ = writeln!(self.out, "\tfor _, v := range {} {{", names.all);
        let _ = writeln!(self.out, "\t\tif v.{} == s.{} {{", names.underlying, names.underlying);
        self.line("\t\t\treturn true");
        self.line("\t\t}");
        self.line("\t}");
        self.line("\treturn false");
        self.line("}");
        self.blank();
    }

    fn emit_parse(&mut self, req: &GenerationRequest, names: &Names) {
        let insensitive = req.config.insensitive;
        let _ = writeln!(
            self.out,
            "// {} matches input against the aliases of every valid {}.",
            names.parse_fn, names.underlying
        );
        let _ = writeln!(
            self.out,
            "func {}(input string) ({}, error) {{",
            names.parse_fn, names.wrapper
        );
        if insensitive {
            self.line("\tkey := strings.ToLower(input)");
        } else {
            self.line("\tkey := input");
        }
        self.line("\tswitch key {");
        let mut seen = HashSet::new();
        for member in req.group.members.iter().filter(|m| m.valid) {
            let mut cases = Vec::new();
            for alias in &member.aliases {
                let alias = if insensitive { alias.to_lowercase() } else { alias.clone() };
                if seen.insert(alias.clone()) {
                    cases.push(go_str(&alias));
                }
            }
            if cases.is_empty() {
                continue;
            }
            let _ = writeln!(self.out, "\tcase {}:", cases.join(", "));
            let _ = writeln!(self.out, "\t\treturn {}, nil", names.value(member));
        }
        self.line("\t}");
        if req.config.failfast {
            let _ = writeln!(
                self.out,
                "\treturn {}, fmt.Errorf(\"invalid {}: %q\", input)",
                names.invalid, names.underlying
            );
        } else {
            let _ = writeln!(self.out, "\treturn {}, nil", names.invalid);
        }
        self.line("}");
        self.blank();
    }

    fn emit_from_ordinal(&mut self, req: &GenerationRequest, names: &Names) {
        if req.config.constraints {
            let _ = writeln!(
                self.out,
                "func {}[T constraints.Integer](n T) ({}, bool) {{",
                names.from_ordinal_fn, names.wrapper
            );
        } else {
            let _ = writeln!(self.out, "type {} interface {{", names.number_constraint);
            self.line("\t~int | ~int8 | ~int16 | ~int32 | ~int64 | ~uint | ~uint8 | ~uint16 | ~uint32 | ~uint64");
            self.line("}");
            self.blank();
            let _ = writeln!(
                self.out,
                "func {}[T {}](n T) ({}, bool) {{",
                names.from_ordinal_fn, names.number_constraint, names.wrapper
            );
        }
        let _ = writeln!(self.out, "\tfor _, v := range {} {{", names.all);
        let _ = writeln!(self.out, "\t\tif int64(v.{}) == int64(n) {{", names.underlying);
        self.line("\t\t\treturn v, true");
        self.line("\t\t}");
        self.line("\t}");
        let _ = writeln!(self.out, "\treturn {}, false", names.invalid);
        self.line("}");
        self.blank();
    }

    fn emit_json(&mut self, names: &Names) {
        let _ = writeln!(self.out, "func (s {}) MarshalJSON() ([]byte, error) {{", names.wrapper);
        self.line("\treturn []byte(strconv.Quote(s.String())), nil");
        self.line("}");
        self.blank();
        let _ = writeln!(
            self.out,
            "func (s *{}) UnmarshalJSON(data []byte) error {{",
            names.wrapper
        );
        self.line("\ttext, err := strconv.Unquote(string(data))");
        self.line("\tif err != nil {");
        let _ = writeln!(
            self.out,
            "\t\treturn fmt.Errorf(\"{}: %w\", err)",
            names.underlying
        );
        self.line("\t}");
        let _ = writeln!(self.out, "\tv, err := {}(text)", names.parse_fn);
        self.line("\tif err != nil {");
        self.line("\t\treturn err");
        self.line("\t}");
        self.line("\t*s = v");
        self.line("\treturn nil");
        self.line("}");
        self.blank();
    }

    fn emit_text(&mut self, names: &Names) {
        let _ = writeln!(self.out, "func (s {}) MarshalText() ([]byte, error) {{", names.wrapper);
        self.line("\treturn []byte(s.String()), nil");
        self.line("}");
        self.blank();
        let _ = writeln!(
            self.out,
            "func (s *{}) UnmarshalText(data []byte) error {{",
            names.wrapper
        );
        let _ = writeln!(self.out, "\tv, err := {}(string(data))", names.parse_fn);
        self.line("\tif err != nil {");
        self.line("\t\treturn err");
        self.line("\t}");
        self.line("\t*s = v");
        self.line("\treturn nil");
        self.line("}");
        self.blank();
    }

    fn emit_sql(&mut self, names: &Names) {
        let _ = writeln!(self.out, "func (s {}) Value() (driver.Value, error) {{", names.wrapper);
        self.line("\treturn s.String(), nil");
        self.line("}");
        self.blank();
        let _ = writeln!(self.out, "func (s *{}) Scan(src any) error {{", names.wrapper);
        self.line("\tvar text string");
        self.line("\tswitch v := src.(type) {");
        self.line("\tcase string:");
        self.line("\t\ttext = v");
        self.line("\tcase []byte:");
        self.line("\t\ttext = string(v)");
        self.line("\tdefault:");
        let _ = writeln!(
            self.out,
            "\t\treturn fmt.Errorf(\"cannot scan %T into {}\", src)",
            names.wrapper
        );
        self.line("\t}");
        let _ = writeln!(self.out, "\tv, err := {}(text)", names.parse_fn);
        self.line("\tif err != nil {");
        self.line("\t\treturn err");
        self.line("\t}");
        self.line("\t*s = v");
        self.line("\treturn nil");
        self.line("}");
        self.blank();
    }

    fn emit_binary(&mut self, names: &Names) {
        let _ = writeln!(self.out, "func (s {}) MarshalBinary() ([]byte, error) {{", names.wrapper);
        self.line("\treturn []byte(s.String()), nil");
        self.line("}");
        self.blank();
        let _ = writeln!(
            self.out,
            "func (s *{}) UnmarshalBinary(data []byte) error {{",
            names.wrapper
        );
        let _ = writeln!(self.out, "\tv, err := {}(string(data))", names.parse_fn);
        self.line("\tif err != nil {");
        self.line("\t\treturn err");
        self.line("\t}");
        self.line("\t*s = v");
        self.line("\treturn nil");
        self.line("}");
        self.blank();
    }

    fn emit_time_helper(&mut self) {
        self.line("func mustParseTime(s string) time.Time {");
        self.line("\tt, _ := time.Parse(time.RFC3339, s)");
        self.line("\treturn t");
        self.line("}");
    }
}

/// Generated identifier set for one group.
struct Names {
    underlying: String,
    wrapper: String,
    invalid: String,
    all: String,
    all_fn: String,
    parse_fn: String,
    from_ordinal_fn: String,
    number_constraint: String,
}

impl Names {
    fn of(group: &EnumGroup) -> Self {
        let underlying = group.type_name.clone();
        let wrapper = pascal_case(&underlying);
        let plural_wrapper = pascal_case(&plural(&underlying));
        Self {
            invalid: format!("invalid{wrapper}"),
            all: format!("all{plural_wrapper}"),
            all_fn: format!("All{plural_wrapper}"),
            parse_fn: format!("Parse{wrapper}"),
            from_ordinal_fn: format!("{wrapper}FromOrdinal"),
            number_constraint: format!("{}Number", camel_case(&underlying)),
            underlying,
            wrapper,
        }
    }

    fn value(&self, member: &EnumMember) -> String {
        format!("{}{}", self.wrapper, pascal_case(&member.name))
    }
}

fn go_str(s: &str) -> String {
    crate::coerce::quote_go(s)
}
