//! IR → TypeScript source text.
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

use super::CompilerOptions;
use super::ir::{Decl, Field, Ty};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex"));

const INDENT: &str = "  ";

pub struct Codegen<'o> {
    out: String,
    options: &'o CompilerOptions,
}

impl<'o> Codegen<'o> {
    pub fn new(options: &'o CompilerOptions) -> Self {
        let mut out = String::new();
        if !options.banner_comment.is_empty() {
            out.push_str(&options.banner_comment);
            out.push_str("\n\n");
        }
        Self { out, options }
    }

    pub fn emit_all(&mut self, decls: &[Decl]) {
        for (i, decl) in decls.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.emit(decl);
        }
    }

    pub fn emit(&mut self, decl: &Decl) {
        match decl {
            Decl::Interface { name, docs, fields, index } => {
                push_docs(&mut self.out, docs.as_deref(), 0);
                let body = self.object_body(fields, index.as_deref(), 0);
                let _ = writeln!(self.out, "export interface {name} {body}");
            }
            Decl::Alias { name, docs, ty } => {
                push_docs(&mut self.out, docs.as_deref(), 0);
                let ty = self.render(ty, 0);
                let _ = writeln!(self.out, "export type {name} = {ty};");
            }
            Decl::Enum { name, docs, members } => {
                push_docs(&mut self.out, docs.as_deref(), 0);
                let keyword = if self.options.enable_const_enums { "const enum" } else { "enum" };
                let _ = writeln!(self.out, "export {keyword} {name} {{");
                let members = members
                    .iter()
                    .map(|(key, value)| format!("{INDENT}{} = {value}", property_key(key)))
                    .collect::<Vec<_>>();
                if !members.is_empty() {
                    let _ = writeln!(self.out, "{}", members.join(",\n"));
                }
                self.out.push_str("}\n");
            }
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn render(&self, ty: &Ty, depth: usize) -> String {
        match ty {
            Ty::Unknown => self.unknown().to_string(),
            Ty::Never => "never".to_string(),
            Ty::Null => "null".to_string(),
            Ty::Bool => "boolean".to_string(),
            Ty::Number => "number".to_string(),
            Ty::String => "string".to_string(),
            Ty::Literal(value) => value.to_string(),
            Ty::Custom(x) | Ty::Named(x) => x.clone(),
            Ty::List(item) => format!("{}[]", self.render_operand(item, depth)),
            Ty::Tuple { elems, required, rest } => {
                let mut parts = elems
                    .iter()
                    .enumerate()
                    .map(|(i, x)| {
                        if i < *required {
                            self.render(x, depth)
                        } else {
                            format!("{}?", self.render_operand(x, depth))
                        }
                    })
                    .collect::<Vec<_>>();
                if let Some(rest) = rest {
                    parts.push(format!("...{}[]", self.render_operand(rest, depth)));
                }
                format!("[{}]", parts.join(", "))
            }
            Ty::Object { fields, index } => self.object_body(fields, index.as_deref(), depth),
            Ty::Union(arms) => arms
                .iter()
                .map(|x| match x {
                    Ty::Intersection(_) => format!("({})", self.render(x, depth)),
                    Ty::Custom(custom) if custom.contains('&') => format!("({custom})"),
                    _ => self.render(x, depth),
                })
                .collect::<Vec<_>>()
                .join(" | "),
            Ty::Intersection(parts) => parts
                .iter()
                .map(|x| self.render_operand(x, depth))
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }

    /// Render for use before `[]`, `?` or inside `&`, parenthesizing compound
    /// types.
    fn render_operand(&self, ty: &Ty, depth: usize) -> String {
        let src = self.render(ty, depth);
        let compound = match ty {
            Ty::Union(_) | Ty::Intersection(_) => true,
            Ty::Custom(x) => x.contains(['|', '&', ' ']),
            _ => false,
        };
        if compound { format!("({src})") } else { src }
    }

    fn object_body(&self, fields: &[Field], index: Option<&Ty>, depth: usize) -> String {
        if fields.is_empty() && index.is_none() {
            return "{}".to_string();
        }
        let pad = INDENT.repeat(depth + 1);
        let mut s = String::from("{\n");
        for field in fields {
            push_docs(&mut s, field.docs.as_deref(), depth + 1);
            let _ = writeln!(
                s,
                "{pad}{}{}: {};",
                property_key(&field.name),
                if field.required { "" } else { "?" },
                self.render(&field.ty, depth + 1),
            );
        }
        if let Some(index) = index {
            let ty = self.render(index, depth + 1);
            let undefined = if self.options.strict_index_signatures { " | undefined" } else { "" };
            let _ = writeln!(s, "{pad}[k: string]: {ty}{undefined};");
        }
        s.push_str(&INDENT.repeat(depth));
        s.push('}');
        s
    }

    fn unknown(&self) -> &'static str {
        if self.options.unknown_any { "unknown" } else { "any" }
    }
}

fn property_key(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        serde_json::Value::from(name).to_string()
    }
}

fn push_docs(out: &mut String, docs: Option<&str>, depth: usize) {
    let Some(docs) = docs else { return };
    let pad = INDENT.repeat(depth);
    let _ = writeln!(out, "{pad}/**");
    for line in docs.lines() {
        let _ = writeln!(out, "{pad} * {line}");
    }
    let _ = writeln!(out, "{pad} */");
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
