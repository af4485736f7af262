//! JSON Schema → IR.
//!
//! Titled subschemas become their own declarations; everything else is
//! lowered inline. Declarations come out root first, then in discovery order.
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use super::ir::{Decl, Field, Ty};
use super::{CompileError, CompilerOptions};
use crate::mapping::{ENUM_KEY, TS_TYPE_KEY};

/// Past this many spelled-out elements a bounded list stays `T[]`.
const MAX_TUPLE_EXPANSION: usize = 20;

const FALLBACK_ROOT_NAME: &str = "Root";

pub fn lower_root(
    schema: &Value,
    root_name: &str,
    options: &CompilerOptions,
) -> Result<Vec<Decl>, CompileError> {
    let mut lw = Lowerer { options, decls: IndexMap::new() };

    let name = [title_of(schema), Some(root_name)]
        .into_iter()
        .flatten()
        .map(safe_name)
        .find(|x| !x.is_empty())
        .unwrap_or_else(|| FALLBACK_ROOT_NAME.to_string());
    let name = lw.reserve(&name);
    let decl = lw.lower_decl(&name, schema, "")?;
    lw.decls.insert(name, decl);

    Ok(lw.decls.into_values().collect())
}

struct Lowerer<'o> {
    options: &'o CompilerOptions,
    decls: IndexMap<String, Decl>,
}

impl Lowerer<'_> {
    /// Claim a free declaration name, suffixing a counter on collision. The
    /// placeholder keeps the slot (and its position) until the real
    /// declaration replaces it.
    fn reserve(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 1;
        while self.decls.contains_key(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.decls.insert(name.clone(), Decl::Alias { name: name.clone(), docs: None, ty: Ty::Unknown });
        name
    }

    fn lower_decl(&mut self, name: &str, schema: &Value, ptr: &str) -> Result<Decl, CompileError> {
        let docs = description_of(schema);
        if let Some(members) = named_enum_members(schema) {
            return Ok(Decl::Enum { name: name.to_string(), docs, members });
        }
        let decl = match self.lower_body(schema, ptr)? {
            Ty::Object { fields, index } => Decl::Interface { name: name.to_string(), docs, fields, index },
            ty => Decl::Alias { name: name.to_string(), docs, ty },
        };
        Ok(decl)
    }

    /// Entry point for every nested schema.
    fn lower(&mut self, schema: &Value, ptr: &str) -> Result<Ty, CompileError> {
        let has_custom = schema.get(TS_TYPE_KEY).is_some_and(Value::is_string);
        match title_of(schema).map(safe_name).filter(|x| !x.is_empty()) {
            Some(title) if !has_custom => {
                let name = self.reserve(&title);
                let decl = self.lower_decl(&name, schema, ptr)?;
                self.decls.insert(name.clone(), decl);
                Ok(Ty::Named(name))
            }
            _ => self.lower_body(schema, ptr),
        }
    }

    fn lower_body(&mut self, schema: &Value, ptr: &str) -> Result<Ty, CompileError> {
        match schema {
            Value::Bool(true) => Ok(Ty::Unknown),
            Value::Bool(false) => Ok(Ty::Never),
            Value::Object(map) => self.lower_map(map, ptr),
            Value::Null | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                warn!(pointer = %display_ptr(ptr), "non-schema value in schema position, typing it as unknown");
                Ok(Ty::Unknown)
            }
        }
    }

    fn lower_map(&mut self, map: &Map<String, Value>, ptr: &str) -> Result<Ty, CompileError> {
        if let Some(Value::String(custom)) = map.get(TS_TYPE_KEY) {
            return Ok(Ty::Custom(custom.clone()));
        }
        if let Some(values) = map.get(ENUM_KEY) {
            let values = values
                .as_array()
                .ok_or_else(|| malformed(&child(ptr, ENUM_KEY), "`enum` must be an array"))?;
            return Ok(Ty::union(values.iter().cloned().map(Ty::Literal)));
        }
        if let Some(value) = map.get("const") {
            return Ok(Ty::Literal(value.clone()));
        }

        let mut parts = Vec::new();
        if let Some(all) = map.get("allOf") {
            let ptr = child(ptr, "allOf");
            parts.push(Ty::intersection(self.lower_each(all, &ptr, "allOf")?));
        }
        for key in ["anyOf", "oneOf"] {
            if let Some(arms) = map.get(key) {
                let ptr = child(ptr, key);
                parts.push(Ty::union(self.lower_each(arms, &ptr, key)?));
            }
        }
        if let Some(typed) = self.lower_typed(map, ptr)? {
            parts.push(typed);
        }

        Ok(match parts.len() {
            0 => Ty::Unknown,
            _ => Ty::intersection(parts),
        })
    }

    fn lower_each(&mut self, arms: &Value, ptr: &str, key: &str) -> Result<Vec<Ty>, CompileError> {
        let arms = arms
            .as_array()
            .ok_or_else(|| malformed(ptr, &format!("`{key}` must be an array of schemas")))?;
        arms.iter()
            .enumerate()
            .map(|(i, x)| self.lower(x, &child(ptr, &i.to_string())))
            .collect()
    }

    /// `None` when the schema says nothing about its own type.
    fn lower_typed(&mut self, map: &Map<String, Value>, ptr: &str) -> Result<Option<Ty>, CompileError> {
        let kinds: Vec<&str> = match map.get("type") {
            Some(Value::String(x)) => vec![x.as_str()],
            Some(Value::Array(xs)) => xs.iter().filter_map(Value::as_str).collect(),
            Some(_) => {
                return Err(malformed(
                    &child(ptr, "type"),
                    "`type` must be a string or an array of strings",
                ));
            }
            // MongoDB validators use `bsonType: "object"`, which we don't see
            // here, so shape keywords decide.
            None if ["properties", "additionalProperties", "required"]
                .iter()
                .any(|k| map.contains_key(*k)) => vec!["object"],
            None if map.contains_key("items") => vec!["array"],
            None => return Ok(None),
        };
        let arms = kinds
            .into_iter()
            .map(|kind| self.lower_kind(kind, map, ptr))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Ty::union(arms)))
    }

    fn lower_kind(&mut self, kind: &str, map: &Map<String, Value>, ptr: &str) -> Result<Ty, CompileError> {
        Ok(match kind {
            "string" => Ty::String,
            "number" | "integer" => Ty::Number,
            "boolean" => Ty::Bool,
            "null" => Ty::Null,
            "object" => self.lower_object(map, ptr)?,
            "array" => self.lower_array(map, ptr)?,
            _ => Ty::Unknown,
        })
    }

    fn lower_object(&mut self, map: &Map<String, Value>, ptr: &str) -> Result<Ty, CompileError> {
        let required: Vec<&str> = match map.get("required") {
            None => Vec::new(),
            Some(Value::Array(xs)) => xs
                .iter()
                .map(|x| x.as_str().ok_or_else(|| malformed(&child(ptr, "required"), "`required` entries must be strings")))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(malformed(&child(ptr, "required"), "`required` must be an array of strings")),
        };

        let mut fields = Vec::new();
        match map.get("properties") {
            None => {}
            Some(Value::Object(props)) => {
                let props_ptr = child(ptr, "properties");
                for (name, sub) in props {
                    let ty = self.lower(sub, &child(&props_ptr, name))?;
                    fields.push(Field {
                        name: name.clone(),
                        ty,
                        required: required.contains(&name.as_str()),
                        docs: description_of(sub),
                    });
                }
            }
            Some(_) => return Err(malformed(&child(ptr, "properties"), "`properties` must be an object")),
        }

        let index = match map.get("additionalProperties") {
            None | Some(Value::Bool(true)) => Some(Ty::Unknown),
            Some(Value::Bool(false)) => None,
            Some(sub @ Value::Object(_)) => Some(self.lower(sub, &child(ptr, "additionalProperties"))?),
            Some(_) => {
                return Err(malformed(
                    &child(ptr, "additionalProperties"),
                    "`additionalProperties` must be a boolean or a schema",
                ));
            }
        };

        Ok(Ty::Object { fields, index: index.map(Box::new) })
    }

    fn lower_array(&mut self, map: &Map<String, Value>, ptr: &str) -> Result<Ty, CompileError> {
        let bound = |key: &str| {
            if self.options.ignore_min_and_max_items {
                None
            } else {
                map.get(key).and_then(Value::as_u64).map(|x| x as usize)
            }
        };
        let (min_items, max_items) = (bound("minItems"), bound("maxItems"));

        match map.get("items") {
            Some(Value::Array(xs)) => {
                let items_ptr = child(ptr, "items");
                let mut elems = xs
                    .iter()
                    .enumerate()
                    .map(|(i, x)| self.lower(x, &child(&items_ptr, &i.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(max) = max_items {
                    elems.truncate(max);
                }
                let rest = match map.get("additionalItems") {
                    Some(Value::Bool(false)) => None,
                    _ if max_items.is_some_and(|max| max <= elems.len()) => None,
                    Some(sub @ Value::Object(_)) => Some(self.lower(sub, &child(ptr, "additionalItems"))?),
                    _ => Some(Ty::Unknown),
                };
                let required = min_items.map_or(elems.len(), |min| min.min(elems.len()));
                Ok(Ty::Tuple { elems, required, rest: rest.map(Box::new) })
            }
            Some(sub @ (Value::Object(_) | Value::Bool(_))) => {
                let item = self.lower(sub, &child(ptr, "items"))?;
                Ok(bounded_list(item, min_items.unwrap_or(0), max_items))
            }
            None => Ok(bounded_list(Ty::Unknown, min_items.unwrap_or(0), max_items)),
            Some(_) => Err(malformed(&child(ptr, "items"), "`items` must be a schema or an array of schemas")),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `T[]`, or a tuple spelling out `minItems` required and up to `maxItems`
/// optional elements.
fn bounded_list(item: Ty, min: usize, max: Option<usize>) -> Ty {
    match max {
        None if min == 0 => Ty::List(Box::new(item)),
        Some(max) if max < min => Ty::List(Box::new(item)),
        Some(max) if max <= MAX_TUPLE_EXPANSION => Ty::Tuple {
            elems: vec![item; max],
            required: min,
            rest: None,
        },
        _ if min == 0 => Ty::List(Box::new(item)),
        _ if min <= MAX_TUPLE_EXPANSION => Ty::Tuple {
            elems: vec![item.clone(); min],
            required: min,
            rest: Some(Box::new(item)),
        },
        _ => Ty::List(Box::new(item)),
    }
}

/// `enum` + `tsEnumNames` of the same length, members all strings or numbers.
fn named_enum_members(schema: &Value) -> Option<Vec<(String, Value)>> {
    let values = schema.get(ENUM_KEY)?.as_array()?;
    let names = schema.get("tsEnumNames")?.as_array()?;
    if names.len() != values.len() || !values.iter().all(|v| v.is_string() || v.is_number()) {
        return None;
    }
    names
        .iter()
        .zip(values)
        .map(|(name, value)| Some((name.as_str()?.to_string(), value.clone())))
        .collect()
}

fn title_of(schema: &Value) -> Option<&str> {
    schema.get("title").and_then(Value::as_str)
}

fn description_of(schema: &Value) -> Option<String> {
    schema.get("description").and_then(Value::as_str).map(String::from)
}

/// PascalCase identifier from free text. Empty when nothing usable is left.
pub fn safe_name(raw: &str) -> String {
    let mut out = String::new();
    for word in raw
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Append one JSON Pointer reference token.
fn child(ptr: &str, key: &str) -> String {
    format!("{ptr}/{}", key.replace('~', "~0").replace('/', "~1"))
}

fn display_ptr(ptr: &str) -> String {
    format!("#{ptr}")
}

fn malformed(ptr: &str, reason: &str) -> CompileError {
    CompileError::Malformed { pointer: display_ptr(ptr), reason: reason.to_string() }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
