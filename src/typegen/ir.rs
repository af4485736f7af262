// Strongly-typed IR for codegen. Schema JSON is gone by this point, except for
// literal values which are emitted as-is.
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Unknown,                 // `unknown` or `any`, per options
    Never,
    Null,
    Bool,
    Number,
    String,
    Literal(Value),          // enum member or const
    Custom(String),          // `tsType`, emitted verbatim
    Named(String),           // reference to a top-level declaration
    List(Box<Ty>),
    Tuple {
        elems: Vec<Ty>,
        required: usize,     // leading elements that are not optional
        rest: Option<Box<Ty>>,
    },
    Object {
        fields: Vec<Field>,  // schema order
        index: Option<Box<Ty>>,
    },
    Union(Vec<Ty>),
    Intersection(Vec<Ty>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    pub required: bool,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Interface {
        name: String,
        docs: Option<String>,
        fields: Vec<Field>,
        index: Option<Box<Ty>>,
    },
    Alias {
        name: String,
        docs: Option<String>,
        ty: Ty,
    },
    Enum {
        name: String,
        docs: Option<String>,
        members: Vec<(String, Value)>,
    },
}

impl Ty {
    /// Flatten nested unions and drop duplicates. One arm collapses to itself.
    pub fn union(arms: impl IntoIterator<Item = Ty>) -> Ty {
        let mut out: Vec<Ty> = Vec::new();
        for arm in arms {
            let parts = match arm {
                Ty::Union(xs) => xs,
                x => vec![x],
            };
            for x in parts {
                if !out.contains(&x) {
                    out.push(x);
                }
            }
        }
        match out.len() {
            0 => Ty::Never,
            1 => out.remove(0),
            _ => Ty::Union(out),
        }
    }

    pub fn intersection(parts: impl IntoIterator<Item = Ty>) -> Ty {
        let mut out: Vec<Ty> = Vec::new();
        for part in parts {
            match part {
                Ty::Intersection(xs) => out.extend(xs),
                x => out.push(x),
            }
        }
        match out.len() {
            0 => Ty::Unknown,
            1 => out.remove(0),
            _ => Ty::Intersection(out),
        }
    }
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Interface { name, .. } | Decl::Alias { name, .. } | Decl::Enum { name, .. } => name,
        }
    }
}
