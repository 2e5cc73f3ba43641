//! Live value tree and the injected well-known globals table.
//!
//! Lookups never follow reflective properties (`caller`, `arguments`, `callee`), and
//! enumeration only yields identifier-safe own keys.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("valid identifier regex"));

/// Properties that are never read or enumerated.
pub const SENSITIVE_KEYS: [&str; 3] = ["caller", "arguments", "callee"];

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

fn is_visible_key(key: &str) -> bool {
    is_identifier(key) && key != "constructor" && !SENSITIVE_KEYS.contains(&key)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    /// Constructor name for class instances; `None` for plain objects.
    pub class_name: Option<String>,
    pub props: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    pub name: String,
    /// Static properties hung off the function (`Date.now`).
    pub props: BTreeMap<String, Value>,
}

impl Value {
    pub fn object<K: Into<String>>(props: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Object(Object {
            class_name: None,
            props: props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn instance<K: Into<String>>(
        class_name: impl Into<String>,
        props: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Self::Object(Object {
            class_name: Some(class_name.into()),
            props: props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(Function {
            name: name.into(),
            props: BTreeMap::new(),
        })
    }

    pub fn function_with<K: Into<String>>(
        name: impl Into<String>,
        props: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Self::Function(Function {
            name: name.into(),
            props: props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    fn props(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(obj) => Some(&obj.props),
            Self::Function(func) => Some(&func.props),
            _ => None,
        }
    }

    /// Own property `key`, unless it is a reflective property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if SENSITIVE_KEYS.contains(&key) {
            return None;
        }
        match self {
            Self::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => self.props()?.get(key),
        }
    }

    /// Walks a dotted path; `""` is `self`.
    pub fn lookup_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |value, segment| value.get(segment))
    }

    /// Identifier-safe own keys, excluding `constructor` and reflective properties.
    pub fn own_keys(&self) -> Vec<&str> {
        self.props()
            .map(|props| {
                props
                    .keys()
                    .map(String::as_str)
                    .filter(|key| is_visible_key(key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Runtime tag, as `Object.prototype.toString` would name it.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::String(_) => "String",
            Self::Array(_) => "Array",
            Self::Object(_) => "Object",
            Self::Function(_) => "Function",
        }
    }

    /// Constructor name for class instances.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => obj.class_name.as_deref(),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Objects and functions that expose at least one visible key.
    pub fn has_members(&self) -> bool {
        !self.own_keys().is_empty()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(Object {
                class_name: None,
                props: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
        }
    }
}

/// Injected table of well-known globals used when a path is not in the value tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    values: BTreeMap<String, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn lookup_path(&self, path: &str) -> Option<&Value> {
        let (root, rest) = match path.split_once('.') {
            Some((root, rest)) => (root, rest),
            None => (path, ""),
        };
        if SENSITIVE_KEYS.contains(&root) {
            return None;
        }
        self.values.get(root)?.lookup_path(rest)
    }

    /// A small portable subset of the standard JavaScript globals.
    pub fn well_known() -> Self {
        fn functions(names: &[&str]) -> Vec<(String, Value)> {
            names
                .iter()
                .map(|name| (name.to_string(), Value::function(*name)))
                .collect()
        }

        let mut math = functions(&[
            "abs", "ceil", "floor", "max", "min", "pow", "random", "round", "sqrt", "trunc",
        ]);
        math.push(("E".to_string(), Value::Number(std::f64::consts::E)));
        math.push(("PI".to_string(), Value::Number(std::f64::consts::PI)));

        Self::new()
            .with("Math", Value::object(math))
            .with("JSON", Value::object(functions(&["parse", "stringify"])))
            .with(
                "Date",
                Value::function_with("Date", functions(&["now", "parse", "UTC"])),
            )
            .with(
                "Object",
                Value::function_with(
                    "Object",
                    functions(&["assign", "entries", "freeze", "keys", "values"]),
                ),
            )
            .with(
                "Array",
                Value::function_with("Array", functions(&["from", "isArray", "of"])),
            )
            .with(
                "Number",
                Value::function_with(
                    "Number",
                    functions(&["isFinite", "isInteger", "isNaN", "parseFloat", "parseInt"]),
                ),
            )
            .with(
                "String",
                Value::function_with("String", functions(&["fromCharCode", "raw"])),
            )
    }
}
