use crate::{common::*, error::Error};

/// A scalar field value.
///
/// Bare identifiers on the value side (enum values in the schema language)
/// are kept verbatim as [Scalar::Enum].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Enum(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer literals are accepted for float-typed fields, so both kinds
    /// convert.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => write!(f, "\"{}\"", escape(text)),
            Self::Int(value) => write!(f, "{}", value),
            // {:?} keeps a decimal point on integral floats
            Self::Float(value) => write!(f, "{:?}", value),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Enum(name) => write!(f, "{}", name),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Message(Document),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Document> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut Document> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// An ordered field multimap. Repeated fields keep every occurrence in
/// document order; lookups by name address the first occurrence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn push_scalar(&mut self, name: impl Into<String>, scalar: Scalar) {
        self.fields.push(Field {
            name: name.into(),
            value: Value::Scalar(scalar),
        });
    }

    pub fn push_message(&mut self, name: impl Into<String>, message: Document) {
        self.fields.push(Field {
            name: name.into(),
            value: Value::Message(message),
        });
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .map(|field| &mut field.value)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.get(name).and_then(Value::as_scalar)
    }

    pub fn message(&self, name: &str) -> Option<&Document> {
        self.get(name).and_then(Value::as_message)
    }

    pub fn message_mut(&mut self, name: &str) -> Option<&mut Document> {
        self.get_mut(name).and_then(Value::as_message_mut)
    }

    /// All occurrences of a repeated message field, in document order.
    pub fn messages<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Document> + 'a {
        self.get_all(name).filter_map(Value::as_message)
    }

    /// Walks nested messages along first occurrences.
    pub fn message_at(&self, path: &[&str]) -> Option<&Document> {
        let mut target = self;
        for step in path {
            target = target.message(step)?;
        }
        Some(target)
    }

    pub fn message_at_mut(&mut self, path: &[&str]) -> Option<&mut Document> {
        let mut target = self;
        for step in path {
            target = target.message_mut(step)?;
        }
        Some(target)
    }

    /// The scalar at a dotted path, where the last component names the field.
    pub fn scalar_at(&self, path: &[&str]) -> Option<&Scalar> {
        let (name, parents) = path.split_last()?;
        self.message_at(parents)?.scalar(name)
    }

    /// Sets a scalar field, replacing the first occurrence or appending the
    /// field to its parent message when absent. Every parent component of
    /// the path must already exist.
    pub fn set_scalar(&mut self, path: &[&str], scalar: Scalar) -> Result<(), Error> {
        let (name, parents) = path.split_last().ok_or_else(|| Error::MissingField {
            path: String::new(),
        })?;

        let mut target = self;
        for (depth, step) in parents.iter().enumerate() {
            target = match target.get_mut(step) {
                Some(Value::Message(message)) => message,
                Some(Value::Scalar(_)) => {
                    return Err(Error::FieldKind {
                        path: path[..=depth].join("."),
                        expected: "message",
                    });
                }
                None => {
                    return Err(Error::MissingField {
                        path: path[..=depth].join("."),
                    });
                }
            };
        }

        let index = target.fields.iter().position(|field| &field.name == name);
        match index {
            Some(index) => match &mut target.fields[index].value {
                Value::Scalar(slot) => *slot = scalar,
                Value::Message(_) => {
                    return Err(Error::FieldKind {
                        path: path.join("."),
                        expected: "scalar",
                    });
                }
            },
            None => target.push_scalar(*name, scalar),
        }
        Ok(())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fields(&self.fields, f, 0)
    }
}

fn fmt_fields(fields: &[Field], f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for field in fields {
        let pad = "  ".repeat(indent);
        match &field.value {
            Value::Scalar(scalar) => writeln!(f, "{}{}: {}", pad, field.name, scalar)?,
            Value::Message(message) => {
                writeln!(f, "{}{} {{", pad, field.name)?;
                fmt_fields(&message.fields, f, indent + 1)?;
                writeln!(f, "{}}}", pad)?;
            }
        }
    }
    Ok(())
}
