//! Model-level IR: the resolved type graph of a document.
//!
//! Every map and set here is ordered, so iteration is stable without an
//! explicit sort at each use site.

use std::collections::{BTreeMap, BTreeSet};

/// Scalar type with its format folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `string` / `date`
    Date,
    /// `string` / `date-time`
    DateTime,
    /// `integer` / `int32`
    Int32,
    /// `integer` / `int64`
    Int64,
    /// `integer` without a format
    Integer,
    /// `number` / `float`
    Float,
    /// `number` / `double`
    Double,
    /// `number` without a format
    Number,
    /// `boolean`
    Boolean,
}

impl Primitive {
    /// Map a schema `type` + `format` pair to a primitive.
    pub fn from_schema(type_name: &str, format: Option<&str>) -> Option<Self> {
        let primitive = match (type_name, format) {
            ("string", Some("date")) => Self::Date,
            ("string", Some("date-time")) => Self::DateTime,
            ("string", _) => Self::String,
            ("integer", Some("int32")) => Self::Int32,
            ("integer", Some("int64")) => Self::Int64,
            ("integer", _) => Self::Integer,
            ("number", Some("float")) => Self::Float,
            ("number", Some("double")) => Self::Double,
            ("number", _) => Self::Number,
            ("boolean", _) => Self::Boolean,
            _ => return None,
        };
        Some(primitive)
    }

    /// Rust type name in generated code.
    pub fn rust_type(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Date => "chrono::NaiveDate",
            Self::DateTime => "chrono::DateTime<chrono::Utc>",
            Self::Int32 => "i32",
            Self::Int64 | Self::Integer => "i64",
            Self::Float => "f32",
            Self::Double | Self::Number => "f64",
            Self::Boolean => "bool",
        }
    }
}

/// Declared type of a field, parameter, alias or payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeToken {
    /// Scalar.
    Primitive(Primitive),
    /// Reference to a model by name.
    Named(String),
    /// Ordered list.
    Array(Box<TypeToken>),
    /// String-keyed map with typed values.
    Map(Box<TypeToken>),
    /// Untyped JSON value.
    Any,
}

impl TypeToken {
    /// Array of `item`.
    pub fn array(item: TypeToken) -> Self {
        Self::Array(Box::new(item))
    }

    /// Whether this is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Innermost model name, looking through arrays and maps.
    pub fn named(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name.as_str()),
            Self::Array(inner) | Self::Map(inner) => inner.named(),
            Self::Primitive(_) | Self::Any => None,
        }
    }

    /// Element type of an array, or the token itself.
    pub fn element(&self) -> &TypeToken {
        match self {
            Self::Array(inner) => inner,
            other => other,
        }
    }
}

/// Where a field lives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    /// Property of a JSON body.
    Body,
    /// Route placeholder.
    Path,
    /// Query string parameter.
    Query,
}

/// A property of a model, or a parameter of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Original document property or parameter name.
    pub key: String,
    /// Declared type.
    pub ty: TypeToken,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether the value must be present.
    pub required: bool,
    /// Where the value goes on the wire.
    pub location: FieldLocation,
}

impl Field {
    /// An optional body property.
    pub fn body(key: impl Into<String>, ty: TypeToken) -> Self {
        Self {
            key: key.into(),
            ty,
            description: None,
            required: false,
            location: FieldLocation::Body,
        }
    }

    /// A parameter field. Path parameters are always required.
    pub fn param(
        key: impl Into<String>,
        ty: TypeToken,
        location: FieldLocation,
        required: bool,
    ) -> Self {
        Self {
            key: key.into(),
            ty,
            description: None,
            required: required || location == FieldLocation::Path,
            location,
        }
    }

    /// Whether the field holds an array.
    pub fn is_array(&self) -> bool {
        self.ty.is_array()
    }

    /// Whether the field is a path parameter.
    pub fn is_in_path(&self) -> bool {
        self.location == FieldLocation::Path
    }

    /// Whether the field is a query parameter.
    pub fn is_in_query(&self) -> bool {
        self.location == FieldLocation::Query
    }
}

/// The rendering shape of a model; exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelShape {
    /// Scalar alias with a closed set of literals.
    EnumAlias,
    /// Scalar, array or map alias.
    Alias,
    /// Model with its own fields.
    Struct,
    /// Model aggregating other models.
    Composition,
    /// Untyped key/value map.
    Empty,
}

/// A named type in the model graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Type name in generated code.
    pub name: String,
    /// Fields by document key.
    pub fields: BTreeMap<String, Field>,
    /// Composed model names, or enum literals when `is_enum` is set.
    pub children: BTreeSet<String>,
    /// Underlying type of an alias model.
    pub alias: Option<TypeToken>,
    /// Free-form description.
    pub description: Option<String>,
    /// Synthesized rather than named by the document.
    pub generated: bool,
    /// Alias restricted to a set of literals.
    pub is_enum: bool,
    /// Children are alternatives (`oneOf`/`anyOf`) rather than a merge.
    pub union: bool,
}

impl Model {
    /// An empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            children: BTreeSet::new(),
            alias: None,
            description: None,
            generated: false,
            is_enum: false,
            union: false,
        }
    }

    /// The rendering shape this model takes.
    pub fn shape(&self) -> ModelShape {
        if self.is_enum && self.alias.is_some() {
            ModelShape::EnumAlias
        } else if self.alias.is_some() {
            ModelShape::Alias
        } else if !self.fields.is_empty() {
            ModelShape::Struct
        } else if !self.children.is_empty() {
            ModelShape::Composition
        } else {
            ModelShape::Empty
        }
    }

    /// Whether a string enum renders as a newtype with `as_str()`.
    pub fn is_string_enum(&self) -> bool {
        self.is_enum && matches!(self.alias, Some(TypeToken::Primitive(Primitive::String)))
    }

    /// Add a field under its key.
    pub fn insert_field(&mut self, field: Field) {
        self.fields.insert(field.key.clone(), field);
    }
}

/// All models of a run keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelGraph {
    models: BTreeMap<String, Model>,
}

impl ModelGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a model, replacing any model of the same name.
    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    /// Model by name.
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Whether a model of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the graph has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Model names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Resolve a named model through alias chains to its scalar, if any.
    pub fn scalar_of(&self, token: &TypeToken) -> Option<Primitive> {
        let mut current = token;
        for _ in 0..=self.models.len() {
            match current {
                TypeToken::Primitive(p) => return Some(*p),
                TypeToken::Named(name) => {
                    current = self.models.get(name)?.alias.as_ref()?;
                }
                _ => return None,
            }
        }
        None
    }
}

impl FromIterator<Model> for ModelGraph {
    fn from_iter<I: IntoIterator<Item = Model>>(iter: I) -> Self {
        let mut graph = Self::new();
        for model in iter {
            graph.insert(model);
        }
        graph
    }
}
