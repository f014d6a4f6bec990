//! Dynamic values used as targets, arguments and results of member calls.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use memberkit_cache::KeyPart;

use crate::error::{MemberError, MemberResult};
use crate::types::{builtins, TypeRef};

/// Dynamic value.
///
/// `Nothing` is the absent value: it has no runtime type and fits every
/// parameter. Objects compare by identity, everything else by value.
#[derive(Debug, Clone)]
pub enum Value {
    // ========== Scalars ==========
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit floating point, compared and hashed by bit pattern
    F64(f64),
    Bool(bool),
    Char(char),
    Nothing,

    // ========== Heap-Allocated ==========
    Str(String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    /// A type used as a value
    Type(TypeRef),
    /// Instance of a host-described type
    Object(ObjectRef),
}

/// Shared handle to an object instance.
pub type ObjectRef = Arc<Object>;

/// An instance of a host-described type with named fields.
pub struct Object {
    type_ref: TypeRef,
    fields: Mutex<BTreeMap<String, Value>>,
}

impl Object {
    pub fn new(type_ref: &TypeRef) -> ObjectRef {
        Arc::new(Object {
            type_ref: type_ref.clone(),
            fields: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.into(), value.into());
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({}@{:p})", self.type_ref.name(), self)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A field that refers back to this object would re-enter the lock.
        let Ok(fields) = self.fields.try_lock() else {
            return write!(f, "{}(...)", self.type_ref.name());
        };
        write!(f, "{}(", self.type_ref.name())?;
        for (i, (name, value)) in fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}

impl Value {
    /// Create an object of type `ty` with the given fields.
    pub fn object<'a>(ty: &TypeRef, fields: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
        let object = Object::new(ty);
        for (name, value) in fields {
            object.set_field(name, value);
        }
        Value::Object(object)
    }

    /// The runtime type, `None` for `Nothing`.
    ///
    /// Scalars report their boxed class (`Int64`, not `i64`).
    pub fn runtime_type(&self) -> Option<TypeRef> {
        let ty = match self {
            Value::Nothing => return None,
            Value::I64(_) => builtins::int64(),
            Value::I32(_) => builtins::int32(),
            Value::F64(_) => builtins::float64(),
            Value::Bool(_) => builtins::boolean(),
            Value::Char(_) => builtins::character(),
            Value::Str(_) => builtins::string(),
            Value::Array(_) => builtins::array(),
            Value::Tuple(_) => builtins::tuple(),
            Value::Type(_) => builtins::type_type(),
            Value::Object(object) => object.type_ref().clone(),
        };
        Some(ty)
    }

    /// Name of the runtime type, `"Nothing"` for `Nothing`.
    pub fn type_name(&self) -> String {
        self.runtime_type()
            .map_or_else(|| "Nothing".to_string(), |t| t.name().to_string())
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric value widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            Value::I64(v) => Some(*v as f64),
            Value::I32(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::I64(_) | Value::I32(_) | Value::F64(_))
    }

    /// Natural ordering between comparable scalars. Numbers compare across widths.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
            (Value::I32(a), Value::I32(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64()?.partial_cmp(&b.as_f64()?),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Runtime types of `args`; `Nothing` arguments have an unknown type.
pub fn types_of(args: &[Value]) -> Vec<Option<TypeRef>> {
    args.iter().map(Value::runtime_type).collect()
}

/// Fail fast when a required value is `Nothing`.
pub fn ensure_present<'a>(value: &'a Value, name: &str) -> MemberResult<&'a Value> {
    if value.is_nothing() {
        return Err(MemberError::MissingArgument {
            name: name.to_string(),
        });
    }
    Ok(value)
}

// ========== From implementations ==========

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<TypeRef> for Value {
    fn from(v: TypeRef) -> Self {
        Value::Type(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nothing, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nothing
    }
}

// ========== Display implementation ==========

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::F64(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}.0", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "'{}'", v),
            Value::Nothing => write!(f, "nothing"),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Array(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_list(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Type(t) => write!(f, "{}", t),
            Value::Object(o) => write!(f, "{}", o),
        }
    }
}

// ========== Equality and hashing ==========

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Nothing, Value::Nothing) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            // Objects are compared by reference
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::I64(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::Nothing => {}
            Value::Str(s) => s.hash(state),
            Value::Array(items) | Value::Tuple(items) => items.hash(state),
            Value::Type(t) => t.hash(state),
            Value::Object(o) => (Arc::as_ptr(o) as usize).hash(state),
        }
    }
}

impl KeyPart for Value {
    fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Value::Array(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    fn deep_eq(&self, other: &Self) -> bool {
        self == other
    }
}
