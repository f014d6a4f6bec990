//! Builtin types.
//!
//! ```text
//! Any
//! ├── Number <: Serializable
//! │   ├── Int32   <: Comparable
//! │   ├── Int64   <: Comparable
//! │   └── Float64 <: Comparable
//! ├── Bool   <: Serializable, Comparable
//! ├── Char   <: Serializable, Comparable
//! ├── String <: Serializable, Comparable, CharSequence
//! ├── Array  <: Serializable
//! ├── Tuple
//! └── Type
//!
//! i32 -> Int32, i64 -> Int64, f64 -> Float64, bool -> Bool, char -> Char
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;

use super::type_info::{TypeInfo, TypeRef};
use crate::error::Fault;
use crate::member::Member;
use crate::value::Value;

struct Builtins {
    any: TypeRef,
    comparable: TypeRef,
    serializable: TypeRef,
    char_sequence: TypeRef,
    number: TypeRef,
    int32: TypeRef,
    int64: TypeRef,
    float64: TypeRef,
    boolean: TypeRef,
    character: TypeRef,
    string: TypeRef,
    array: TypeRef,
    tuple: TypeRef,
    type_: TypeRef,
    prim_i32: TypeRef,
    prim_i64: TypeRef,
    prim_f64: TypeRef,
    prim_bool: TypeRef,
    prim_char: TypeRef,
}

static BUILTINS: Lazy<Builtins> = Lazy::new(Builtins::create);

impl Builtins {
    fn create() -> Self {
        // Every class names its parent explicitly: the default parent is `any()`,
        // which would re-enter this initializer.
        let any = TypeInfo::class("Any").root().build();
        let comparable = TypeInfo::capability_set("Comparable").build();
        let serializable = TypeInfo::capability_set("Serializable").build();
        let char_sequence = TypeInfo::capability_set("CharSequence").build();

        let number = TypeInfo::class("Number")
            .extends(&any)
            .implements(&serializable)
            .build();
        let numeric = |name: &str| {
            TypeInfo::class(name)
                .extends(&number)
                .implements(&comparable)
                .build()
        };
        let int32 = numeric("Int32");
        let int64 = numeric("Int64");
        let float64 = numeric("Float64");

        let scalar = |name: &str| {
            TypeInfo::class(name)
                .extends(&any)
                .implements(&serializable)
                .implements(&comparable)
                .build()
        };
        let boolean = scalar("Bool");
        let character = scalar("Char");
        let string = TypeInfo::class("String")
            .extends(&any)
            .implements(&serializable)
            .implements(&comparable)
            .implements(&char_sequence)
            .build();

        let array = TypeInfo::class("Array")
            .extends(&any)
            .implements(&serializable)
            .build();
        let tuple = TypeInfo::class("Tuple").extends(&any).build();
        let type_ = TypeInfo::class("Type").extends(&any).build();

        let builtins = Builtins {
            prim_i32: TypeInfo::primitive("i32", &int32),
            prim_i64: TypeInfo::primitive("i64", &int64),
            prim_f64: TypeInfo::primitive("f64", &float64),
            prim_bool: TypeInfo::primitive("bool", &boolean),
            prim_char: TypeInfo::primitive("char", &character),
            any,
            comparable,
            serializable,
            char_sequence,
            number,
            int32,
            int64,
            float64,
            boolean,
            character,
            string,
            array,
            tuple,
            type_,
        };
        builtins.declare_members();
        builtins
    }

    fn all(&self) -> [&TypeRef; 19] {
        [
            &self.any,
            &self.comparable,
            &self.serializable,
            &self.char_sequence,
            &self.number,
            &self.int32,
            &self.int64,
            &self.float64,
            &self.boolean,
            &self.character,
            &self.string,
            &self.array,
            &self.tuple,
            &self.type_,
            &self.prim_i32,
            &self.prim_i64,
            &self.prim_f64,
            &self.prim_bool,
            &self.prim_char,
        ]
    }

    fn declare_members(&self) {
        // Any
        self.any.declare(Member::new("to_string", vec![], |target, _| {
            Ok(Value::Str(target.to_string()))
        }));
        self.any.declare(Member::new(
            "equals",
            vec![self.any.clone()],
            |target, args| Ok(Value::Bool(target == arg(args, 0)?)),
        ));
        self.any.declare(Member::new("hash_code", vec![], |target, _| {
            let mut hasher = DefaultHasher::new();
            target.hash(&mut hasher);
            Ok(Value::I64(hasher.finish() as i64))
        }));
        self.any.declare(Member::new("type_of", vec![], |target, _| {
            Ok(target
                .runtime_type()
                .map_or(Value::Nothing, Value::Type))
        }));

        // Comparable
        self.comparable.declare(Member::new(
            "compare_to",
            vec![self.any.clone()],
            |target, args| {
                let other = arg(args, 0)?;
                target
                    .compare(other)
                    .map(|ordering| Value::I32(ordering as i32))
                    .ok_or_else(|| {
                        Fault::illegal_argument(format!("cannot compare {} with {}", target, other))
                    })
            },
        ));

        // Number
        self.number.declare(Member::new("double_value", vec![], |target, _| {
            target
                .as_f64()
                .map(Value::F64)
                .ok_or_else(|| Fault::illegal_argument(format!("{} is not a number", target)))
        }));
        self.number.declare(Member::new("long_value", vec![], |target, _| {
            match target {
                Value::I64(v) => Ok(Value::I64(*v)),
                Value::I32(v) => Ok(Value::I64(i64::from(*v))),
                Value::F64(v) => Ok(Value::I64(*v as i64)),
                other => Err(Fault::illegal_argument(format!("{} is not a number", other))),
            }
        }));

        // Int64
        self.int64.declare(Member::new("abs", vec![], |target, _| {
            let v = int64_of(target)?;
            v.checked_abs()
                .map(Value::I64)
                .ok_or_else(|| Fault::raised(format!("abs({}) overflows", v)))
        }));
        self.int64.declare(Member::new(
            "plus",
            vec![self.prim_i64.clone()],
            |target, args| {
                let (a, b) = (int64_of(target)?, int64_of(arg(args, 0)?)?);
                a.checked_add(b)
                    .map(Value::I64)
                    .ok_or_else(|| Fault::raised(format!("{} + {} overflows", a, b)))
            },
        ));

        // String
        self.string.declare(Member::new("length", vec![], |target, _| {
            Ok(Value::I64(str_of(target)?.chars().count() as i64))
        }));
        self.string.declare(Member::new(
            "concat",
            vec![self.string.clone()],
            |target, args| {
                let mut s = str_of(target)?.to_string();
                s.push_str(str_of(arg(args, 0)?)?);
                Ok(Value::Str(s))
            },
        ));
        self.string.declare(Member::new(
            "starts_with",
            vec![self.string.clone()],
            |target, args| {
                Ok(Value::Bool(
                    str_of(target)?.starts_with(str_of(arg(args, 0)?)?),
                ))
            },
        ));
        self.string.declare(Member::new(
            "char_at",
            vec![self.prim_i64.clone()],
            |target, args| {
                let index = int64_of(arg(args, 0)?)?;
                let s = str_of(target)?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(Value::Char)
                    .ok_or_else(|| {
                        Fault::illegal_argument(format!(
                            "index {} out of bounds for length {}",
                            index,
                            s.chars().count()
                        ))
                    })
            },
        ));

        // Array
        self.array.declare(Member::new("length", vec![], |target, _| match target {
            Value::Array(items) => Ok(Value::I64(items.len() as i64)),
            other => Err(Fault::illegal_argument(format!("{} is not an array", other))),
        }));
    }
}

fn arg(args: &[Value], index: usize) -> Result<&Value, Fault> {
    args.get(index)
        .ok_or_else(|| Fault::illegal_argument(format!("missing argument {}", index + 1)))
}

fn int64_of(value: &Value) -> Result<i64, Fault> {
    match value {
        Value::I64(v) => Ok(*v),
        Value::I32(v) => Ok(i64::from(*v)),
        other => Err(Fault::illegal_argument(format!("{} is not an integer", other))),
    }
}

fn str_of(value: &Value) -> Result<&str, Fault> {
    value
        .as_str()
        .ok_or_else(|| Fault::illegal_argument(format!("{} is not a string", value)))
}

/// The root class. Every non-primitive type is assignable to it.
pub fn any() -> TypeRef {
    BUILTINS.any.clone()
}

pub fn comparable() -> TypeRef {
    BUILTINS.comparable.clone()
}

pub fn serializable() -> TypeRef {
    BUILTINS.serializable.clone()
}

pub fn char_sequence() -> TypeRef {
    BUILTINS.char_sequence.clone()
}

pub fn number() -> TypeRef {
    BUILTINS.number.clone()
}

pub fn int32() -> TypeRef {
    BUILTINS.int32.clone()
}

pub fn int64() -> TypeRef {
    BUILTINS.int64.clone()
}

pub fn float64() -> TypeRef {
    BUILTINS.float64.clone()
}

pub fn boolean() -> TypeRef {
    BUILTINS.boolean.clone()
}

pub fn character() -> TypeRef {
    BUILTINS.character.clone()
}

pub fn string() -> TypeRef {
    BUILTINS.string.clone()
}

pub fn array() -> TypeRef {
    BUILTINS.array.clone()
}

pub fn tuple() -> TypeRef {
    BUILTINS.tuple.clone()
}

/// Runtime type of `Value::Type`.
pub fn type_type() -> TypeRef {
    BUILTINS.type_.clone()
}

pub fn prim_i32() -> TypeRef {
    BUILTINS.prim_i32.clone()
}

pub fn prim_i64() -> TypeRef {
    BUILTINS.prim_i64.clone()
}

pub fn prim_f64() -> TypeRef {
    BUILTINS.prim_f64.clone()
}

pub fn prim_bool() -> TypeRef {
    BUILTINS.prim_bool.clone()
}

pub fn prim_char() -> TypeRef {
    BUILTINS.prim_char.clone()
}

/// Look a builtin type up by name (`"Int64"`, `"i64"`, ...).
pub fn by_name(name: &str) -> Option<TypeRef> {
    BUILTINS
        .all()
        .into_iter()
        .find(|t| t.name() == name)
        .cloned()
}
