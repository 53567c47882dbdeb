use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared kind of a column.
///
/// Every present cell holds a [`Value`] whose [`Value::column_type`] equals its column's
/// `ColumnType`. The numeric [`tag`](ColumnType::tag) is part of the binary format and must
/// never be renumbered.
///
/// Platform-sized C kinds follow the LP64 model: `Short` is 16-bit, `Int` is 32-bit and
/// `Long`/`LLong` are 64-bit, independent of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    UInt,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Short,
    UShort,
    Long,
    ULong,
    LLong,
    ULLong,
    Float,
    Double,
    /// Extended precision is not available; values are stored as `f64`.
    LDouble,
    Char,
    UChar,
    String,
    Bool,
    /// An externally owned reference the table stores but never dereferences.
    Ptr,
}

impl ColumnType {
    pub const ALL: [ColumnType; 24] = [
        ColumnType::Int,
        ColumnType::UInt,
        ColumnType::Int8,
        ColumnType::UInt8,
        ColumnType::Int16,
        ColumnType::UInt16,
        ColumnType::Int32,
        ColumnType::UInt32,
        ColumnType::Int64,
        ColumnType::UInt64,
        ColumnType::Short,
        ColumnType::UShort,
        ColumnType::Long,
        ColumnType::ULong,
        ColumnType::LLong,
        ColumnType::ULLong,
        ColumnType::Float,
        ColumnType::Double,
        ColumnType::LDouble,
        ColumnType::Char,
        ColumnType::UChar,
        ColumnType::String,
        ColumnType::Bool,
        ColumnType::Ptr,
    ];

    /// Stable numeric tag used by the binary and JSON encodings.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::UInt => "uint",
            ColumnType::Int8 => "int8",
            ColumnType::UInt8 => "uint8",
            ColumnType::Int16 => "int16",
            ColumnType::UInt16 => "uint16",
            ColumnType::Int32 => "int32",
            ColumnType::UInt32 => "uint32",
            ColumnType::Int64 => "int64",
            ColumnType::UInt64 => "uint64",
            ColumnType::Short => "short",
            ColumnType::UShort => "ushort",
            ColumnType::Long => "long",
            ColumnType::ULong => "ulong",
            ColumnType::LLong => "llong",
            ColumnType::ULLong => "ullong",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::LDouble => "ldouble",
            ColumnType::Char => "char",
            ColumnType::UChar => "uchar",
            ColumnType::String => "string",
            ColumnType::Bool => "bool",
            ColumnType::Ptr => "ptr",
        }
    }

    /// Encoded width of a present value in bytes, or `None` for variable-width text.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            ColumnType::Int8
            | ColumnType::UInt8
            | ColumnType::Char
            | ColumnType::UChar
            | ColumnType::Bool => Some(1),
            ColumnType::Int16 | ColumnType::UInt16 | ColumnType::Short | ColumnType::UShort => {
                Some(2)
            }
            ColumnType::Int
            | ColumnType::UInt
            | ColumnType::Int32
            | ColumnType::UInt32
            | ColumnType::Float => Some(4),
            ColumnType::Int64
            | ColumnType::UInt64
            | ColumnType::Long
            | ColumnType::ULong
            | ColumnType::LLong
            | ColumnType::ULLong
            | ColumnType::Double
            | ColumnType::LDouble
            | ColumnType::Ptr => Some(8),
            ColumnType::String => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            ColumnType::Float | ColumnType::Double | ColumnType::LDouble
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An address-sized handle to something the table does not own.
///
/// The table copies the handle verbatim: it never dereferences it, never frees what it points
/// to, and orders handles by their raw address. Ordering is therefore only meaningful within
/// one process.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OpaqueRef(usize);

impl OpaqueRef {
    pub const NULL: OpaqueRef = OpaqueRef(0);

    pub fn from_addr(addr: usize) -> Self {
        OpaqueRef(addr)
    }

    /// Capture the address of `ptr` (metadata of fat pointers is discarded).
    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        OpaqueRef(ptr as *const () as usize)
    }

    pub fn from_ref<T: ?Sized>(value: &T) -> Self {
        Self::from_ptr(value as *const T)
    }

    pub fn addr(self) -> usize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `true` when this handle was captured from `value`.
    pub fn refers_to<T: ?Sized>(self, value: &T) -> bool {
        self == Self::from_ref(value)
    }
}

impl fmt::Display for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A present cell value. Absence is modelled as `Option<Value>::None` at the cell level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Int(i32),
    UInt(u32),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Short(i16),
    UShort(u16),
    Long(i64),
    ULong(u64),
    LLong(i64),
    ULLong(u64),
    Float(f32),
    Double(f64),
    LDouble(f64),
    Char(i8),
    UChar(u8),
    String(String),
    Bool(bool),
    Ptr(OpaqueRef),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::UInt(_) => ColumnType::UInt,
            Value::Int8(_) => ColumnType::Int8,
            Value::UInt8(_) => ColumnType::UInt8,
            Value::Int16(_) => ColumnType::Int16,
            Value::UInt16(_) => ColumnType::UInt16,
            Value::Int32(_) => ColumnType::Int32,
            Value::UInt32(_) => ColumnType::UInt32,
            Value::Int64(_) => ColumnType::Int64,
            Value::UInt64(_) => ColumnType::UInt64,
            Value::Short(_) => ColumnType::Short,
            Value::UShort(_) => ColumnType::UShort,
            Value::Long(_) => ColumnType::Long,
            Value::ULong(_) => ColumnType::ULong,
            Value::LLong(_) => ColumnType::LLong,
            Value::ULLong(_) => ColumnType::ULLong,
            Value::Float(_) => ColumnType::Float,
            Value::Double(_) => ColumnType::Double,
            Value::LDouble(_) => ColumnType::LDouble,
            Value::Char(_) => ColumnType::Char,
            Value::UChar(_) => ColumnType::UChar,
            Value::String(_) => ColumnType::String,
            Value::Bool(_) => ColumnType::Bool,
            Value::Ptr(_) => ColumnType::Ptr,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<OpaqueRef> {
        match self {
            Value::Ptr(p) => Some(*p),
            _ => None,
        }
    }

    /// Widen any integer-like kind (including `Bool` and chars) to `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::Int(v) | Value::Int32(v) => v.into(),
            Value::UInt(v) | Value::UInt32(v) => v.into(),
            Value::Int8(v) | Value::Char(v) => v.into(),
            Value::UInt8(v) | Value::UChar(v) => v.into(),
            Value::Int16(v) | Value::Short(v) => v.into(),
            Value::UInt16(v) | Value::UShort(v) => v.into(),
            Value::Int64(v) | Value::Long(v) | Value::LLong(v) => v.into(),
            Value::UInt64(v) | Value::ULong(v) | Value::ULLong(v) => v.into(),
            Value::Bool(v) => v.into(),
            _ => return None,
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(f64::from(v)),
            Value::Double(v) | Value::LDouble(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<OpaqueRef> for Value {
    fn from(value: OpaqueRef) -> Self {
        Value::Ptr(value)
    }
}

/// Invokes `$callback!` once with every fixed-width kind as
/// `Variant => rust_type { setter, getter, finder, sorted_finder };` entries. Text is handled
/// separately because its accessors borrow instead of copy.
macro_rules! for_each_fixed_kind {
    ($callback:ident) => {
        $callback! {
            Int => i32 { set_int, get_int, find_int, sorted_find_int };
            UInt => u32 { set_uint, get_uint, find_uint, sorted_find_uint };
            Int8 => i8 { set_int8, get_int8, find_int8, sorted_find_int8 };
            UInt8 => u8 { set_uint8, get_uint8, find_uint8, sorted_find_uint8 };
            Int16 => i16 { set_int16, get_int16, find_int16, sorted_find_int16 };
            UInt16 => u16 { set_uint16, get_uint16, find_uint16, sorted_find_uint16 };
            Int32 => i32 { set_int32, get_int32, find_int32, sorted_find_int32 };
            UInt32 => u32 { set_uint32, get_uint32, find_uint32, sorted_find_uint32 };
            Int64 => i64 { set_int64, get_int64, find_int64, sorted_find_int64 };
            UInt64 => u64 { set_uint64, get_uint64, find_uint64, sorted_find_uint64 };
            Short => i16 { set_short, get_short, find_short, sorted_find_short };
            UShort => u16 { set_ushort, get_ushort, find_ushort, sorted_find_ushort };
            Long => i64 { set_long, get_long, find_long, sorted_find_long };
            ULong => u64 { set_ulong, get_ulong, find_ulong, sorted_find_ulong };
            LLong => i64 { set_llong, get_llong, find_llong, sorted_find_llong };
            ULLong => u64 { set_ullong, get_ullong, find_ullong, sorted_find_ullong };
            Float => f32 { set_float, get_float, find_float, sorted_find_float };
            Double => f64 { set_double, get_double, find_double, sorted_find_double };
            LDouble => f64 { set_ldouble, get_ldouble, find_ldouble, sorted_find_ldouble };
            Char => i8 { set_char, get_char, find_char, sorted_find_char };
            UChar => u8 { set_uchar, get_uchar, find_uchar, sorted_find_uchar };
            Bool => bool { set_bool, get_bool, find_bool, sorted_find_bool };
            Ptr => OpaqueRef { set_ptr, get_ptr, find_ptr, sorted_find_ptr };
        }
    };
}

pub(crate) use for_each_fixed_kind;
