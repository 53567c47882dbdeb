use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::value::{ColumnType, Value};

type CompareFn = dyn Fn(Option<&Value>, Option<&Value>) -> Ordering + Send + Sync;

/// Three-way ordering over two (possibly absent) cells of one column.
///
/// Every column carries one. [`Comparator::default_for`] provides the standard ordering for a
/// kind; callers can install their own with [`Table::set_column_comparator`].
///
/// [`Table::set_column_comparator`]: crate::Table::set_column_comparator
#[derive(Clone)]
pub struct Comparator {
    func: Arc<CompareFn>,
    default_for: Option<ColumnType>,
}

impl Comparator {
    /// Wrap a function that sees absent cells as `None`.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Option<&Value>, Option<&Value>) -> Ordering + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            default_for: None,
        }
    }

    /// Wrap a function over present values. Absent cells order before present ones and two
    /// absent cells are equal.
    pub fn from_values<F>(func: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        Self::new(move |a, b| absent_first(a, b, &func))
    }

    /// The standard ordering for `column_type`.
    pub fn default_for(column_type: ColumnType) -> Self {
        let func = default_value_ordering(column_type);
        Self {
            default_for: Some(column_type),
            ..Self::new(move |a, b| absent_first(a, b, func))
        }
    }

    pub fn compare(&self, a: Option<&Value>, b: Option<&Value>) -> Ordering {
        (self.func)(a, b)
    }

    /// `true` for comparators produced by [`Comparator::default_for`].
    pub fn is_default(&self) -> bool {
        self.default_for.is_some()
    }

    /// The same comparator with its result flipped.
    pub fn reversed(&self) -> Self {
        let func = Arc::clone(&self.func);
        Self::new(move |a, b| func(a, b).reverse())
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.default_for {
            Some(kind) => write!(f, "Comparator(default {kind})"),
            None => f.write_str("Comparator(custom)"),
        }
    }
}

fn absent_first(
    a: Option<&Value>,
    b: Option<&Value>,
    func: impl Fn(&Value, &Value) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => func(a, b),
    }
}

fn default_value_ordering(column_type: ColumnType) -> fn(&Value, &Value) -> Ordering {
    match column_type {
        ColumnType::String => compare_text,
        ColumnType::Ptr => compare_refs,
        kind if kind.is_float() => compare_floats,
        _ => compare_integers,
    }
}

// Mixed kinds can only reach these through hand-built values; they order by tag.
fn by_kind(a: &Value, b: &Value) -> Ordering {
    a.column_type().cmp(&b.column_type())
}

fn compare_integers(a: &Value, b: &Value) -> Ordering {
    match (a.as_i128(), b.as_i128()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => by_kind(a, b),
    }
}

/// Numeric comparison where `-0.0 == 0.0`; NaNs fall back to IEEE total order so the result
/// stays a total order.
fn compare_floats(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y)),
        _ => by_kind(a, b),
    }
}

fn compare_text(a: &Value, b: &Value) -> Ordering {
    match (a.as_str(), b.as_str()) {
        (Some(x), Some(y)) => x.as_bytes().cmp(y.as_bytes()),
        _ => by_kind(a, b),
    }
}

fn compare_refs(a: &Value, b: &Value) -> Ordering {
    match (a.as_ptr(), b.as_ptr()) {
        (Some(x), Some(y)) => x.addr().cmp(&y.addr()),
        _ => by_kind(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OpaqueRef;

    #[test]
    fn absent_orders_first() {
        let cmp = Comparator::default_for(ColumnType::Int);
        let one = Value::Int(1);
        assert_eq!(cmp.compare(None, None), Ordering::Equal);
        assert_eq!(cmp.compare(None, Some(&one)), Ordering::Less);
        assert_eq!(cmp.compare(Some(&one), None), Ordering::Greater);
    }

    #[test]
    fn every_kind_has_a_default() {
        for kind in ColumnType::ALL {
            let cmp = Comparator::default_for(kind);
            assert!(cmp.is_default());
            assert_eq!(cmp.compare(None, None), Ordering::Equal);
        }
    }

    #[test]
    fn integers_compare_numerically() {
        let cmp = Comparator::default_for(ColumnType::UInt64);
        assert_eq!(
            cmp.compare(Some(&Value::UInt64(u64::MAX)), Some(&Value::UInt64(1))),
            Ordering::Greater
        );
        let cmp = Comparator::default_for(ColumnType::Char);
        assert_eq!(
            cmp.compare(Some(&Value::Char(-1)), Some(&Value::Char(1))),
            Ordering::Less
        );
    }

    #[test]
    fn floats_treat_signed_zero_as_equal() {
        let cmp = Comparator::default_for(ColumnType::Double);
        assert_eq!(
            cmp.compare(Some(&Value::Double(-0.0)), Some(&Value::Double(0.0))),
            Ordering::Equal
        );
        assert_eq!(
            cmp.compare(Some(&Value::Double(f64::NAN)), Some(&Value::Double(1.0))),
            Ordering::Greater
        );
    }

    #[test]
    fn text_is_ordinal() {
        let cmp = Comparator::default_for(ColumnType::String);
        let upper = Value::from("B");
        let lower = Value::from("a");
        assert_eq!(cmp.compare(Some(&upper), Some(&lower)), Ordering::Less);
    }

    #[test]
    fn refs_order_by_address() {
        let cmp = Comparator::default_for(ColumnType::Ptr);
        let low = Value::Ptr(OpaqueRef::from_addr(0x10));
        let high = Value::Ptr(OpaqueRef::from_addr(0x20));
        assert_eq!(cmp.compare(Some(&low), Some(&high)), Ordering::Less);
    }

    #[test]
    fn custom_and_reversed() {
        let cmp = Comparator::from_values(|a, b| {
            let a = a.as_str().unwrap_or_default().len();
            let b = b.as_str().unwrap_or_default().len();
            a.cmp(&b)
        });
        assert!(!cmp.is_default());
        let short = Value::from("zz");
        let long = Value::from("aaaa");
        assert_eq!(cmp.compare(Some(&short), Some(&long)), Ordering::Less);
        assert_eq!(
            cmp.reversed().compare(Some(&short), Some(&long)),
            Ordering::Greater
        );
        assert_eq!(cmp.compare(None, Some(&short)), Ordering::Less);
    }
}
