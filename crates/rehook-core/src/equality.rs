//! Exact and shallow equality used by state and effect diffing.
//!
//! "Exact" means identity: primitives and strings compare by value, floats
//! by bit pattern, shared handles (`Rc`/`Arc`) by pointer. Structural
//! equality is deliberately not used anywhere in slot diffing: state slots
//! compare whole values exactly, effect dependency keys compare element-wise
//! with the shallow form, and upgrading either would change re-render
//! frequency semantics.

use smallvec::SmallVec;
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

/// Identity-style comparison for slot values and dependency-key elements.
///
/// Two values are exact-equal only when they have the same type and the same
/// identity. Implementations exist for the primitive scalar types, strings,
/// `Option`, and shared handles; anything else can be carried behind an `Rc`
/// and compared by pointer.
pub trait ExactEq: Any {
    fn exact_eq(&self, other: &dyn Any) -> bool;
    fn as_any(&self) -> &dyn Any;
}

macro_rules! impl_exact_eq_by_value {
    ($($ty:ty),* $(,)?) => {
        $(impl ExactEq for $ty {
            fn exact_eq(&self, other: &dyn Any) -> bool {
                other.downcast_ref::<$ty>().is_some_and(|other| self == other)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        })*
    };
}

impl_exact_eq_by_value!(
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    &'static str,
    String,
);

macro_rules! impl_exact_eq_by_bits {
    ($($ty:ty),* $(,)?) => {
        // Floats compare by bit pattern so that NaN is equal to itself and
        // 0.0 is distinct from -0.0: identity semantics, not IEEE comparison.
        $(impl ExactEq for $ty {
            fn exact_eq(&self, other: &dyn Any) -> bool {
                other
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| self.to_bits() == other.to_bits())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        })*
    };
}

impl_exact_eq_by_bits!(f32, f64);

impl<T: ?Sized + 'static> ExactEq for Rc<T> {
    fn exact_eq(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Rc<T>>()
            .is_some_and(|other| Rc::ptr_eq(self, other))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: ?Sized + 'static> ExactEq for Arc<T> {
    fn exact_eq(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Arc<T>>()
            .is_some_and(|other| Arc::ptr_eq(self, other))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: ExactEq> ExactEq for Option<T> {
    fn exact_eq(&self, other: &dyn Any) -> bool {
        match other.downcast_ref::<Option<T>>() {
            Some(other) => match (self, other) {
                (None, None) => true,
                (Some(a), Some(b)) => a.exact_eq(b.as_any()),
                _ => false,
            },
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Dependency key for an effect slot: an ordered sequence compared
/// element-wise by identity. Keys are short, so the elements live inline.
pub type DepsKey = SmallVec<[Box<dyn ExactEq>; 4]>;

/// Shallow sequence comparison: equal iff same length and every pairwise
/// element is exact-equal. A length mismatch is "not equal", never an error.
/// Used only for effect dependency keys, never for state values.
pub fn shallow_eq(a: &DepsKey, b: &DepsKey) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.exact_eq(b.as_any()))
}

/// Builds an effect dependency key. `deps![]` is the run-once key; omitting
/// the key entirely (passing `None`) re-runs the effect on every pass.
#[macro_export]
macro_rules! deps {
    ($($dep:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut key = $crate::equality::DepsKey::new();
        $(key.push(::std::boxed::Box::new($dep) as ::std::boxed::Box<dyn $crate::equality::ExactEq>);)*
        ::std::option::Option::Some(key)
    }};
}
