#![allow(non_snake_case)]
use num_traits::{Float, FloatConst, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

/// Main trait for floating point types stored in the matrix containers.
///
/// All numeric values held by the sparse, dense and adaptive containers are
/// represented on types implementing `FloatT`.  Implementations are provided
/// by blanket implementation for any type satisfying the bounds, so in
/// practice this covers `f32` and `f64`.
///
/// `Send + Sync` are required since the compressed containers share their
/// buffers between copies and allow striped concurrent assembly across threads.
///
/// `FloatT` relies on [`num_traits`](num_traits) for most of its constituent trait bounds.
pub trait FloatT:
    'static
    + Send
    + Sync
    + Float
    + FloatConst
    + NumAssign
    + Default
    + FromPrimitive
    + Display
    + LowerExp
    + Debug
    + Sized
{
}

impl<T> FloatT for T where
    T: 'static
        + Send
        + Sync
        + Float
        + FloatConst
        + NumAssign
        + Default
        + FromPrimitive
        + Display
        + LowerExp
        + Debug
        + Sized
{
}

/// Trait for convering Rust primitives to [`FloatT`](crate::algebra::FloatT)
///
/// This convenience trait is implemented on f32/64 and u32/64/usize so that
/// constants can be written as `(1e-18).as_T()` rather than the awful
/// `T::from_f64(1e-18).unwrap()`.  It is also used by the
/// [matrix settings](crate::settings::MatrixSettings) for converting
/// defaults of primitive type to [`FloatT`](crate::algebra::FloatT).
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_FloatT {
    ($ty:ty, $ident:ident) => {
        impl<T> AsFloatT<T> for $ty
        where
            T: std::ops::Mul<T, Output = T> + FromPrimitive + 'static,
        {
            #[inline]
            fn as_T(&self) -> T {
                T::$ident(*self).unwrap()
            }
        }
    };
}
impl_as_FloatT!(u32, from_u32);
impl_as_FloatT!(u64, from_u64);
impl_as_FloatT!(usize, from_usize);
impl_as_FloatT!(f32, from_f32);
impl_as_FloatT!(f64, from_f64);

/// Default relative tolerance used for pruning and zero detection.
///
/// Stored entries are compared against `eps / n` where `n` is the number
/// of columns of the container, so this is a per-entry relative tolerance.
pub fn default_eps<T: FloatT>() -> T {
    (1e-18).as_T()
}

// complement of |v| <= tol, so NaN counts as nonzero
#[inline]
pub(crate) fn is_nonzero<T: FloatT>(v: T, tol: T) -> bool {
    !(T::abs(v) <= tol)
}

// `eps / n`, the per-entry tolerance of a container with `n` columns (or rows)
#[inline]
pub(crate) fn relative_tolerance<T: FloatT>(eps: T, n: usize) -> T {
    if n == 0 {
        eps
    } else {
        eps / n.as_T()
    }
}

#[test]
fn test_as_T() {
    let x: f64 = (3usize).as_T();
    assert_eq!(x, 3.0);
    let y: f32 = (0.5).as_T();
    assert_eq!(y, 0.5);
    assert!(!is_nonzero(1e-20, default_eps::<f64>()));
    assert!(is_nonzero(-1e-3, default_eps::<f64>()));
    assert!(is_nonzero(f64::NAN, default_eps::<f64>()));
    assert!(is_nonzero(f64::INFINITY, 1.0));
    assert_eq!(relative_tolerance(1.0, 4), 0.25);
    assert_eq!(relative_tolerance(1.0, 0), 1.0);
}
