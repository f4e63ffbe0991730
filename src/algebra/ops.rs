// Operator forms of the MatrixAlgebra methods.  They panic where the
// methods return an error.

use crate::algebra::*;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

macro_rules! impl_matrix_ops {
    ($Mat:ident) => {
        /// # Panics
        /// Panics if the operands differ in size.
        impl<'a, T: FloatT> Add<&'a $Mat<T>> for &'a $Mat<T> {
            type Output = $Mat<T>;
            fn add(self, rhs: &'a $Mat<T>) -> $Mat<T> {
                MatrixAlgebra::add(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        /// # Panics
        /// Panics if the operands differ in size.
        impl<'a, T: FloatT> Sub<&'a $Mat<T>> for &'a $Mat<T> {
            type Output = $Mat<T>;
            fn sub(self, rhs: &'a $Mat<T>) -> $Mat<T> {
                MatrixAlgebra::subtract(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        /// # Panics
        /// Panics if the inner dimensions differ.
        impl<'a, T: FloatT> Mul<&'a $Mat<T>> for &'a $Mat<T> {
            type Output = $Mat<T>;
            fn mul(self, rhs: &'a $Mat<T>) -> $Mat<T> {
                MatrixAlgebra::multiply(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        /// # Panics
        /// Panics if the operands differ in size, or if `rhs` has
        /// entries outside the pattern of `self`.
        impl<'a, T: FloatT> AddAssign<&'a $Mat<T>> for $Mat<T> {
            fn add_assign(&mut self, rhs: &'a $Mat<T>) {
                MatrixAlgebra::add_assign(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        /// # Panics
        /// Panics if the operands differ in size, or if `rhs` has
        /// entries outside the pattern of `self`.
        impl<'a, T: FloatT> SubAssign<&'a $Mat<T>> for $Mat<T> {
            fn sub_assign(&mut self, rhs: &'a $Mat<T>) {
                MatrixAlgebra::subtract_assign(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }
    };
}

impl_matrix_ops!(CsrMatrix);
impl_matrix_ops!(CscMatrix);
impl_matrix_ops!(DenseMatrix);
impl_matrix_ops!(SparseOrDenseMatrix);

#[test]
fn test_matrix_operators() {
    let A = DenseMatrix::from(&[
        [1., 2.], //
        [3., 4.],
    ]);
    let B = DenseMatrix::from(&[
        [0., 1.], //
        [1., 0.],
    ]);
    let C = &A + &B;
    assert_eq!(C.data(), &[1., 4., 3., 4.]);
    let D = &C - &B;
    assert_eq!(D, A);
    let E = &A * &B;
    assert_eq!(E.get_entry(0, 0), 2.);
    assert_eq!(E.get_entry(1, 1), 3.);

    let mut F = A.clone();
    F += &B;
    F -= &A;
    assert_eq!(F.data(), B.data());
}

#[test]
#[should_panic]
fn test_matrix_operators_panic() {
    let A = CsrMatrix::<f64>::zeros(2, 3);
    let B = CsrMatrix::<f64>::zeros(3, 2);
    let _ = &A + &B;
}
