//! Construction settings shared by the matrix containers.

use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned by settings validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A field has a value outside of its legal range
    #[error("Bad value for field {0}")]
    BadFieldValue(&'static str),
}

/// Settings used when allocating compressed and adaptive matrices.
///
/// ```
/// use sparsela::settings::*;
///
/// let settings = MatrixSettingsBuilder::<f64>::default()
///     .num_mutexes(4)
///     .sparse_limit(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(settings.num_mutexes, 4);
/// assert_eq!(settings.eps, 1e-18);
/// ```
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatrixSettings<T: FloatT> {
    ///number of stripe locks guarding concurrent row updates
    #[builder(default = "1")]
    pub num_mutexes: usize,

    ///relative tolerance for pruning and zero detection
    #[builder(default = "(1e-18).as_T()")]
    pub eps: T,

    ///density below which adaptive matrices choose sparse storage
    #[builder(default = "0.1")]
    pub sparse_limit: f64,

    ///use sparse storage for adaptive matrices filled with zero
    #[builder(default = "true")]
    pub use_sparse_if_zero: bool,
}

impl<T> Default for MatrixSettings<T>
where
    T: FloatT,
{
    fn default() -> MatrixSettings<T> {
        MatrixSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> MatrixSettings<T>
where
    T: FloatT,
{
    /// Checks that all fields hold legal values
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_num_mutexes(self.num_mutexes)?;
        validate_eps(self.eps)?;
        validate_sparse_limit(self.sparse_limit)?;
        Ok(())
    }
}

impl From<SettingsError> for MatrixSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        MatrixSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> MatrixSettingsBuilder<T>
where
    T: FloatT,
{
    /// Checks the fields that have been set so far
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(num_mutexes) = self.num_mutexes {
            validate_num_mutexes(num_mutexes)?;
        }
        if let Some(eps) = self.eps {
            validate_eps(eps)?;
        }
        if let Some(sparse_limit) = self.sparse_limit {
            validate_sparse_limit(sparse_limit)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_num_mutexes(num_mutexes: usize) -> Result<(), SettingsError> {
    if num_mutexes == 0 {
        return Err(SettingsError::BadFieldValue("num_mutexes"));
    }
    Ok(())
}

fn validate_eps<T: FloatT>(eps: T) -> Result<(), SettingsError> {
    if !(eps >= T::zero() && eps.is_finite()) {
        return Err(SettingsError::BadFieldValue("eps"));
    }
    Ok(())
}

fn validate_sparse_limit(sparse_limit: f64) -> Result<(), SettingsError> {
    if !(sparse_limit > 0.0 && sparse_limit <= 1.0) {
        return Err(SettingsError::BadFieldValue("sparse_limit"));
    }
    Ok(())
}

#[test]
fn test_settings_validate() {
    let settings = MatrixSettings::<f64>::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.num_mutexes, 1);
    assert_eq!(settings.sparse_limit, 0.1);
    assert!(settings.use_sparse_if_zero);

    assert!(MatrixSettingsBuilder::<f64>::default()
        .sparse_limit(1.5)
        .build()
        .is_err());
    assert!(MatrixSettingsBuilder::<f64>::default()
        .num_mutexes(0)
        .build()
        .is_err());
    assert!(MatrixSettingsBuilder::<f64>::default()
        .eps(-1.0)
        .build()
        .is_err());

    let mut settings = settings;
    settings.sparse_limit = 0.0;
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("sparse_limit"))
    );
}
