//! Error types for the indicator engine.
//!
//! Each analysis module owns a typed error enum with stable machine-readable
//! codes. [`IndicatorError`] attaches the indicator name to a module error so
//! batch callers can mark a single indicator as unavailable and carry on.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    interaction::InteractionError, mean::MeanIndicatorError, regression::RegressionError,
    stn::StnError,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Failure of one named indicator.
///
/// The wrapped error explains why the indicator could not be computed; the
/// `indicator` field names the metric (for example `DRoC` or `stn`) so the
/// failure can be reported without aborting unrelated indicators.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum IndicatorError {
    /// A piecewise regression indicator could not be fitted.
    #[error("indicator `{indicator}` failed: {error}")]
    Regression {
        /// Name of the indicator being computed.
        indicator: Arc<str>,
        /// Underlying regression failure.
        #[source]
        error: RegressionError,
    },
    /// The search trajectory network could not be analysed.
    #[error("indicator `{indicator}` failed: {error}")]
    Trajectory {
        /// Name of the indicator being computed.
        indicator: Arc<str>,
        /// Underlying trajectory network failure.
        #[source]
        error: StnError,
    },
    /// The interaction network could not be analysed.
    #[error("indicator `{indicator}` failed: {error}")]
    Interaction {
        /// Name of the indicator being computed.
        indicator: Arc<str>,
        /// Underlying interaction network failure.
        #[source]
        error: InteractionError,
    },
    /// A mean-based indicator could not be computed.
    #[error("indicator `{indicator}` failed: {error}")]
    Mean {
        /// Name of the indicator being computed.
        indicator: Arc<str>,
        /// Underlying failure.
        #[source]
        error: MeanIndicatorError,
    },
}

define_error_codes! {
    /// Stable codes describing [`IndicatorError`] variants.
    enum IndicatorErrorCode for IndicatorError {
        /// A piecewise regression indicator could not be fitted.
        Regression => Regression { .. } => "INDICATOR_REGRESSION_FAILURE",
        /// The search trajectory network could not be analysed.
        Trajectory => Trajectory { .. } => "INDICATOR_TRAJECTORY_FAILURE",
        /// The interaction network could not be analysed.
        Interaction => Interaction { .. } => "INDICATOR_INTERACTION_FAILURE",
        /// A mean-based indicator could not be computed.
        Mean => Mean { .. } => "INDICATOR_MEAN_FAILURE",
    }
}

impl IndicatorError {
    /// Returns the name of the indicator that failed.
    #[must_use]
    pub fn indicator(&self) -> &str {
        match self {
            Self::Regression { indicator, .. }
            | Self::Trajectory { indicator, .. }
            | Self::Interaction { indicator, .. }
            | Self::Mean { indicator, .. } => indicator,
        }
    }

    /// Returns the stable code of the wrapped module error.
    ///
    /// # Examples
    /// ```
    /// use metabehave_core::{IndicatorError, StnError};
    ///
    /// let err = IndicatorError::trajectory("ntotal", StnError::EmptyTrajectory);
    /// assert_eq!(err.source_code(), "STN_EMPTY_TRAJECTORY");
    /// ```
    #[must_use]
    pub const fn source_code(&self) -> &'static str {
        match self {
            Self::Regression { error, .. } => error.code().as_str(),
            Self::Trajectory { error, .. } => error.code().as_str(),
            Self::Interaction { error, .. } => error.code().as_str(),
            Self::Mean { error, .. } => error.code().as_str(),
        }
    }

    /// Wraps a regression failure for `indicator`.
    pub fn regression(indicator: impl Into<Arc<str>>, error: RegressionError) -> Self {
        Self::Regression {
            indicator: indicator.into(),
            error,
        }
    }

    /// Wraps a trajectory network failure for `indicator`.
    pub fn trajectory(indicator: impl Into<Arc<str>>, error: StnError) -> Self {
        Self::Trajectory {
            indicator: indicator.into(),
            error,
        }
    }

    /// Wraps an interaction network failure for `indicator`.
    pub fn interaction(indicator: impl Into<Arc<str>>, error: InteractionError) -> Self {
        Self::Interaction {
            indicator: indicator.into(),
            error,
        }
    }

    /// Wraps a mean-indicator failure for `indicator`.
    pub fn mean(indicator: impl Into<Arc<str>>, error: MeanIndicatorError) -> Self {
        Self::Mean {
            indicator: indicator.into(),
            error,
        }
    }
}

/// Convenient alias for results returned by the indicator facade helpers.
pub type Result<T> = core::result::Result<T, IndicatorError>;
