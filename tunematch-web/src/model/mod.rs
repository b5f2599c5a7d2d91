//! Classifier artifact formats
//!
//! Only inference lives here. Training happens elsewhere and produces the
//! artifact file this service loads.

pub mod xgboost;

pub use xgboost::TreeEnsemble;

use crate::types::FeatureVector;

/// Binary classifier over the fixed feature vector
pub trait Classifier: Send + Sync {
    /// `true` = positive affinity
    fn predict(&self, features: &FeatureVector) -> bool;
}
