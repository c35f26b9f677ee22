//! Prediction generator port.

use async_trait::async_trait;

use crate::domain::{PredictionInputs, PredictionSet};
use crate::error::Error;

/// Produces a ranked finishing order from qualifying data.
///
/// Implementations may be slow or remote. Callers bound every call with a
/// timeout and treat [`Error::Busy`] as "try again on the next tick".
#[async_trait]
pub trait PredictionGenerator: Send + Sync {
    async fn generate(&self, inputs: &PredictionInputs) -> Result<PredictionSet, Error>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}
