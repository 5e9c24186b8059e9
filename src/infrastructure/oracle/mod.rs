pub mod fueleconomy;

use crate::domain::error::Result;
use crate::domain::vehicle::{VehicleCategory, VehicleQuery};
use async_trait::async_trait;

pub use fueleconomy::FuelEconomyClient;

/// External body-type lookup.
///
/// Any `Err` means "no classification available" for that vehicle; callers
/// never retry within a run.
#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    async fn classify(&self, query: &VehicleQuery) -> Result<VehicleCategory>;
}
