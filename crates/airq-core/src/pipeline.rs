use anyhow::Result;

use crate::AirQualityRecord;

/// Destination for a finished record table
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    async fn emit(&mut self, records: &[AirQualityRecord]) -> Result<()>;
}
