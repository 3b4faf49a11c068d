// Record-level normalization: location, causes and duration in one pass.
use tracing::debug;

use crate::classify::CauseClassifier;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::interval;
use crate::normalize::LocationNormalizer;
use crate::types::{NormalizedOutage, OutageRecord};

/// Field-level transforms bundled with their configuration tables.
///
/// Built once; immutable afterwards, so batch reports can share it across
/// threads by reference.
#[derive(Debug, Clone)]
pub struct Engine {
    pub locations: LocationNormalizer,
    pub causes: CauseClassifier,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            locations: LocationNormalizer::new(&config.location_aliases),
            causes: CauseClassifier::new(&config.cause_rules)?,
        })
    }

    pub fn normalize(&self, record: &OutageRecord) -> NormalizedOutage {
        let duration_hours = match interval::duration_hours(record) {
            Ok(h) => Some(h),
            Err(e) => {
                debug!(location = %record.location_raw, error = %e, "no duration for record");
                None
            }
        };
        NormalizedOutage {
            location_canonical: self.locations.resolve(&record.location_raw).to_string(),
            causes: self.causes.classify_all(&record.tags_raw),
            duration_hours,
        }
    }
}
