// Overview service - Progressive per-sensor summary cards
use crate::application::analytics::{stability, statistics, threshold};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::analysis::{Classification, SensorRef, Stability, Summary};
use crate::domain::range::Lookback;
use crate::domain::sensor::{SensorCatalog, SensorProfile};
use crate::domain::telemetry::Series;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorCard {
    pub sensor: SensorRef,
    pub sample_count: usize,
    pub stats: Summary,
    pub classification: Classification,
    pub stability: Stability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OverviewMessage {
    Skeleton { range: Lookback, sensors: Vec<SensorRef> },
    SensorCard(SensorCard),
    Complete { sensors: usize, duration_ms: i64 },
}

/// Summary card of one window: statistics, the classification of the window
/// average and the share of readings inside the band.
pub fn build_card(profile: &SensorProfile, series: &Series) -> SensorCard {
    let values = series.values();
    let band = profile.band();
    let stats = statistics::summarize(&values);

    SensorCard {
        sensor: SensorRef::from(profile),
        sample_count: values.len(),
        classification: threshold::classify(stats.avg, &band, &profile.unit),
        stability: stability::score(&values, &band),
        stats,
    }
}

#[derive(Clone)]
pub struct OverviewService {
    repository: Arc<dyn TelemetryRepository>,
    catalog: Arc<SensorCatalog>,
}

impl OverviewService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, catalog: Arc<SensorCatalog>) -> Self {
        Self { repository, catalog }
    }

    /// Emits a skeleton, then one card per sensor as its window arrives, then
    /// a completion event once every sensor has been handled.
    pub async fn stream_overview(&self, range: Lookback) -> mpsc::Receiver<OverviewMessage> {
        let (tx, rx) = mpsc::channel(100);
        let start_time = Instant::now();

        let skeleton = OverviewMessage::Skeleton {
            range,
            sensors: self.catalog.profiles().iter().map(SensorRef::from).collect(),
        };
        let _ = tx.send(skeleton).await;

        let mut handles = Vec::with_capacity(self.catalog.profiles().len());
        for profile in self.catalog.profiles() {
            let tx = tx.clone();
            let repo = self.repository.clone();
            let profile = profile.clone();

            handles.push(tokio::spawn(async move {
                let series = match repo.query_series(&profile.key, &range, None).await {
                    Ok(series) => series,
                    Err(e) => {
                        tracing::warn!("Error fetching window for {}: {:#}", profile.key, e);
                        Series::empty(profile.key.clone())
                    }
                };

                let card = build_card(&profile, &series);
                let _ = tx.send(OverviewMessage::SensorCard(card)).await;
            }));
        }

        let total = handles.len();
        tokio::spawn(async move {
            futures::future::join_all(handles).await;

            let duration_ms = start_time.elapsed().as_millis() as i64;
            tracing::debug!("Overview of {} sensors finished in {}ms", total, duration_ms);
            let _ = tx
                .send(OverviewMessage::Complete {
                    sensors: total,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
