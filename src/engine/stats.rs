use crate::store::schema::HistoryEntry;

/// Aggregate figures for the history header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistorySummary {
    pub count: usize,
    pub mean_score: f64,
    pub best_score: u32,
    /// Mean of per-entry accuracy, as a fraction.
    pub mean_accuracy: f64,
}

impl HistorySummary {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a HistoryEntry>,
    {
        let mut summary = Self::default();
        let mut score_sum = 0u64;
        let mut accuracy_sum = 0.0;
        for entry in entries {
            summary.count += 1;
            score_sum += u64::from(entry.score);
            accuracy_sum += entry.accuracy();
            summary.best_score = summary.best_score.max(entry.score);
        }
        if summary.count > 0 {
            summary.mean_score = score_sum as f64 / summary.count as f64;
            summary.mean_accuracy = accuracy_sum / summary.count as f64;
        }
        summary
    }
}

/// One point per entry, oldest first.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformancePoint {
    pub index: usize,
    pub score: u32,
    pub accuracy_pct: f64,
}

pub fn performance_series<'a, I>(entries: I) -> Vec<PerformancePoint>
where
    I: IntoIterator<Item = &'a HistoryEntry>,
{
    let mut sorted: Vec<&HistoryEntry> = entries.into_iter().collect();
    sorted.sort_by_key(|e| (e.date, e.id));
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, e)| PerformancePoint {
            index: index + 1,
            score: e.score,
            accuracy_pct: e.accuracy() * 100.0,
        })
        .collect()
}
