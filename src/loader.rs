use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{DashboardError, DashboardResult};
use crate::models::{
    ClusterLabel, DatasetTrack, PerformanceRecord, RecommendationEntry, SocialRecord, TeenRecord,
    UserRecord,
};

pub const TEEN_DATA_FILE: &str = "teen_processed.csv";
pub const SOCIAL_DATA_FILE: &str = "social_processed.csv";
pub const TEEN_CLUSTERS_FILE: &str = "teen_clusters.csv";
pub const SOCIAL_CLUSTERS_FILE: &str = "social_clusters.csv";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.json";
pub const PERFORMANCE_FILE: &str = "algorithm_performance.csv";

pub const PERFORMANCE_COLUMNS: [&str; 5] = [
    "Algorithm",
    "Dataset",
    "Silhouette_Score",
    "Davies_Bouldin_Score",
    "Best_Model",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub teen: Vec<TeenRecord>,
    pub social: Vec<SocialRecord>,
    pub recommendations: Vec<RecommendationEntry>,
    pub performance: Vec<PerformanceRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterShare {
    pub cluster: u8,
    pub name: &'static str,
    pub count: usize,
    pub percent: f64,
}

impl Datasets {
    pub fn total_users(&self) -> usize {
        self.teen.len() + self.social.len()
    }

    // Rows without the optional exercise column are left out.
    pub fn average_exercise(&self) -> Option<f64> {
        let logged: Vec<f64> = self.social.iter().filter_map(|r| r.exercise_hours).collect();
        if logged.is_empty() {
            return None;
        }
        Some(logged.iter().sum::<f64>() / logged.len() as f64)
    }

    pub fn cluster_shares(&self, track: DatasetTrack) -> Vec<ClusterShare> {
        match track {
            DatasetTrack::Teen => cluster_shares(&self.teen, track),
            DatasetTrack::SocialMedia => cluster_shares(&self.social, track),
        }
    }

    pub fn algorithms(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .performance
            .iter()
            .map(|record| record.algorithm.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn best_silhouette(&self) -> Option<&PerformanceRecord> {
        self.performance.iter().max_by(|a, b| {
            a.silhouette_score
                .partial_cmp(&b.silhouette_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn best_model(&self, track: DatasetTrack) -> Option<&PerformanceRecord> {
        let rows: Vec<&PerformanceRecord> = self
            .performance
            .iter()
            .filter(|record| record.track() == Some(track))
            .collect();
        rows.iter()
            .copied()
            .find(|record| record.best_model)
            .or_else(|| {
                rows.into_iter().max_by(|a, b| {
                    a.silhouette_score
                        .partial_cmp(&b.silhouette_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            })
    }
}

pub fn mean<R, F>(records: &[R], field: F) -> f64
where
    F: Fn(&R) -> f64,
{
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(field).sum::<f64>() / records.len() as f64
}

fn cluster_shares<R: UserRecord>(records: &[R], track: DatasetTrack) -> Vec<ClusterShare> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.cluster()).or_insert(0) += 1;
    }

    let names = track.cluster_names();
    let total = records.len().max(1) as f64;
    counts
        .into_iter()
        .map(|(cluster, count)| ClusterShare {
            cluster,
            name: names.get(cluster as usize).copied().unwrap_or("Unknown group"),
            count,
            percent: count as f64 * 100.0 / total,
        })
        .collect()
}

/// Process-wide memo over [`load_datasets`]. Populated on first success and
/// never refreshed.
pub struct DataCache {
    data_dir: PathBuf,
    cell: OnceCell<Arc<Datasets>>,
}

impl DataCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> DashboardResult<Arc<Datasets>> {
        if let Some(cached) = self.cell.get() {
            debug!(target: "dashboard::loader", "serving datasets from cache");
            return Ok(Arc::clone(cached));
        }
        self.cell
            .get_or_try_init(|| load_datasets(&self.data_dir).map(Arc::new))
            .map(Arc::clone)
    }
}

pub fn load_datasets(data_dir: &Path) -> DashboardResult<Datasets> {
    let mut teen: Vec<TeenRecord> = read_table(&data_dir.join(TEEN_DATA_FILE))?;
    let mut social: Vec<SocialRecord> = read_table(&data_dir.join(SOCIAL_DATA_FILE))?;

    let teen_clusters_path = data_dir.join(TEEN_CLUSTERS_FILE);
    let teen_clusters: Vec<ClusterLabel> = read_table(&teen_clusters_path)?;
    merge_clusters(&mut teen, &teen_clusters, &teen_clusters_path)?;

    let social_clusters_path = data_dir.join(SOCIAL_CLUSTERS_FILE);
    let social_clusters: Vec<ClusterLabel> = read_table(&social_clusters_path)?;
    merge_clusters(&mut social, &social_clusters, &social_clusters_path)?;

    let recommendations = read_recommendations(&data_dir.join(RECOMMENDATIONS_FILE))?;
    let performance = read_performance(&data_dir.join(PERFORMANCE_FILE))?;

    info!(
        target: "dashboard::loader",
        data_dir = %data_dir.display(),
        teen = teen.len(),
        social = social.len(),
        recommendations = recommendations.len(),
        performance = performance.len(),
        "datasets loaded"
    );

    Ok(Datasets {
        teen,
        social,
        recommendations,
        performance,
    })
}

fn csv_reader(path: &Path) -> DashboardResult<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| DashboardError::file_load(path, err.to_string()))
}

fn read_table<T: DeserializeOwned>(path: &Path) -> DashboardResult<Vec<T>> {
    let mut reader = csv_reader(path)?;
    read_rows(&mut reader, path)
}

fn read_rows<T: DeserializeOwned>(
    reader: &mut csv::Reader<std::fs::File>,
    path: &Path,
) -> DashboardResult<Vec<T>> {
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        let row = result
            .map_err(|err| DashboardError::file_load(path, format!("row {}: {err}", index + 1)))?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(DashboardError::file_load(path, "file has no data rows"));
    }
    debug!(target: "dashboard::loader", path = %path.display(), rows = rows.len(), "table read");
    Ok(rows)
}

fn merge_clusters<R: UserRecord>(
    records: &mut [R],
    labels: &[ClusterLabel],
    path: &Path,
) -> DashboardResult<()> {
    if records.len() != labels.len() {
        return Err(DashboardError::file_load(
            path,
            format!(
                "{} cluster labels for {} user rows",
                labels.len(),
                records.len()
            ),
        ));
    }

    let mut seen = [false; 2];
    for (index, (record, label)) in records.iter_mut().zip(labels).enumerate() {
        let cluster = match label.cluster {
            0 => 0u8,
            1 => 1u8,
            other => {
                return Err(DashboardError::file_load(
                    path,
                    format!("row {}: cluster {other} is not 0 or 1", index + 1),
                ))
            }
        };
        seen[cluster as usize] = true;
        record.set_cluster(cluster);
    }

    if !seen.iter().all(|present| *present) {
        return Err(DashboardError::file_load(
            path,
            "expected both cluster 0 and cluster 1",
        ));
    }
    Ok(())
}

fn read_performance(path: &Path) -> DashboardResult<Vec<PerformanceRecord>> {
    let mut reader = csv_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|err| DashboardError::file_load(path, err.to_string()))?
        .clone();
    for column in PERFORMANCE_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(DashboardError::file_load(
                path,
                format!("missing column {column}"),
            ));
        }
    }
    read_rows(&mut reader, path)
}

#[derive(Deserialize)]
struct EntryBody {
    recommendations: Vec<String>,
    #[serde(default)]
    sleep_tips: Vec<String>,
}

#[derive(Deserialize)]
struct ListedEntry {
    cluster: String,
    #[serde(flatten)]
    body: EntryBody,
}

fn read_recommendations(path: &Path) -> DashboardResult<Vec<RecommendationEntry>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| DashboardError::file_load(path, err.to_string()))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|err| DashboardError::file_load(path, err.to_string()))?;
    let entries = parse_recommendations(value)
        .map_err(|message| DashboardError::file_load(path, message))?;

    if entries.is_empty() {
        return Err(DashboardError::file_load(path, "no recommendation entries"));
    }
    if let Some(empty) = entries.iter().find(|entry| entry.recommendations.is_empty()) {
        return Err(DashboardError::file_load(
            path,
            format!("entry {:?} has no recommendations", empty.key),
        ));
    }
    Ok(entries)
}

/// Accepts either a list of `{cluster, recommendations, sleep_tips}` objects
/// or an object of tracks (`teen_dataset`, `social_dataset`) mapping group
/// names to `{recommendations, sleep_tips}`.
fn parse_recommendations(value: Value) -> Result<Vec<RecommendationEntry>, String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                let listed: ListedEntry =
                    serde_json::from_value(item).map_err(|err| err.to_string())?;
                Ok(RecommendationEntry {
                    key: listed.cluster,
                    track: None,
                    recommendations: listed.body.recommendations,
                    sleep_tips: listed.body.sleep_tips,
                })
            })
            .collect(),
        Value::Object(tracks) => {
            let mut entries = Vec::new();
            for (track_key, groups) in tracks {
                let track = DatasetTrack::from_label(&track_key);
                let groups: Map<String, Value> = match groups {
                    Value::Object(groups) => groups,
                    _ => return Err(format!("{track_key} must map group names to entries")),
                };
                for (group, body) in groups {
                    let body: EntryBody = serde_json::from_value(body)
                        .map_err(|err| format!("{track_key}.{group}: {err}"))?;
                    entries.push(RecommendationEntry {
                        key: group,
                        track,
                        recommendations: body.recommendations,
                        sleep_tips: body.sleep_tips,
                    });
                }
            }
            Ok(entries)
        }
        _ => Err("expected a list or an object of recommendation entries".to_string()),
    }
}
