//! Dashboard aggregation pipeline
//!
//! Loads every check-in and reduces it to chart-ready views: per-emotion
//! counts in the fixed scale order, the positive ratio, a bounded gallery of
//! the newest drawings, and the full table projection.

use moodcheck_common::{Emotion, EmotionRecord, Result};
use serde::{Deserialize, Serialize};

use crate::store::RecordStore;

/// Gallery shows at most this many drawings, newest first
pub const GALLERY_LIMIT: usize = 9;

/// One bar of the emotion chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSlice {
    pub label: String,
    pub icon: String,
    pub count: usize,
    pub color: String,
}

/// One gallery tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub drawing_url: String,
    pub caption: String,
}

/// One row of the full submissions table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub student_name: String,
    pub emotion: String,
    pub date: String,
    pub time: String,
}

/// Everything the teacher dashboard renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub total: usize,
    /// Percentage of very_good + good submissions, one decimal place.
    /// `None` when there are no submissions yet; never computed from zero.
    pub positive_ratio: Option<f64>,
    pub series: Vec<EmotionSlice>,
    pub gallery: Vec<GalleryEntry>,
    pub rows: Vec<TableRow>,
}

/// Load all records and aggregate them
pub async fn load_dashboard(records: &dyn RecordStore) -> Result<Dashboard> {
    let all = records.list_all().await?;
    Ok(build_dashboard(&all))
}

/// Aggregate records (assumed newest-first, the store's return order).
pub fn build_dashboard(records: &[EmotionRecord]) -> Dashboard {
    let total = records.len();
    if total == 0 {
        // Short-circuit: no ratio, no views, the UI says "no submissions yet"
        return Dashboard {
            total: 0,
            positive_ratio: None,
            series: Vec::new(),
            gallery: Vec::new(),
            rows: Vec::new(),
        };
    }

    let mut known_counts = [0usize; Emotion::ALL.len()];
    let mut unknown: Vec<(String, usize)> = Vec::new();

    for record in records {
        match record.known_emotion() {
            Some(emotion) => {
                if let Some(idx) = Emotion::ALL.iter().position(|e| *e == emotion) {
                    known_counts[idx] += 1;
                }
            }
            None => match unknown.iter_mut().find(|(label, _)| *label == record.emotion) {
                Some((_, count)) => *count += 1,
                None => unknown.push((record.emotion.clone(), 1)),
            },
        }
    }

    // Groups follow the fixed scale order, not the counts; unrecognized
    // labels trail behind with the default color.
    let mut series: Vec<EmotionSlice> = Emotion::ALL
        .iter()
        .zip(known_counts)
        .filter(|(_, count)| *count > 0)
        .map(|(emotion, count)| EmotionSlice {
            label: emotion.label().to_string(),
            icon: emotion.icon().to_string(),
            count,
            color: emotion.color().to_string(),
        })
        .collect();
    series.extend(unknown.into_iter().map(|(label, count)| EmotionSlice {
        label,
        icon: String::new(),
        count,
        color: Emotion::DEFAULT_COLOR.to_string(),
    }));

    let positive: usize = Emotion::ALL
        .iter()
        .zip(known_counts)
        .filter(|(emotion, _)| emotion.is_positive())
        .map(|(_, count)| count)
        .sum();
    let ratio = (positive as f64 / total as f64 * 1000.0).round() / 10.0;

    let gallery = records
        .iter()
        .take(GALLERY_LIMIT)
        .map(|record| GalleryEntry {
            drawing_url: record.drawing_url.clone(),
            caption: format!("{} · {} {}", record.student_name, record.date, record.time),
        })
        .collect();

    let rows = records
        .iter()
        .map(|record| TableRow {
            student_name: record.student_name.clone(),
            emotion: if record.emotion_icon.is_empty() {
                record.emotion.clone()
            } else {
                record.emotion_icon.clone()
            },
            date: record.date.clone(),
            time: record.time.clone(),
        })
        .collect();

    Dashboard {
        total,
        positive_ratio: Some(ratio),
        series,
        gallery,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(n: usize, label: &str) -> EmotionRecord {
        let created_at = Utc::now() - Duration::seconds(n as i64);
        EmotionRecord {
            id: format!("doc-{}", n),
            student_name: format!("학생{}", n),
            emotion: label.to_string(),
            emotion_icon: Emotion::from_label(label)
                .map(|e| e.display())
                .unwrap_or_default(),
            drawing_url: format!("https://example.com/d{}.jpg", n),
            drawing_path: format!("drawings/d{}.jpg", n),
            date: created_at.format("%Y-%m-%d").to_string(),
            time: created_at.format("%H:%M:%S").to_string(),
            created_at,
        }
    }

    fn records(labels: &[&str]) -> Vec<EmotionRecord> {
        labels
            .iter()
            .enumerate()
            .map(|(n, label)| record(n, label))
            .collect()
    }

    #[test]
    fn test_positive_ratio_three_very_good_four_good_of_ten() {
        let labels = [
            "매우 좋음", "매우 좋음", "매우 좋음", "좋음", "좋음", "좋음", "좋음", "보통",
            "안 좋음", "매우 안 좋음",
        ];
        let dashboard = build_dashboard(&records(&labels));

        assert_eq!(dashboard.total, 10);
        assert_eq!(dashboard.positive_ratio, Some(70.0));
    }

    #[test]
    fn test_empty_dashboard_short_circuits() {
        let dashboard = build_dashboard(&[]);

        assert_eq!(dashboard.total, 0);
        assert_eq!(dashboard.positive_ratio, None);
        assert!(dashboard.series.is_empty());
        assert!(dashboard.gallery.is_empty());
        assert!(dashboard.rows.is_empty());
    }

    #[test]
    fn test_series_follows_scale_order_not_counts() {
        // More "bad" than "good": order must still be the fixed scale order
        let labels = ["안 좋음", "안 좋음", "안 좋음", "좋음", "매우 좋음"];
        let dashboard = build_dashboard(&records(&labels));

        let order: Vec<&str> = dashboard.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(order, vec!["매우 좋음", "좋음", "안 좋음"]);
        assert_eq!(dashboard.series[0].color, Emotion::VeryGood.color());
    }

    #[test]
    fn test_unrecognized_label_gets_default_color() {
        let labels = ["보통", "신남"];
        let dashboard = build_dashboard(&records(&labels));

        let unknown = dashboard
            .series
            .iter()
            .find(|s| s.label == "신남")
            .unwrap();
        assert_eq!(unknown.color, Emotion::DEFAULT_COLOR);
        assert_eq!(unknown.count, 1);
        // Unknown labels trail the known scale
        assert_eq!(dashboard.series.last().unwrap().label, "신남");
    }

    #[test]
    fn test_gallery_capped_at_nine_newest_first() {
        let labels = vec!["보통"; 50];
        let all = records(&labels);
        let dashboard = build_dashboard(&all);

        assert_eq!(dashboard.gallery.len(), GALLERY_LIMIT);
        // Input order is newest-first; the gallery keeps the head
        assert_eq!(dashboard.gallery[0].drawing_url, all[0].drawing_url);
        assert_eq!(dashboard.gallery[8].drawing_url, all[8].drawing_url);

        // The table has no row limit
        assert_eq!(dashboard.rows.len(), 50);
    }

    #[test]
    fn test_ratio_rounds_to_one_decimal() {
        // 1 positive of 3 => 33.333...% => 33.3
        let labels = ["좋음", "보통", "보통"];
        let dashboard = build_dashboard(&records(&labels));
        assert_eq!(dashboard.positive_ratio, Some(33.3));
    }
}
