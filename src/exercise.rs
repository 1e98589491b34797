//! Flattening of raw exercise data points into display records.
//!
//! A data point from the health store may bundle several sessions (a
//! multi-sport entry, for instance). Each session becomes one
//! [`ExerciseRecord`] whose id is the data point uid suffixed with the
//! session's position, which keeps ids unique across the whole result.

use log::debug;

use crate::types::{ExerciseRecord, HeartRateSample, RawDataPoint, RawExerciseLog, RawSession};

/// Build the id for session `index` of data point `uid`.
pub fn session_id(uid: &str, index: usize) -> String {
    format!("{}_{}", uid, index)
}

/// Flatten every session of every data point, preserving source order.
pub fn flatten_exercises(data_points: &[RawDataPoint]) -> Vec<ExerciseRecord> {
    let total_sessions: usize = data_points.iter().map(|p| p.sessions.len()).sum();
    let mut records = Vec::with_capacity(total_sessions);

    for point in data_points {
        for (index, session) in point.sessions.iter().enumerate() {
            records.push(to_record(session_id(&point.uid, index), session));
        }
    }

    debug!(
        "[Exercise] Flattened {} data points into {} sessions",
        data_points.len(),
        records.len()
    );
    records
}

fn to_record(unique_id: String, session: &RawSession) -> ExerciseRecord {
    ExerciseRecord {
        unique_id,
        exercise_type_code: session.exercise_type.code,
        exercise_type_name: session.exercise_type.name.clone(),
        start_time: session.start_time,
        end_time: session.end_time,
        duration_millis: session.duration,
        calorie_count: session.calories,
        distance_meters: session.distance.unwrap_or(0.0),
        mean_heart_rate: session.mean_heart_rate.unwrap_or(0.0),
        max_heart_rate: session.max_heart_rate.unwrap_or(0.0),
        mean_speed: session.mean_speed.unwrap_or(0.0),
        max_speed: session.max_speed.unwrap_or(0.0),
        heart_rate_samples: session.log.as_deref().and_then(heart_rate_samples),
    }
}

/// Keep the log entries that carry a heart rate, in log order.
///
/// Returns `None` when nothing qualifies: an empty log and a log without
/// heart rates collapse to the same "no samples" value as a missing log.
pub fn heart_rate_samples(log: &[RawExerciseLog]) -> Option<Vec<HeartRateSample>> {
    let samples: Vec<HeartRateSample> = log
        .iter()
        .filter_map(|entry| {
            entry.heart_rate.map(|hr| HeartRateSample {
                timestamp_millis: entry.timestamp,
                heart_rate_bpm: hr as i32,
            })
        })
        .collect();

    if samples.is_empty() {
        None
    } else {
        Some(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExerciseType;
    use std::collections::HashSet;

    fn session(name: &str, log: Option<Vec<RawExerciseLog>>) -> RawSession {
        RawSession {
            exercise_type: ExerciseType {
                code: 1002,
                name: name.to_string(),
            },
            start_time: 1_700_000_000_000,
            end_time: 1_700_001_800_000,
            duration: 1_800_000,
            calories: 250.5,
            distance: None,
            mean_heart_rate: None,
            max_heart_rate: None,
            mean_speed: None,
            max_speed: None,
            log,
        }
    }

    fn entry(timestamp: i64, heart_rate: Option<f32>) -> RawExerciseLog {
        RawExerciseLog {
            timestamp,
            heart_rate,
        }
    }

    fn point(uid: &str, sessions: Vec<RawSession>) -> RawDataPoint {
        RawDataPoint {
            uid: uid.to_string(),
            sessions,
        }
    }

    #[test]
    fn test_multi_session_point_gets_indexed_ids() {
        let points = vec![point(
            "abc",
            vec![session("RUNNING", None), session("CYCLING", None)],
        )];
        let records = flatten_exercises(&points);

        let ids: Vec<_> = records.iter().map(|r| r.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["abc_0", "abc_1"]);
        assert_eq!(records[1].exercise_type_name, "CYCLING");
    }

    #[test]
    fn test_record_count_and_unique_ids() {
        let points = vec![
            point("a", vec![session("RUNNING", None)]),
            point("b", vec![]),
            point(
                "c",
                vec![
                    session("SWIMMING", None),
                    session("CYCLING", None),
                    session("RUNNING", None),
                ],
            ),
        ];
        let records = flatten_exercises(&points);
        assert_eq!(records.len(), 4);

        let ids: HashSet<_> = records.iter().map(|r| r.unique_id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(records[0].unique_id, "a_0");
        assert_eq!(records[3].unique_id, "c_2");
    }

    #[test]
    fn test_heart_rate_entries_without_value_are_dropped() {
        let log = vec![
            entry(1, None),
            entry(2, Some(80.0)),
            entry(3, Some(72.0)),
        ];
        let records = flatten_exercises(&[point("hr", vec![session("RUNNING", Some(log))])]);

        assert_eq!(
            records[0].heart_rate_samples,
            Some(vec![
                HeartRateSample {
                    timestamp_millis: 2,
                    heart_rate_bpm: 80
                },
                HeartRateSample {
                    timestamp_millis: 3,
                    heart_rate_bpm: 72
                },
            ])
        );
    }

    #[test]
    fn test_missing_or_empty_log_has_no_samples() {
        let records = flatten_exercises(&[point(
            "x",
            vec![
                session("RUNNING", None),
                session("RUNNING", Some(vec![])),
                session("RUNNING", Some(vec![entry(1, None)])),
            ],
        )]);
        assert!(records.iter().all(|r| r.heart_rate_samples.is_none()));
    }

    #[test]
    fn test_fractional_heart_rate_truncates() {
        let samples = heart_rate_samples(&[entry(5, Some(71.9))]).unwrap();
        assert_eq!(samples[0].heart_rate_bpm, 71);
    }

    #[test]
    fn test_optional_metrics_default_to_zero() {
        let mut s = session("WALKING", None);
        s.distance = Some(1500.0);
        s.max_speed = Some(2.5);
        let records = flatten_exercises(&[point("m", vec![s])]);
        let r = &records[0];

        assert_eq!(r.distance_meters, 1500.0);
        assert_eq!(r.distance_km(), 1.5);
        assert_eq!(r.max_speed, 2.5);
        assert_eq!(r.mean_speed, 0.0);
        assert_eq!(r.mean_heart_rate, 0.0);
        assert_eq!(r.max_heart_rate, 0.0);
        assert_eq!(r.duration_minutes(), 30);
        assert_eq!(r.calorie_count, 250.5);
    }

    #[test]
    fn test_empty_input() {
        assert!(flatten_exercises(&[]).is_empty());
    }
}
