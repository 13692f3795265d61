use tracing::debug;

use crate::types::{SetRecord, WorkoutSession};

/// Reconstructs workout sessions from the flat per-set records.
///
/// A session is a consecutive run of records sharing the same
/// (calendar date, routine name) pair. The export's own row ordering defines
/// the boundaries: a new session begins whenever the pair changes from the
/// immediately preceding record. No global re-sort happens, so the source
/// app's own segmentation is reproduced even when the file is not globally
/// time-ordered.
///
/// Session start/end are the min/max member timestamps. If a member was
/// logged out of chronological order the min/max rule still applies; the
/// resulting duration is observable behavior, not an error.
pub fn group_sessions(records: &[SetRecord]) -> Vec<WorkoutSession> {
    let mut sessions: Vec<WorkoutSession> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let continues = sessions.last().map_or(false, |session| {
            let prev = &records[session.rows.end - 1];
            prev.date == record.date && prev.routine == record.routine
        });

        if continues {
            let session = sessions.last_mut().expect("session run in progress");
            session.start_utc = session.start_utc.min(record.timestamp_utc);
            session.end_utc = session.end_utc.max(record.timestamp_utc);
            session.rows.end = index + 1;
        } else {
            sessions.push(WorkoutSession {
                number: sessions.len() as u32 + 1,
                start_utc: record.timestamp_utc,
                end_utc: record.timestamp_utc,
                rows: index..index + 1,
            });
        }
    }

    debug!(
        sessions = sessions.len(),
        records = records.len(),
        "grouped records into sessions"
    );

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(date: (i32, u32, u32), time: (u32, u32), routine: &str, set: u32) -> SetRecord {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date");
        SetRecord {
            date,
            timestamp_utc: Utc
                .from_utc_datetime(&date.and_hms_opt(time.0, time.1, 0).expect("valid time")),
            routine: routine.to_string(),
            exercise: "Bench Press".to_string(),
            set_order: set,
            weight_kg: Some(60.0),
            reps: Some(8),
            duration_min: None,
            distance_km: None,
            note: None,
        }
    }

    #[test]
    fn consecutive_same_day_same_routine_is_one_session() {
        let records = vec![
            record((2024, 1, 1), (10, 0), "Push Day", 1),
            record((2024, 1, 1), (10, 5), "Push Day", 2),
        ];
        let sessions = group_sessions(&records);

        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.number, 1);
        assert_eq!(session.rows, 0..2);
        assert_eq!(session.duration().num_minutes(), 5);
        assert_eq!(session.start_utc, records[0].timestamp_utc);
        assert_eq!(session.end_utc, records[1].timestamp_utc);
    }

    #[test]
    fn routine_change_starts_a_new_session_on_the_same_day() {
        let records = vec![
            record((2024, 1, 1), (10, 0), "Push Day", 1),
            record((2024, 1, 1), (18, 0), "Pull Day", 1),
        ];
        let sessions = group_sessions(&records);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].number, 1);
        assert_eq!(sessions[1].number, 2);
        assert_eq!(sessions[1].rows, 1..2);
    }

    #[test]
    fn same_routine_on_a_new_date_is_a_new_session() {
        let records = vec![
            record((2024, 1, 1), (10, 0), "Push Day", 1),
            record((2024, 1, 3), (10, 0), "Push Day", 1),
        ];
        let sessions = group_sessions(&records);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn numbering_follows_first_appearance_even_without_global_time_order() {
        // Second session appears later in the file but earlier in time.
        let records = vec![
            record((2024, 1, 5), (10, 0), "Push Day", 1),
            record((2024, 1, 2), (10, 0), "Pull Day", 1),
        ];
        let sessions = group_sessions(&records);
        assert_eq!(sessions[0].number, 1);
        assert_eq!(sessions[0].rows, 0..1);
        assert_eq!(sessions[1].number, 2);
    }

    #[test]
    fn interleaved_routine_runs_split_into_three_sessions() {
        let records = vec![
            record((2024, 1, 1), (10, 0), "Push Day", 1),
            record((2024, 1, 1), (11, 0), "Pull Day", 1),
            record((2024, 1, 1), (12, 0), "Push Day", 1),
        ];
        let sessions = group_sessions(&records);
        assert_eq!(sessions.len(), 3);
        assert_eq!(
            sessions.iter().map(|s| s.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn singleton_session_has_zero_duration() {
        let sessions = group_sessions(&[record((2024, 1, 1), (10, 0), "Push Day", 1)]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration().num_seconds(), 0);
        assert_eq!(sessions[0].number, 1);
    }

    #[test]
    fn out_of_order_member_timestamps_keep_min_max_bounds() {
        let records = vec![
            record((2024, 1, 1), (10, 30), "Push Day", 1),
            record((2024, 1, 1), (10, 0), "Push Day", 2),
            record((2024, 1, 1), (10, 15), "Push Day", 3),
        ];
        let sessions = group_sessions(&records);

        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.start_utc, records[1].timestamp_utc);
        assert_eq!(session.end_utc, records[0].timestamp_utc);
        assert_eq!(session.duration().num_minutes(), 30);
        for record in &records[session.rows.clone()] {
            assert!(session.start_utc <= record.timestamp_utc);
            assert!(record.timestamp_utc <= session.end_utc);
        }
    }

    #[test]
    fn empty_input_yields_no_sessions() {
        assert!(group_sessions(&[]).is_empty());
    }
}
