//! ReportEngine: FIFO session pairing and daily aggregation (spec §4.5).

use crate::model::{Action, Employee, TimeEntry, TimeEntryId};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// `chrono::Duration` has no stable serde impl of its own; these
/// helpers round-trip it as whole milliseconds.
mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.num_milliseconds().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = i64::deserialize(d)?;
        Ok(Duration::milliseconds(millis))
    }
}

mod option_duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        d.map(|d| d.num_milliseconds()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let millis: Option<i64> = Option::deserialize(d)?;
        Ok(millis.map(Duration::milliseconds))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub clock_in_ts: DateTime<Local>,
    pub clock_out_ts: Option<DateTime<Local>>,
    #[serde(with = "option_duration_millis")]
    pub duration: Option<ChronoDuration>,
    pub clock_in_id: TimeEntryId,
    pub clock_out_id: Option<TimeEntryId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
    #[serde(with = "duration_millis")]
    pub daily_total: ChronoDuration,
    pub has_open_session: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Totals {
    #[serde(with = "duration_millis")]
    pub total_duration: ChronoDuration,
    pub day_count_with_work: usize,
    #[serde(with = "duration_millis")]
    pub average_per_day: ChronoDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub employee: Employee,
    pub period: (NaiveDate, NaiveDate),
    pub days: Vec<DayReport>,
    pub totals: Totals,
    pub warnings: Vec<String>,
}

pub struct ReportEngine;

impl ReportEngine {
    /// Builds a report for `employee` over `[start, end]` (inclusive
    /// local calendar dates) from that employee's active entries,
    /// already fetched by the caller. Deterministic FIFO pairing across
    /// the whole range, so cross-midnight sessions are attributed to
    /// the day of their clock-in (spec §4.5 rule 5).
    pub fn build(
        employee: Employee,
        mut entries: Vec<TimeEntry>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Report {
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

        let mut pending_ins: VecDeque<TimeEntry> = VecDeque::new();
        let mut sessions: Vec<Session> = Vec::new();
        let mut warnings = Vec::new();

        for entry in entries {
            match entry.action {
                Action::In => pending_ins.push_back(entry),
                Action::Out => match pending_ins.pop_front() {
                    Some(in_entry) => {
                        let duration = entry.timestamp - in_entry.timestamp;
                        sessions.push(Session {
                            clock_in_ts: in_entry.timestamp,
                            clock_out_ts: Some(entry.timestamp),
                            duration: Some(duration),
                            clock_in_id: in_entry.id,
                            clock_out_id: Some(entry.id),
                        });
                    }
                    None => {
                        let msg = format!(
                            "out without prior in: entry {} at {}",
                            entry.id, entry.timestamp
                        );
                        log::warn!("{msg}");
                        warnings.push(msg);
                    }
                },
            }
        }

        for in_entry in pending_ins {
            sessions.push(Session {
                clock_in_ts: in_entry.timestamp,
                clock_out_ts: None,
                duration: None,
                clock_in_id: in_entry.id,
                clock_out_id: None,
            });
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();
        for session in sessions {
            by_day
                .entry(session.clock_in_ts.date_naive())
                .or_default()
                .push(session);
        }

        let mut days = Vec::new();
        let mut total_duration = ChronoDuration::zero();
        let mut day_count_with_work = 0usize;

        let mut date = start;
        while date <= end {
            let mut day_sessions = by_day.remove(&date).unwrap_or_default();
            day_sessions.sort_by_key(|s| s.clock_in_ts);

            let has_open_session = day_sessions.iter().any(|s| s.clock_out_ts.is_none());
            let daily_total = day_sessions
                .iter()
                .filter_map(|s| s.duration)
                .fold(ChronoDuration::zero(), |acc, d| acc + d);

            if daily_total > ChronoDuration::zero() {
                day_count_with_work += 1;
                total_duration = total_duration + daily_total;
            }

            days.push(DayReport {
                date,
                sessions: day_sessions,
                daily_total,
                has_open_session,
            });

            date = date
                .succ_opt()
                .expect("date arithmetic within a bounded report range does not overflow");
        }

        let average_per_day = if day_count_with_work > 0 {
            total_duration / day_count_with_work as i32
        } else {
            ChronoDuration::zero()
        };

        Report {
            employee,
            period: (start, end),
            days,
            totals: Totals {
                total_duration,
                day_count_with_work,
                average_per_day,
            },
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmployeeId;
    use chrono::TimeZone;

    fn employee(id: EmployeeId) -> Employee {
        Employee {
            id,
            name: "Alice".into(),
            rfid_tag: "AAAA1111".into(),
            is_admin: false,
            created_at: chrono::Utc::now(),
            active: true,
        }
    }

    fn entry(id: TimeEntryId, employee_id: EmployeeId, y: i32, m: u32, d: u32, h: u32, mi: u32, action: Action) -> TimeEntry {
        TimeEntry {
            id,
            employee_id,
            timestamp: Local.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap(),
            action,
            active: true,
        }
    }

    #[test]
    fn s1_simple_in_out_in_out() {
        let e = employee(1);
        let entries = vec![
            entry(1, 1, 2024, 1, 15, 10, 0, Action::In),
            entry(2, 1, 2024, 1, 15, 12, 0, Action::Out),
            entry(3, 1, 2024, 1, 15, 13, 0, Action::In),
            entry(4, 1, 2024, 1, 15, 17, 0, Action::Out),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = ReportEngine::build(e, entries, start, start);

        assert_eq!(report.days.len(), 1);
        assert_eq!(report.days[0].sessions.len(), 2);
        assert_eq!(report.days[0].daily_total, ChronoDuration::hours(8));
        assert_eq!(report.totals.total_duration, ChronoDuration::hours(8));
        assert_eq!(report.totals.day_count_with_work, 1);
    }

    #[test]
    fn s3_midnight_crossing_counts_on_start_day() {
        let e = employee(1);
        let entries = vec![
            entry(1, 1, 2024, 1, 15, 23, 30, Action::In),
            entry(2, 1, 2024, 1, 16, 7, 30, Action::Out),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let report = ReportEngine::build(e, entries, start, end);

        assert_eq!(report.days.len(), 2);
        assert_eq!(report.days[0].sessions.len(), 1);
        assert_eq!(report.days[0].daily_total, ChronoDuration::hours(8));
        assert!(report.days[1].sessions.is_empty());
        assert_eq!(report.totals.total_duration, ChronoDuration::hours(8));
        assert_eq!(report.totals.average_per_day, ChronoDuration::hours(8));
    }

    #[test]
    fn s4_duplicate_scans_produce_extra_session() {
        let e = employee(1);
        let entries = vec![
            entry(1, 1, 2024, 1, 15, 8, 0, Action::In),
            entry(2, 1, 2024, 1, 15, 8, 1, Action::In),
            entry(3, 1, 2024, 1, 15, 12, 0, Action::Out),
            entry(4, 1, 2024, 1, 15, 12, 1, Action::Out),
            entry(5, 1, 2024, 1, 15, 13, 0, Action::In),
            entry(6, 1, 2024, 1, 15, 17, 0, Action::Out),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = ReportEngine::build(e, entries, start, start);

        assert_eq!(report.days[0].sessions.len(), 3);
        assert_eq!(
            report.days[0].sessions[0].duration,
            Some(ChronoDuration::hours(4))
        );
        assert_eq!(
            report.days[0].sessions[1].duration,
            Some(ChronoDuration::hours(4))
        );
        assert_eq!(
            report.days[0].sessions[2].duration,
            Some(ChronoDuration::hours(4))
        );
    }

    #[test]
    fn s5_open_session_has_no_duration() {
        let e = employee(1);
        let entries = vec![entry(1, 1, 2024, 1, 15, 9, 0, Action::In)];
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = ReportEngine::build(e, entries, start, start);

        assert_eq!(report.days[0].sessions.len(), 1);
        assert!(report.days[0].sessions[0].clock_out_ts.is_none());
        assert!(report.days[0].sessions[0].duration.is_none());
        assert!(report.days[0].has_open_session);
        assert_eq!(report.days[0].daily_total, ChronoDuration::zero());
    }

    #[test]
    fn out_without_prior_in_is_skipped_with_warning() {
        let e = employee(1);
        let entries = vec![entry(1, 1, 2024, 1, 15, 9, 0, Action::Out)];
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = ReportEngine::build(e, entries, start, start);

        assert!(report.days[0].sessions.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn deterministic_across_runs() {
        let e = employee(1);
        let entries = vec![
            entry(1, 1, 2024, 1, 15, 10, 0, Action::In),
            entry(2, 1, 2024, 1, 15, 12, 0, Action::Out),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let r1 = ReportEngine::build(e.clone(), entries.clone(), start, start);
        let r2 = ReportEngine::build(e, entries, start, start);
        assert_eq!(
            serde_json::to_string(&r1).unwrap(),
            serde_json::to_string(&r2).unwrap()
        );
    }
}
