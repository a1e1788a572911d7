//! Midnight-crossing timetable normalizer.
//!
//! A proposed interval whose start is later than its end crosses a day
//! boundary and is stored as two linked rows: the parent truncated to
//! `23:59:59` on the original day, and a child from `00:00:00` to the true
//! end on the successor day. The child exists only to preserve the true end
//! time; read paths copy it back onto the parent so callers always see one
//! logical entry. Split depth is 1 by construction: there is no variant
//! that attaches a child to a child.

use chrono::NaiveTime;
use uuid::Uuid;

use super::day::DayOfWeek;
use super::slot::TimeSlot;

/// One persistable timetable row produced by normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimetableRow {
    pub id: Uuid,
    pub day: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub parent_id: Option<Uuid>,
}

/// A proposed interval after normalization: either a single within-day row,
/// or a parent/child pair for a midnight-crossing interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedTimetable {
    Simple(TimetableRow),
    Split {
        parent: TimetableRow,
        child: TimetableRow,
    },
}

fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time")
}

fn day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).expect("00:00:00 is a valid time")
}

impl NormalizedTimetable {
    /// Normalize a proposed weekly interval, minting row ids up front so
    /// the parent/child link exists before anything is persisted.
    pub fn from_proposal(day: DayOfWeek, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        if start_time <= end_time {
            return NormalizedTimetable::Simple(TimetableRow {
                id: Uuid::new_v4(),
                day,
                start_time,
                end_time,
                parent_id: None,
            });
        }

        let parent_id = Uuid::new_v4();
        NormalizedTimetable::Split {
            parent: TimetableRow {
                id: parent_id,
                day,
                start_time,
                end_time: day_end(),
                parent_id: None,
            },
            child: TimetableRow {
                id: Uuid::new_v4(),
                day: day.succ(),
                start_time: day_start(),
                end_time,
                parent_id: Some(parent_id),
            },
        }
    }

    /// Id of the parent row, which is also the id of the logical entry.
    pub fn entry_id(&self) -> Uuid {
        match self {
            NormalizedTimetable::Simple(row) => row.id,
            NormalizedTimetable::Split { parent, .. } => parent.id,
        }
    }

    /// Day of the logical entry (the day the interval starts on).
    pub fn day(&self) -> DayOfWeek {
        match self {
            NormalizedTimetable::Simple(row) => row.day,
            NormalizedTimetable::Split { parent, .. } => parent.day,
        }
    }

    /// Start time of the logical entry.
    pub fn logical_start(&self) -> NaiveTime {
        match self {
            NormalizedTimetable::Simple(row) => row.start_time,
            NormalizedTimetable::Split { parent, .. } => parent.start_time,
        }
    }

    /// True end time of the logical entry (the child's end for a split).
    pub fn logical_end(&self) -> NaiveTime {
        match self {
            NormalizedTimetable::Simple(row) => row.end_time,
            NormalizedTimetable::Split { child, .. } => child.end_time,
        }
    }

    /// Within-day slots for overlap checking, one per row.
    pub fn slots(&self) -> Vec<TimeSlot> {
        self.rows()
            .iter()
            .map(|row| TimeSlot {
                day: row.day,
                start: row.start_time,
                end: row.end_time,
            })
            .collect()
    }

    /// The persistable rows, parent first.
    pub fn rows(&self) -> Vec<TimetableRow> {
        match self {
            NormalizedTimetable::Simple(row) => vec![*row],
            NormalizedTimetable::Split { parent, child } => vec![*parent, *child],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::slot::parse_time;

    fn t(value: &str) -> NaiveTime {
        parse_time(value).unwrap()
    }

    #[test]
    fn within_day_interval_stays_single() {
        let normalized =
            NormalizedTimetable::from_proposal(DayOfWeek::Monday, t("09:00:00"), t("10:00:00"));
        let rows = normalized.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].day, DayOfWeek::Monday);
        assert_eq!(rows[0].start_time, t("09:00:00"));
        assert_eq!(rows[0].end_time, t("10:00:00"));
        assert_eq!(rows[0].parent_id, None);
    }

    #[test]
    fn midnight_crossing_interval_splits_in_two() {
        let normalized =
            NormalizedTimetable::from_proposal(DayOfWeek::Friday, t("22:00:00"), t("01:30:00"));
        let NormalizedTimetable::Split { parent, child } = &normalized else {
            panic!("expected a split");
        };

        assert_eq!(parent.day, DayOfWeek::Friday);
        assert_eq!(parent.start_time, t("22:00:00"));
        assert_eq!(parent.end_time, t("23:59:59"));
        assert_eq!(parent.parent_id, None);

        assert_eq!(child.day, DayOfWeek::Saturday);
        assert_eq!(child.start_time, t("00:00:00"));
        assert_eq!(child.end_time, t("01:30:00"));
        assert_eq!(child.parent_id, Some(parent.id));
        assert_ne!(child.id, parent.id);
    }

    #[test]
    fn split_reassembles_to_original_interval() {
        let normalized =
            NormalizedTimetable::from_proposal(DayOfWeek::Sunday, t("23:00:00"), t("02:00:00"));
        assert_eq!(normalized.day(), DayOfWeek::Sunday);
        assert_eq!(normalized.logical_start(), t("23:00:00"));
        assert_eq!(normalized.logical_end(), t("02:00:00"));
    }

    #[test]
    fn sunday_split_wraps_to_monday() {
        let normalized =
            NormalizedTimetable::from_proposal(DayOfWeek::Sunday, t("23:30:00"), t("00:30:00"));
        let NormalizedTimetable::Split { child, .. } = &normalized else {
            panic!("expected a split");
        };
        assert_eq!(child.day, DayOfWeek::Monday);
    }

    #[test]
    fn equal_start_and_end_is_not_a_split() {
        let normalized =
            NormalizedTimetable::from_proposal(DayOfWeek::Monday, t("09:00:00"), t("09:00:00"));
        assert!(matches!(normalized, NormalizedTimetable::Simple(_)));
    }

    #[test]
    fn split_slots_are_each_within_one_day() {
        let normalized =
            NormalizedTimetable::from_proposal(DayOfWeek::Wednesday, t("21:00:00"), t("03:00:00"));
        for slot in normalized.slots() {
            assert!(slot.start <= slot.end);
        }
        assert_eq!(normalized.slots().len(), 2);
    }
}
