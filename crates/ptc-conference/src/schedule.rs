use ptc_types::{Participant, ScheduleTime, SESSION_TIMES};
use serde::Serialize;

use crate::conference::Conference;
use crate::session::SessionClass;

const WELLNESS_CENTER: &str = "Wellness Center";
const BREAK_DESCRIPTION: &str = "Break – Visit the Midway or Scout Shop";

/// First lunch seating: lunch, then the lunch-session class.
const SEATING1_LUNCH: (ScheduleTime, ScheduleTime) = (ScheduleTime::hm(11, 10), ScheduleTime::hm(12, 15));
const SEATING1_CLASS: (ScheduleTime, ScheduleTime) = (ScheduleTime::hm(12, 15), ScheduleTime::hm(13, 15));
/// Second lunch seating: the lunch-session class, then lunch.
const SEATING2_CLASS: (ScheduleTime, ScheduleTime) = (ScheduleTime::hm(11, 20), ScheduleTime::hm(12, 20));
const SEATING2_LUNCH: (ScheduleTime, ScheduleTime) = (ScheduleTime::hm(12, 20), ScheduleTime::hm(13, 25));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Event,
    Break,
    Session,
    Lunch,
}

/// One row of a participant's printed schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub start: ScheduleTime,
    pub end: ScheduleTime,
    pub description: String,
    pub location: String,
    pub kind: ScheduleKind,
    pub instructor: bool,
    pub class_number: i32,
}

impl ScheduleItem {
    fn event(start: ScheduleTime, end: ScheduleTime, description: &str, location: &str) -> Self {
        Self {
            start,
            end,
            description: description.into(),
            location: location.into(),
            kind: ScheduleKind::Event,
            instructor: false,
            class_number: 0,
        }
    }

    fn break_between(start: ScheduleTime, end: ScheduleTime) -> Self {
        Self {
            kind: ScheduleKind::Break,
            ..Self::event(start, end, BREAK_DESCRIPTION, "")
        }
    }

    fn class((start, end): (ScheduleTime, ScheduleTime), sc: &SessionClass) -> Self {
        let description = if sc.class.number != 0 {
            format!("{}: {}{}", sc.class.number, sc.class.short_title(), sc.i_of_n())
        } else {
            sc.class.title.clone()
        };
        Self {
            start,
            end,
            description,
            location: sc.class.location.clone(),
            kind: ScheduleKind::Session,
            instructor: sc.instructor,
            class_number: sc.class.number,
        }
    }
}

impl Conference {
    /// The participant's day from check-in to the last session.
    ///
    /// The lunch seating decides whether lunch comes before or after the
    /// lunch-session class.
    pub fn participant_schedule(&self, p: &Participant) -> Vec<ScheduleItem> {
        let (scs, lunch) = self.participant_session_classes_and_lunch(p);

        let lunch_description = if p.lunch_option.is_empty() {
            "Lunch".to_string()
        } else {
            format!("Lunch: {}", p.lunch_option)
        };
        let lunch_item = |(start, end): (ScheduleTime, ScheduleTime)| ScheduleItem {
            kind: ScheduleKind::Lunch,
            ..ScheduleItem::event(start, end, &lunch_description, &lunch.location)
        };

        let mut schedule = vec![
            ScheduleItem::event(ScheduleTime::hm(7, 40), ScheduleTime::hm(8, 15), "Check-in and Registration", WELLNESS_CENTER),
            ScheduleItem::event(ScheduleTime::hm(8, 15), ScheduleTime::hm(8, 45), "Opening Ceremony", WELLNESS_CENTER),
            ScheduleItem::class(SESSION_TIMES[0], &scs[0]),
            ScheduleItem::break_between(ScheduleTime::hm(10, 0), ScheduleTime::hm(10, 10)),
            ScheduleItem::class(SESSION_TIMES[1], &scs[1]),
        ];

        if lunch.seating == 1 {
            schedule.push(lunch_item(SEATING1_LUNCH));
            schedule.push(ScheduleItem::class(SEATING1_CLASS, &scs[2]));
            schedule.push(ScheduleItem::break_between(ScheduleTime::hm(13, 15), ScheduleTime::hm(13, 25)));
        } else {
            schedule.push(ScheduleItem::break_between(ScheduleTime::hm(11, 10), ScheduleTime::hm(11, 20)));
            schedule.push(ScheduleItem::class(SEATING2_CLASS, &scs[2]));
            schedule.push(lunch_item(SEATING2_LUNCH));
        }

        schedule.extend([
            ScheduleItem::class(SESSION_TIMES[3], &scs[3]),
            ScheduleItem::break_between(ScheduleTime::hm(14, 25), ScheduleTime::hm(14, 35)),
            ScheduleItem::class(SESSION_TIMES[4], &scs[4]),
            ScheduleItem::break_between(ScheduleTime::hm(15, 35), ScheduleTime::hm(15, 45)),
            ScheduleItem::class(SESSION_TIMES[5], &scs[5]),
        ]);
        schedule
    }
}
