use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NUM_SESSION;

/// A wall-clock time on the conference day, in minutes after midnight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleTime(pub u16);

impl ScheduleTime {
    pub const fn hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    pub const fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Seconds after midnight.
    pub const fn seconds(self) -> u32 {
        self.0 as u32 * 60
    }
}

impl fmt::Display for ScheduleTime {
    /// Formats as "9:00 AM".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, suffix) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        write!(f, "{}:{:02} {}", hour, self.minute(), suffix)
    }
}

/// Start and end of each session, indexed by session.
pub const SESSION_TIMES: [(ScheduleTime, ScheduleTime); NUM_SESSION] = [
    (ScheduleTime::hm(9, 0), ScheduleTime::hm(10, 0)),
    (ScheduleTime::hm(10, 10), ScheduleTime::hm(11, 10)),
    (ScheduleTime::hm(11, 20), ScheduleTime::hm(13, 15)),
    (ScheduleTime::hm(13, 25), ScheduleTime::hm(14, 25)),
    (ScheduleTime::hm(14, 35), ScheduleTime::hm(15, 35)),
    (ScheduleTime::hm(15, 45), ScheduleTime::hm(16, 45)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_twelve_hour_clock() {
        assert_eq!(ScheduleTime::hm(9, 0).to_string(), "9:00 AM");
        assert_eq!(ScheduleTime::hm(12, 15).to_string(), "12:15 PM");
        assert_eq!(ScheduleTime::hm(13, 5).to_string(), "1:05 PM");
        assert_eq!(ScheduleTime::hm(0, 30).to_string(), "12:30 AM");
    }

    #[test]
    fn sessions_are_ordered() {
        for w in SESSION_TIMES.windows(2) {
            assert!(w[0].0 < w[0].1);
            assert!(w[0].1 < w[1].0);
        }
        assert_eq!(SESSION_TIMES[2].1.seconds(), (13 * 60 + 15) * 60);
    }
}
