//! Foundation types for the PTC conference.
//!
//! This crate holds the plain domain records that every other PTC crate
//! shares. It has no I/O: values here are serialized by the store, indexed
//! by the conference aggregate, and rendered by the server.
//!
//! # Key Types
//!
//! - [`Class`]: one catalog class spanning one or more sessions
//! - [`Participant`]: one registration, identified by [`participant_id`]
//! - [`Configuration`]: conference-wide settings, including [`Lunch`] locations
//! - [`Evaluation`]: a participant's conference, session, and staff-note feedback
//! - [`ScheduleTime`]: the fixed time slots of the conference day

pub mod class;
pub mod configuration;
pub mod error;
pub mod evaluation;
pub mod participant;
pub mod schedule;

pub use class::{is_valid_class_number, Class, ProgramDescription, PROGRAM_DESCRIPTIONS};
pub use configuration::{Configuration, LoginClient, Lunch, SuggestedSchedule};
pub use error::TypeError;
pub use evaluation::{
    parse_rating, ConferenceEvaluation, Evaluation, EvaluationChanges, EvaluationNote,
    EvaluationSubmission, SectionHashes, SessionEvaluation,
};
pub use participant::{participant_id, Participant};
pub use schedule::{ScheduleTime, SESSION_TIMES};

/// Number of class sessions in the conference day.
pub const NUM_SESSION: usize = 6;

/// Index of the session that overlaps lunch.
pub const LUNCH_SESSION: usize = 2;

/// Pseudo class number a registrant selects to take no classes.
pub const NO_CLASS_CLASS_NUMBER: i32 = 999;

/// Maximum value of an evaluation rating. Zero means "not provided".
pub const MAX_EVAL_RATING: i32 = 4;

/// Time zone of the conference. The conference date and every user-visible
/// timestamp are interpreted here.
pub const TIME_ZONE: chrono_tz::Tz = chrono_tz::America::Los_Angeles;
