//! The conference aggregate.
//!
//! A [`Conference`] is an immutable snapshot of classes, participants,
//! instructor assignments, and configuration. Updates are functional: each
//! returns a new value sharing the untouched slices, so a published
//! snapshot can be read from any number of tasks without locking. Derived
//! indices are built once per value on first use.
//!
//! On top of the aggregate this crate answers the per-participant
//! questions the server renders: which class they attend or teach in each
//! session ([`SessionClass`]), where they eat lunch, their printed day
//! schedule ([`ScheduleItem`]), and whether their printed form is stale
//! (print signatures).

pub mod conference;
pub mod schedule;
pub mod session;
pub mod sort;

pub use conference::{Conference, InstructorClasses, PrintSignatures};
pub use schedule::{ScheduleItem, ScheduleKind};
pub use session::SessionClass;
pub use sort::{sort_classes, sort_participants};
