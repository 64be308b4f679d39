//! Sorting for dashboard listings. Keys are column names; a leading `-`
//! reverses the order.

use std::cmp::Ordering;
use std::sync::Arc;

use ptc_types::{Class, Participant};

fn split_key(key: &str) -> (&str, bool) {
    match key.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (key, false),
    }
}

fn directed(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Sort by `location`, `responsibility`, or `capacity` (ties by number),
/// else by number.
pub fn sort_classes(classes: &mut [Arc<Class>], key: &str) {
    let (key, reverse) = split_key(key);
    classes.sort_by(|a, b| {
        let primary = match key {
            "location" => a.location.cmp(&b.location),
            "responsibility" => a.responsibility.cmp(&b.responsibility),
            "capacity" => a.capacity.cmp(&b.capacity),
            _ => Ordering::Equal,
        };
        directed(primary.then(a.number.cmp(&b.number)), reverse)
    });
}

/// Sort by `type` (youth, adults, then staff by role) or by unit
/// (`unit`, `district`, `council`: council, district, unit number, unit
/// type), else by name. Ties are broken by name.
pub fn sort_participants(participants: &mut [Arc<Participant>], key: &str) {
    let (key, reverse) = split_key(key);
    participants.sort_by(|a, b| {
        let primary = match key {
            "type" => b
                .youth
                .cmp(&a.youth)
                .then(a.staff.cmp(&b.staff))
                .then_with(|| a.staff_role.cmp(&b.staff_role)),
            "unit" | "district" | "council" => a
                .council
                .cmp(&b.council)
                .then_with(|| a.district.cmp(&b.district))
                .then_with(|| a.unit_number.cmp(&b.unit_number))
                .then_with(|| a.unit_type.cmp(&b.unit_type)),
            _ => Ordering::Equal,
        };
        directed(primary.then_with(|| a.sort_key().cmp(&b.sort_key())), reverse)
    });
}
