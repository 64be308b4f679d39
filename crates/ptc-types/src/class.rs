use serde::{Deserialize, Serialize};

use crate::NUM_SESSION;

/// A conference class. All data is loaded from the planning spreadsheet.
///
/// `start` and `end` are inclusive session indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Class {
    pub number: i32,
    pub start: i32,
    pub end: i32,
    pub responsibility: String,
    #[serde(rename = "new")]
    pub new_label: String,
    pub title: String,
    pub title_note: String,
    pub description: String,
    /// Bitmask over [`PROGRAM_DESCRIPTIONS`].
    pub programs: i32,
    pub capacity: i32,
    pub location: String,
    pub access_token: String,
    pub instructor_names: Vec<String>,
    pub instructor_emails: Vec<String>,
    /// One code per session of the class, in session order.
    pub evaluation_codes: Vec<String>,
}

impl Class {
    /// Length of the class in sessions.
    pub fn length(&self) -> i32 {
        self.end - self.start + 1
    }

    /// Title with any " - subtitle" or trailing parenthetical removed.
    pub fn short_title(&self) -> &str {
        if let Some(i) = self.title.find(" - ") {
            if i > 0 {
                return &self.title[..i];
            }
        }
        if self.title.ends_with(')') {
            if let Some(i) = self.title.find(" (") {
                if i > 0 {
                    return &self.title[..i];
                }
            }
        }
        &self.title
    }

    /// Programs this class is intended for.
    pub fn program_descriptions(&self, reverse: bool) -> Vec<&'static ProgramDescription> {
        program_descriptions_for_mask(self.programs, reverse)
    }

    /// Returns `true` if the class is meant for every program.
    pub fn is_for_all_programs(&self) -> bool {
        self.programs == ALL_PROGRAMS_MASK
    }
}

/// Returns `true` if `number` falls in the numbering range used for classes.
pub fn is_valid_class_number(number: i32) -> bool {
    (100..(NUM_SESSION as i32 + 1) * 100).contains(&number)
}

/// A program a class can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramDescription {
    pub code: &'static str,
    pub name: &'static str,
}

impl ProgramDescription {
    /// Name with the first letter of each word capitalized.
    pub fn title_name(&self) -> String {
        self.name
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// Number of individual programs. The entry at this index in
/// [`PROGRAM_DESCRIPTIONS`] stands for all of them.
pub const NUM_PROGRAMS: usize = 6;

const ALL_PROGRAMS_MASK: i32 = (1 << NUM_PROGRAMS) - 1;

/// Program descriptions in bit order, followed by the "everyone" entry.
pub const PROGRAM_DESCRIPTIONS: [ProgramDescription; NUM_PROGRAMS + 1] = [
    ProgramDescription { code: "cub", name: "Cub Pack adults" },
    ProgramDescription { code: "bsa", name: "Scout Troop adults" },
    ProgramDescription { code: "ven", name: "Venturing Crew adults" },
    ProgramDescription { code: "sea", name: "Sea Scout adults" },
    ProgramDescription { code: "com", name: "Commissioners" },
    ProgramDescription { code: "you", name: "youth" },
    ProgramDescription { code: "all", name: "everyone" },
];

fn program_descriptions_for_mask(mask: i32, reverse: bool) -> Vec<&'static ProgramDescription> {
    if mask == ALL_PROGRAMS_MASK {
        return vec![&PROGRAM_DESCRIPTIONS[NUM_PROGRAMS]];
    }
    let mut result: Vec<&'static ProgramDescription> = PROGRAM_DESCRIPTIONS[..NUM_PROGRAMS]
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, pd)| pd)
        .collect();
    if reverse {
        result.reverse();
    }
    result
}
