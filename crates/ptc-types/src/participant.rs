use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Staff role values used by registration.
pub const STAFF_ROLE_INSTRUCTOR: &str = "Instructor";
pub const STAFF_ROLE_MIDWAY: &str = "Midway";
pub const STAFF_ROLE_SUPPORT: &str = "Support";

/// A conference registration.
///
/// `id` is derived from the identity fields by [`participant_id`];
/// `login_code` is assigned by the store when participants are imported.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub id: String,
    pub registration_number: String,
    pub registered_by_name: String,
    pub registered_by_email: String,
    pub registered_by_phone: String,
    pub registration_time: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub suffix: String,
    pub name_extra: String,
    pub staff: bool,
    pub youth: bool,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Instructor, Support or Midway.
    pub staff_role: String,
    pub council: String,
    pub district: String,
    pub unit_type: String,
    pub unit_number: String,
    pub lunch_option: String,
    pub marketing: String,
    pub scouting_years: String,
    #[serde(rename = "showQRCode")]
    pub show_qr_code: bool,
    pub bsa_number: String,
    /// Registered class numbers.
    pub classes: Vec<i32>,
    pub staff_description: String,
    pub login_code: String,
}

/// Stable identifier for a participant.
///
/// The identifier is the hex MD5 of the lowercased identity fields, so the
/// same person re-registering with the same name and registration number
/// keeps the same ID across imports. No other field contributes.
pub fn participant_id(p: &Participant) -> String {
    let mut buf = String::new();
    buf.push_str(&p.last_name);
    buf.push('\0');
    buf.push_str(&p.first_name);
    buf.push('\0');
    buf.push_str(&p.suffix);
    buf.push('\0');
    if !p.nickname.is_empty() {
        buf.push_str(&p.nickname);
        buf.push('\0');
    }
    buf.push_str(&p.registration_number);
    if p.youth {
        buf.push_str("\0\u{1}\0");
    }
    buf.push_str(&p.name_extra);
    hex::encode(Md5::digest(lower_each_char(&buf).as_bytes()))
}

/// Lowercase one character at a time, without the context rules of
/// [`str::to_lowercase`] (a final `Σ` still becomes `σ`), so stored IDs do
/// not depend on a character's position in the name.
fn lower_each_char(s: &str) -> String {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

impl Participant {
    /// Short description of the registration type.
    pub fn type_label(&self) -> &'static str {
        if self.staff {
            "Staff"
        } else if self.youth {
            "Youth"
        } else {
            "Adult"
        }
    }

    pub fn unit(&self) -> String {
        if self.unit_number.is_empty() {
            self.unit_type.clone()
        } else {
            format!("{} {}", self.unit_type, self.unit_number)
        }
    }

    pub fn name(&self) -> String {
        if self.suffix.is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            format!("{} {} {}", self.first_name, self.last_name, self.suffix)
        }
    }

    pub fn nickname_or_first_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.first_name
        } else {
            &self.nickname
        }
    }

    /// Possessive form of [`Participant::nickname_or_first_name`].
    pub fn firsts(&self) -> String {
        let n = self.nickname_or_first_name();
        if n.is_empty() {
            String::new()
        } else if n.ends_with('s') {
            format!("{n}'")
        } else {
            format!("{n}'s")
        }
    }

    /// Addresses to notify. Youth registrations include the registering adult.
    pub fn emails(&self) -> Vec<&str> {
        if !self.youth || self.email == self.registered_by_email {
            vec![self.email.as_str()]
        } else {
            vec![self.registered_by_email.as_str(), self.email.as_str()]
        }
    }

    /// Default sort key: last name, first name, suffix, case-insensitive.
    pub fn sort_key(&self) -> String {
        format!("{}\n{}\n{}", self.last_name, self.first_name, self.suffix).to_lowercase()
    }
}
