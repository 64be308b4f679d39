//! Participant evaluations.
//!
//! An [`Evaluation`] has three independently edited sections: the overall
//! conference evaluation, a staff-only note, and one entry per session. The
//! store merges submissions section by section, so concurrent editors only
//! overwrite the sections they changed. Editing forms carry a
//! [`SectionHashes`] fingerprint of what was displayed; on submit only the
//! sections whose content hash differs are sent to the store.

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::{MAX_EVAL_RATING, NUM_SESSION};

/// Feedback for one session of one class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEvaluation {
    pub session: i32,
    #[serde(rename = "class")]
    pub class_number: i32,
    #[serde(rename = "knowledge")]
    pub knowledge_rating: i32,
    #[serde(rename = "presentation")]
    pub presentation_rating: i32,
    #[serde(rename = "usefulness")]
    pub usefulness_rating: i32,
    #[serde(rename = "overall")]
    pub overall_rating: i32,
    pub comments: String,
    /// Who last wrote this section ("participant", "staff", ...).
    pub source: String,
    pub updated: Option<DateTime<Utc>>,
}

/// Feedback on the conference as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceEvaluation {
    #[serde(rename = "experience")]
    pub experience_rating: i32,
    #[serde(rename = "promotion")]
    pub promotion_rating: i32,
    #[serde(rename = "registration")]
    pub registration_rating: i32,
    #[serde(rename = "checkin")]
    pub checkin_rating: i32,
    #[serde(rename = "midway")]
    pub midway_rating: i32,
    #[serde(rename = "lunch")]
    pub lunch_rating: i32,
    #[serde(rename = "facilities")]
    pub facilities_rating: i32,
    #[serde(rename = "website")]
    pub website_rating: i32,
    #[serde(rename = "signageWayfinding")]
    pub signage_wayfinding_rating: i32,
    pub learn_topics: String,
    pub teach_topics: String,
    pub comments: String,
    pub source: String,
    pub updated: Option<DateTime<Utc>>,
}

/// Staff-only annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationNote {
    #[serde(rename = "note")]
    pub text: String,
    pub no_show: bool,
}

/// Everything a participant (or staff on their behalf) has submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evaluation {
    /// Filled from the storage key on read; not part of the payload.
    #[serde(skip)]
    pub participant_id: String,
    pub conference: Option<ConferenceEvaluation>,
    pub sessions: Vec<SessionEvaluation>,
    pub note: Option<EvaluationNote>,
}

impl Evaluation {
    /// Insert, replace, or remove the entry for `se.session`.
    ///
    /// An entry with class number zero removes any existing entry for the
    /// session and is never stored itself; session indices stay unique.
    pub fn set_session(&mut self, se: SessionEvaluation) {
        match self.sessions.iter().position(|s| s.session == se.session) {
            Some(i) if se.class_number != 0 => self.sessions[i] = se,
            Some(i) => {
                self.sessions.remove(i);
            }
            None if se.class_number != 0 => self.sessions.push(se),
            None => {}
        }
    }

    /// Merge a partial update. Present sections replace stored sections;
    /// session entries are applied with [`Evaluation::set_session`].
    pub fn merge(&mut self, modified: &Evaluation) {
        if let Some(conference) = &modified.conference {
            self.conference = Some(conference.clone());
        }
        if let Some(note) = &modified.note {
            self.note = Some(note.clone());
        }
        for se in &modified.sessions {
            self.set_session(se.clone());
        }
    }

    /// The entry for `session`, if any.
    pub fn session(&self, session: i32) -> Option<&SessionEvaluation> {
        self.sessions.iter().find(|s| s.session == session)
    }

    /// Returns `true` if nothing would be written for this update.
    pub fn is_empty(&self) -> bool {
        self.conference.is_none() && self.note.is_none() && self.sessions.is_empty()
    }
}

fn md5_hex(buf: &[u8]) -> String {
    hex::encode(Md5::digest(buf))
}

impl SessionEvaluation {
    /// Content hash over the session, class number, ratings, and comments.
    /// Source and update time do not contribute.
    pub fn hash(&self) -> String {
        let mut buf = vec![
            self.session as u8,
            self.class_number as u8,
            (self.class_number >> 8) as u8,
            self.knowledge_rating as u8,
            self.presentation_rating as u8,
            self.usefulness_rating as u8,
            self.overall_rating as u8,
        ];
        buf.extend_from_slice(self.comments.as_bytes());
        md5_hex(&buf)
    }

    pub fn ratings(&self) -> [(&'static str, i32); 4] {
        [
            ("knowledge", self.knowledge_rating),
            ("presentation", self.presentation_rating),
            ("usefulness", self.usefulness_rating),
            ("overall", self.overall_rating),
        ]
    }

    pub fn ratings_mut(&mut self) -> [(&'static str, &mut i32); 4] {
        [
            ("knowledge", &mut self.knowledge_rating),
            ("presentation", &mut self.presentation_rating),
            ("usefulness", &mut self.usefulness_rating),
            ("overall", &mut self.overall_rating),
        ]
    }
}

impl ConferenceEvaluation {
    /// Content hash over the ratings and the three text fields.
    pub fn hash(&self) -> String {
        let mut buf: Vec<u8> = self.ratings().iter().map(|(_, r)| *r as u8).collect();
        buf.extend_from_slice(self.learn_topics.as_bytes());
        buf.push(0);
        buf.extend_from_slice(self.teach_topics.as_bytes());
        buf.push(0);
        buf.extend_from_slice(self.comments.as_bytes());
        md5_hex(&buf)
    }

    pub fn ratings(&self) -> [(&'static str, i32); 9] {
        [
            ("experience", self.experience_rating),
            ("promotion", self.promotion_rating),
            ("registration", self.registration_rating),
            ("checkin", self.checkin_rating),
            ("midway", self.midway_rating),
            ("lunch", self.lunch_rating),
            ("facilities", self.facilities_rating),
            ("website", self.website_rating),
            ("signageWayfinding", self.signage_wayfinding_rating),
        ]
    }

    pub fn ratings_mut(&mut self) -> [(&'static str, &mut i32); 9] {
        [
            ("experience", &mut self.experience_rating),
            ("promotion", &mut self.promotion_rating),
            ("registration", &mut self.registration_rating),
            ("checkin", &mut self.checkin_rating),
            ("midway", &mut self.midway_rating),
            ("lunch", &mut self.lunch_rating),
            ("facilities", &mut self.facilities_rating),
            ("website", &mut self.website_rating),
            ("signageWayfinding", &mut self.signage_wayfinding_rating),
        ]
    }
}

impl EvaluationNote {
    pub fn hash(&self) -> String {
        let mut buf = vec![u8::from(self.no_show)];
        buf.extend_from_slice(self.text.as_bytes());
        md5_hex(&buf)
    }
}

/// Parse a submitted rating. Empty input means "not provided" (0); anything
/// else must be an integer in `1..=MAX_EVAL_RATING`.
pub fn parse_rating(field: &str, value: &str) -> Result<i32, TypeError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    match value.parse::<i32>() {
        Ok(n) if (1..=MAX_EVAL_RATING).contains(&n) => Ok(n),
        _ => Err(TypeError::InvalidRating {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Hashes of each section as displayed in an editing form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHashes {
    pub conference: String,
    pub note: String,
    /// Indexed by session.
    pub sessions: Vec<String>,
}

impl SectionHashes {
    /// Hashes of `eval` with absent sections hashed as their empty value.
    pub fn of(eval: &Evaluation) -> Self {
        let conference = eval.conference.clone().unwrap_or_default().hash();
        let note = eval.note.clone().unwrap_or_default().hash();
        let sessions = (0..NUM_SESSION as i32)
            .map(|i| match eval.session(i) {
                Some(se) => se.hash(),
                None => SessionEvaluation {
                    session: i,
                    ..SessionEvaluation::default()
                }
                .hash(),
            })
            .collect();
        Self {
            conference,
            note,
            sessions,
        }
    }
}

/// A complete editing-form submission: every section as the editor left it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationSubmission {
    pub conference: ConferenceEvaluation,
    pub note: EvaluationNote,
    /// One entry per session, indexed by session.
    pub sessions: Vec<SessionEvaluation>,
}

/// The sections of a submission that differ from what was displayed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationChanges {
    /// Partial update to pass to the store.
    pub modified: Evaluation,
    /// Human-readable names of the changed sections.
    pub changed: Vec<String>,
}

impl EvaluationSubmission {
    /// Names of fields that cannot be saved: out-of-range ratings, and
    /// session entries with ratings or comments but no class.
    pub fn invalid_fields(&self) -> Vec<String> {
        let mut invalid = Vec::new();
        let in_range = |r: i32| (0..=MAX_EVAL_RATING).contains(&r);
        for (name, rating) in self.conference.ratings() {
            if !in_range(rating) {
                invalid.push(name.to_string());
            }
        }
        for se in &self.sessions {
            let mut has_rating = false;
            for (name, rating) in se.ratings() {
                if !in_range(rating) {
                    invalid.push(format!("{name}{}", se.session));
                }
                has_rating |= rating != 0;
            }
            if se.class_number == 0 && (has_rating || !se.comments.is_empty()) {
                invalid.push(format!("class{}", se.session));
            }
        }
        invalid
    }

    /// Collect the sections whose hash differs from `prior`. Changed
    /// conference and session sections are stamped with `source` and `now`.
    pub fn collect_changes(
        &self,
        prior: &SectionHashes,
        source: &str,
        now: DateTime<Utc>,
    ) -> EvaluationChanges {
        let mut changes = EvaluationChanges::default();

        for se in &self.sessions {
            let prior_hash = usize::try_from(se.session)
                .ok()
                .and_then(|i| prior.sessions.get(i));
            if prior_hash != Some(&se.hash()) {
                let mut se = se.clone();
                se.source = source.to_string();
                se.updated = Some(now);
                changes.changed.push(format!("session {}", se.session + 1));
                changes.modified.sessions.push(se);
            }
        }

        if self.conference.hash() != prior.conference {
            let mut ce = self.conference.clone();
            ce.source = source.to_string();
            ce.updated = Some(now);
            changes.modified.conference = Some(ce);
            changes.changed.push("conference".into());
        }

        if self.note.hash() != prior.note {
            changes.modified.note = Some(self.note.clone());
            changes.changed.push("staff notes".into());
        }

        changes
    }
}
