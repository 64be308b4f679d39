use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use chrono::DateTime;
use chrono_tz::Tz;
use ptc_types::{Class, Configuration, Lunch, Participant, LUNCH_SESSION, NUM_SESSION};

use crate::session::SessionClass;

/// Instructor assignments: participant ID to one class number per session
/// (zero for none).
pub type InstructorClasses = BTreeMap<String, Vec<i32>>;

/// Last printed signature per participant ID.
pub type PrintSignatures = BTreeMap<String, String>;

/// Lunch shown for classes that span lunch but have no lunch of their own.
static PROGRAM_LUNCH: LazyLock<Lunch> = LazyLock::new(|| Lunch {
    name: "Lunch location depends on participant unit type".into(),
    short_name: "*".into(),
    seating: 2,
    ..Lunch::default()
});

static TBD_LUNCH: LazyLock<Lunch> = LazyLock::new(Lunch::tbd);

#[derive(Debug, Default)]
struct StaffIds {
    staff: HashSet<String>,
    admin: HashSet<String>,
}

/// Positions in `Configuration::lunches`.
#[derive(Debug, Default)]
struct LunchIndex {
    by_class: HashMap<i32, usize>,
    by_unit_type: HashMap<String, usize>,
}

/// Immutable snapshot of all conference data.
///
/// Each `update_*` method returns a new value that shares every unchanged
/// slice with `self`. Indices that join several slices (evaluation codes,
/// the session grid, staff IDs, lunches) are built on first use and then
/// read without locking.
pub struct Conference {
    classes: Arc<Vec<Arc<Class>>>,
    classes_by_number: Arc<HashMap<i32, Arc<Class>>>,
    participants: Arc<Vec<Arc<Participant>>>,
    participants_by_id: Arc<HashMap<String, Arc<Participant>>>,
    participants_by_login_code: Arc<HashMap<String, Arc<Participant>>>,
    instructor_classes: Arc<InstructorClasses>,
    configuration: Arc<Configuration>,
    date: Option<DateTime<Tz>>,

    eval_codes: OnceLock<HashMap<String, SessionClass>>,
    sessions: OnceLock<Vec<Vec<SessionClass>>>,
    ids: OnceLock<StaffIds>,
    lunch: OnceLock<LunchIndex>,
}

impl Conference {
    /// An empty conference with the default configuration.
    pub fn new() -> Self {
        let configuration = Configuration::default();
        Self {
            classes: Arc::default(),
            classes_by_number: Arc::default(),
            participants: Arc::default(),
            participants_by_id: Arc::default(),
            participants_by_login_code: Arc::default(),
            instructor_classes: Arc::default(),
            date: configuration.date(),
            configuration: Arc::new(configuration),
            eval_codes: OnceLock::new(),
            sessions: OnceLock::new(),
            ids: OnceLock::new(),
            lunch: OnceLock::new(),
        }
    }

    /// Shares every slice; derived indices start empty.
    fn shallow_copy(&self) -> Self {
        Self {
            classes: Arc::clone(&self.classes),
            classes_by_number: Arc::clone(&self.classes_by_number),
            participants: Arc::clone(&self.participants),
            participants_by_id: Arc::clone(&self.participants_by_id),
            participants_by_login_code: Arc::clone(&self.participants_by_login_code),
            instructor_classes: Arc::clone(&self.instructor_classes),
            configuration: Arc::clone(&self.configuration),
            date: self.date,
            eval_codes: OnceLock::new(),
            sessions: OnceLock::new(),
            ids: OnceLock::new(),
            lunch: OnceLock::new(),
        }
    }

    pub fn update_configuration(&self, configuration: Configuration) -> Self {
        let mut conf = self.shallow_copy();
        conf.date = configuration.date();
        conf.configuration = Arc::new(configuration);
        conf
    }

    pub fn update_classes(&self, classes: Vec<Class>) -> Self {
        let mut conf = self.shallow_copy();
        let classes: Vec<Arc<Class>> = classes.into_iter().map(Arc::new).collect();
        conf.classes_by_number = Arc::new(
            classes
                .iter()
                .map(|c| (c.number, Arc::clone(c)))
                .collect(),
        );
        conf.classes = Arc::new(classes);
        conf
    }

    pub fn update_participants(&self, participants: Vec<Participant>) -> Self {
        let mut conf = self.shallow_copy();
        let participants: Vec<Arc<Participant>> = participants.into_iter().map(Arc::new).collect();
        let mut by_id = HashMap::with_capacity(participants.len());
        let mut by_login_code = HashMap::with_capacity(participants.len());
        for p in &participants {
            by_id.insert(p.id.clone(), Arc::clone(p));
            if !p.login_code.is_empty() {
                by_login_code.insert(p.login_code.clone(), Arc::clone(p));
            }
        }
        conf.participants = Arc::new(participants);
        conf.participants_by_id = Arc::new(by_id);
        conf.participants_by_login_code = Arc::new(by_login_code);
        conf
    }

    pub fn update_instructor_classes(&self, instructor_classes: InstructorClasses) -> Self {
        let mut conf = self.shallow_copy();
        conf.instructor_classes = Arc::new(instructor_classes);
        conf
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Midnight of the conference day in the conference time zone.
    pub fn date(&self) -> Option<DateTime<Tz>> {
        self.date
    }

    /// Classes in import order. Callers that sort or filter should copy.
    pub fn classes(&self) -> &[Arc<Class>] {
        &self.classes
    }

    /// Participants in import order. Callers that sort or filter should copy.
    pub fn participants(&self) -> &[Arc<Participant>] {
        &self.participants
    }

    pub fn instructor_classes(&self) -> &InstructorClasses {
        &self.instructor_classes
    }

    pub fn class(&self, number: i32) -> Option<&Arc<Class>> {
        self.classes_by_number.get(&number)
    }

    pub fn participant(&self, id: &str) -> Option<&Arc<Participant>> {
        self.participants_by_id.get(id)
    }

    pub fn participant_from_login_code(&self, login_code: &str) -> Option<&Arc<Participant>> {
        self.participants_by_login_code.get(login_code)
    }

    /// Instructor class per session for `p`; all zero if none are assigned.
    pub fn participant_instructor_classes(&self, p: &Participant) -> Vec<i32> {
        self.instructor_classes
            .get(&p.id)
            .cloned()
            .unwrap_or_else(|| vec![0; NUM_SESSION])
    }

    /// Fingerprint of the class vectors printed on a participant's form.
    ///
    /// Registered classes as stored, then `|`, then instructor classes padded
    /// to one slot per session; every number in base 36, comma separated.
    pub fn print_signature(&self, p: &Participant) -> String {
        let mut instructor = self.participant_instructor_classes(p);
        if instructor.len() < NUM_SESSION {
            instructor.resize(NUM_SESSION, 0);
        }
        format!("{}|{}", join_base36(&p.classes), join_base36(&instructor))
    }

    /// Participants whose live print signature differs from the one
    /// recorded when their form was last printed.
    pub fn participants_needing_print(&self, printed: &PrintSignatures) -> Vec<Arc<Participant>> {
        self.participants
            .iter()
            .filter(|p| printed.get(&p.id) != Some(&self.print_signature(p)))
            .cloned()
            .collect()
    }

    fn ids(&self) -> &StaffIds {
        self.ids.get_or_init(|| {
            let mut ids = StaffIds::default();
            for id in &self.configuration.staff_ids {
                ids.staff.insert(id.to_lowercase());
            }
            for id in &self.configuration.admin_ids {
                let id = id.to_lowercase();
                ids.staff.insert(id.clone());
                ids.admin.insert(id);
            }
            ids
        })
    }

    /// Returns `true` if `id` (a lowercased login ID) is staff. Admins are
    /// staff.
    pub fn is_staff(&self, id: &str) -> bool {
        !id.is_empty() && self.ids().staff.contains(id)
    }

    pub fn is_admin(&self, id: &str) -> bool {
        !id.is_empty() && self.ids().admin.contains(id)
    }

    /// Participants registered for `class`, in import order.
    pub fn class_participants(&self, class: &Class) -> Vec<Arc<Participant>> {
        self.participants
            .iter()
            .filter(|p| p.classes.contains(&class.number))
            .cloned()
            .collect()
    }

    /// The class session an evaluation code was issued for.
    pub fn session_class_from_evaluation_code(&self, code: &str) -> Option<&SessionClass> {
        self.eval_codes
            .get_or_init(|| {
                let mut index = HashMap::new();
                for c in self.classes.iter() {
                    for (i, code) in c.evaluation_codes.iter().enumerate() {
                        if let Some(session) = usize::try_from(c.start).ok().map(|s| s + i) {
                            index.insert(code.clone(), SessionClass::new(Arc::clone(c), session));
                        }
                    }
                }
                index
            })
            .get(code)
    }

    /// Classes meeting in each session, indexed by session.
    pub fn sessions(&self) -> &[Vec<SessionClass>] {
        self.sessions.get_or_init(|| {
            let mut sessions = vec![Vec::new(); NUM_SESSION];
            for c in self.classes.iter() {
                for i in c.start.max(0)..=c.end.min(NUM_SESSION as i32 - 1) {
                    if let Some(session) = sessions.get_mut(i as usize) {
                        session.push(SessionClass::new(Arc::clone(c), i as usize));
                    }
                }
            }
            sessions
        })
    }

    fn lunch_index(&self) -> &LunchIndex {
        self.lunch.get_or_init(|| {
            let mut index = LunchIndex::default();
            for (i, lunch) in self.configuration.lunches.iter().enumerate() {
                for n in &lunch.classes {
                    index.by_class.insert(*n, i);
                }
                for unit_type in &lunch.unit_types {
                    index.by_unit_type.insert(unit_type.clone(), i);
                }
            }
            index
        })
    }

    pub(crate) fn lunch_for_class_number(&self, number: i32) -> Option<&Lunch> {
        self.lunch_index()
            .by_class
            .get(&number)
            .and_then(|i| self.configuration.lunches.get(*i))
    }

    pub(crate) fn lunch_for_unit_type(&self, unit_type: &str) -> Option<&Lunch> {
        self.lunch_index()
            .by_unit_type
            .get(unit_type)
            .and_then(|i| self.configuration.lunches.get(*i))
    }

    /// Lunch for students of `class`, or `None` if the class does not meet
    /// during the lunch session.
    pub fn class_lunch(&self, class: &Class) -> Option<&Lunch> {
        let lunch_session = LUNCH_SESSION as i32;
        if class.end < lunch_session || class.start > lunch_session {
            return None;
        }
        Some(
            self.lunch_for_class_number(class.number)
                .unwrap_or(&*PROGRAM_LUNCH),
        )
    }

    /// The default lunch: the first configured lunch, or a TBD placeholder.
    pub fn general_lunch(&self) -> &Lunch {
        self.configuration.lunches.first().unwrap_or(&*TBD_LUNCH)
    }
}

impl Default for Conference {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conference")
            .field("date", &self.date)
            .field("classes", &self.classes.len())
            .field("participants", &self.participants.len())
            .field("instructors", &self.instructor_classes.len())
            .finish()
    }
}

fn join_base36(numbers: &[i32]) -> String {
    numbers.iter().map(|n| base36(*n)).collect::<Vec<_>>().join(",")
}

fn base36(n: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut value = i64::from(n).unsigned_abs();
    let mut buf = Vec::new();
    loop {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    if n < 0 {
        buf.push(b'-');
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}
