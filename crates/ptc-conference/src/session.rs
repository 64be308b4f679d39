use std::sync::{Arc, LazyLock};

use ptc_types::{Class, Lunch, Participant, LUNCH_SESSION, NUM_SESSION};
use tracing::warn;

use crate::conference::Conference;

static NO_CLASS: LazyLock<Arc<Class>> = LazyLock::new(|| {
    Arc::new(Class {
        title: "No Class".into(),
        ..Class::default()
    })
});

/// One session of a class, as seen by a participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionClass {
    pub class: Arc<Class>,
    pub session: usize,
    /// The participant teaches this session.
    pub instructor: bool,
}

impl SessionClass {
    pub fn new(class: Arc<Class>, session: usize) -> Self {
        Self {
            class,
            session,
            instructor: false,
        }
    }

    /// Placeholder for a session with no class.
    pub fn no_class(session: usize) -> Self {
        Self::new(Arc::clone(&NO_CLASS), session)
    }

    fn is_multi_session(&self) -> bool {
        self.class.start < self.class.end
    }

    /// 1-based position of this session within the class.
    pub fn part(&self) -> i32 {
        self.session as i32 - self.class.start + 1
    }

    /// "301" for single-session classes, "301.2" for the second part of a
    /// multi-session class.
    pub fn number_dot_part(&self) -> String {
        if self.is_multi_session() {
            format!("{}.{}", self.class.number, self.part())
        } else {
            self.class.number.to_string()
        }
    }

    /// " (2 of 3)" for multi-session classes, empty otherwise.
    pub fn i_of_n(&self) -> String {
        if self.is_multi_session() {
            format!(" ({} of {})", self.part(), self.class.length())
        } else {
            String::new()
        }
    }

    /// The evaluation code issued for this session, or "" if none.
    pub fn evaluation_code(&self) -> &str {
        usize::try_from(self.part() - 1)
            .ok()
            .and_then(|i| self.class.evaluation_codes.get(i))
            .map_or("", String::as_str)
    }
}

impl Conference {
    /// What `p` does in each session, and where they eat lunch.
    ///
    /// Registered classes fill their sessions first; instructor assignments
    /// then take over their sessions. Lunch is the lunch listing the
    /// lunch-session class, else the lunch listing the participant's unit
    /// type, else the general lunch.
    pub fn participant_session_classes_and_lunch(&self, p: &Participant) -> (Vec<SessionClass>, &Lunch) {
        let mut session_classes: Vec<SessionClass> =
            (0..NUM_SESSION).map(SessionClass::no_class).collect();

        for &n in &p.classes {
            let Some(c) = self.class(n) else {
                warn!(class = n, participant = %p.id, "unknown class for participant");
                continue;
            };
            for i in c.start.max(0)..=c.end.min(NUM_SESSION as i32 - 1) {
                if let Some(sc) = session_classes.get_mut(i as usize) {
                    sc.class = Arc::clone(c);
                }
            }
        }

        if let Some(instructor_classes) = self.instructor_classes().get(&p.id) {
            for (i, &n) in instructor_classes.iter().enumerate() {
                if n <= 0 {
                    continue;
                }
                let Some(c) = self.class(n) else {
                    warn!(class = n, participant = %p.id, "unknown instructor class for participant");
                    continue;
                };
                if let Some(sc) = session_classes.get_mut(i) {
                    sc.class = Arc::clone(c);
                    sc.instructor = true;
                }
            }
        }

        let lunch_class = session_classes[LUNCH_SESSION].class.number;
        let lunch = self
            .lunch_for_class_number(lunch_class)
            .or_else(|| self.lunch_for_unit_type(&p.unit_type))
            .unwrap_or_else(|| self.general_lunch());

        (session_classes, lunch)
    }

    pub fn participant_session_classes(&self, p: &Participant) -> Vec<SessionClass> {
        self.participant_session_classes_and_lunch(p).0
    }

    pub fn participant_lunch(&self, p: &Participant) -> &Lunch {
        self.participant_session_classes_and_lunch(p).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conference::InstructorClasses;
    use ptc_types::Configuration;

    fn class(number: i32, start: i32, end: i32) -> Class {
        Class {
            number,
            start,
            end,
            title: format!("Class {number}"),
            ..Class::default()
        }
    }

    fn lunch(name: &str, classes: Vec<i32>, unit_types: Vec<&str>) -> Lunch {
        Lunch {
            name: name.into(),
            classes,
            unit_types: unit_types.into_iter().map(String::from).collect(),
            ..Lunch::default()
        }
    }

    fn conference() -> Conference {
        let mut ic = InstructorClasses::new();
        ic.insert("instructor".into(), vec![0, 0, 0, 401, 0, 0]);
        Conference::new()
            .update_classes(vec![class(101, 0, 0), class(201, 1, 2), class(301, 2, 2), class(401, 3, 3)])
            .update_instructor_classes(ic)
            .update_configuration(Configuration {
                lunches: vec![
                    lunch("General", vec![], vec![]),
                    lunch("Patio", vec![301], vec![]),
                    lunch("Troops", vec![], vec!["Troop"]),
                ],
                ..Configuration::default()
            })
    }

    fn participant(id: &str, classes: Vec<i32>, unit_type: &str) -> Participant {
        Participant {
            id: id.into(),
            classes,
            unit_type: unit_type.into(),
            ..Participant::default()
        }
    }

    #[test]
    fn number_dot_part_and_i_of_n() {
        let multi = SessionClass::new(Arc::new(class(201, 1, 3)), 2);
        assert_eq!(multi.number_dot_part(), "201.2");
        assert_eq!(multi.i_of_n(), " (2 of 3)");
        let single = SessionClass::new(Arc::new(class(101, 0, 0)), 0);
        assert_eq!(single.number_dot_part(), "101");
        assert_eq!(single.i_of_n(), "");
    }

    #[test]
    fn evaluation_code_by_part() {
        let mut c = class(201, 1, 2);
        c.evaluation_codes = vec!["1111".into()];
        let c = Arc::new(c);
        assert_eq!(SessionClass::new(Arc::clone(&c), 1).evaluation_code(), "1111");
        assert_eq!(SessionClass::new(c, 2).evaluation_code(), "");
    }

    #[test]
    fn registered_classes_fill_sessions() {
        let conf = conference();
        let (scs, lunch) =
            conf.participant_session_classes_and_lunch(&participant("p", vec![101, 201, 999], ""));
        assert_eq!(scs.len(), NUM_SESSION);
        assert_eq!(scs[0].class.number, 101);
        assert_eq!(scs[1].class.number, 201);
        assert_eq!(scs[2].class.number, 201);
        assert_eq!(scs[3].class.title, "No Class");
        assert!(scs.iter().all(|sc| !sc.instructor));
        assert_eq!(lunch.name, "General");
    }

    #[test]
    fn instructor_classes_override() {
        let conf = conference();
        let scs = conf.participant_session_classes(&participant("instructor", vec![401], ""));
        assert_eq!(scs[3].class.number, 401);
        assert!(scs[3].instructor);
    }

    #[test]
    fn lunch_resolution_order() {
        let conf = conference();
        assert_eq!(conf.participant_lunch(&participant("p", vec![301], "Troop")).name, "Patio");
        assert_eq!(conf.participant_lunch(&participant("p", vec![201], "Troop")).name, "Troops");
        assert_eq!(conf.participant_lunch(&participant("p", vec![201], "Pack")).name, "General");
    }

    #[test]
    fn oversized_class_range_fills_last_session() {
        let conf = Conference::new().update_classes(vec![class(601, 5, i32::MAX)]);
        let scs = conf.participant_session_classes(&participant("p", vec![601], ""));
        assert_eq!(scs[5].class.number, 601);
        assert_eq!(scs[4].class.title, "No Class");
    }
}
