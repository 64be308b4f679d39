use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::Datelike;
use ptc_conference::{sort_classes, Conference};
use ptc_store::Store;
use ptc_types::{Class, ScheduleTime, NO_CLASS_CLASS_NUMBER, NUM_SESSION, SESSION_TIMES};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    async fn conference(&self, params: &ListParams) -> ServerResult<Arc<Conference>> {
        let (conf, _) = self.store.get(params.nocache.is_some()).await?;
        Ok(conf)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Present to bypass the snapshot cache.
    pub nocache: Option<String>,
    pub sort: Option<String>,
}

/// Successful API responses are wrapped in a `result` object.
fn respond<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "result": data }))
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "name": "ptc-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// A class as an event in the registration system's calendar.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub number: i32,
    pub title: String,
    pub title_new: String,
    pub title_note: String,
    pub description: String,
    pub start_session: i32,
    pub end_session: i32,
    /// Year, month, day, hour, minute in conference local time.
    pub start_time: [i32; 5],
    pub end_time: [i32; 5],
    /// 0 is unlimited, -1 is full.
    pub capacity: i32,
    pub programs: Vec<&'static str>,
}

fn local_time(conf: &Conference, t: ScheduleTime) -> ServerResult<[i32; 5]> {
    let date = conf.date().ok_or(ServerError::NoConferenceDate)?;
    Ok([
        date.year(),
        date.month() as i32,
        date.day() as i32,
        i32::from(t.hour()),
        i32::from(t.minute()),
    ])
}

fn session_times(class: &Class) -> Option<(ScheduleTime, ScheduleTime)> {
    let start = SESSION_TIMES.get(usize::try_from(class.start).ok()?)?;
    let end = SESSION_TIMES.get(usize::try_from(class.end).ok()?)?;
    Some((start.0, end.1))
}

fn session_event(conf: &Conference, class: &Class) -> ServerResult<SessionEvent> {
    let (start, end) = session_times(class)
        .ok_or_else(|| ServerError::Internal(format!("class {} has no valid sessions", class.number)))?;
    let programs = if class.is_for_all_programs() {
        Vec::new()
    } else {
        class.program_descriptions(false).into_iter().map(|pd| pd.name).collect()
    };
    Ok(SessionEvent {
        number: class.number,
        title: class.title.clone(),
        title_new: class.new_label.clone(),
        title_note: class.title_note.clone(),
        description: class.description.clone(),
        start_session: class.start + 1,
        end_session: class.end + 1,
        start_time: local_time(conf, start)?,
        end_time: local_time(conf, end)?,
        capacity: class.capacity,
        programs,
    })
}

fn no_class_event(conf: &Conference) -> ServerResult<SessionEvent> {
    Ok(SessionEvent {
        number: NO_CLASS_CLASS_NUMBER,
        title: "No classes (select if not taking classes at the conference)".into(),
        title_new: String::new(),
        title_note: String::new(),
        description: "Select this activity to indicate that you are not taking classes at the conference."
            .into(),
        start_session: 0,
        end_session: 0,
        start_time: local_time(conf, SESSION_TIMES[0].0)?,
        end_time: local_time(conf, SESSION_TIMES[NUM_SESSION - 1].1)?,
        capacity: 0,
        programs: Vec::new(),
    })
}

/// `GET /api/sessionEvents/:number`
pub async fn session_event_handler(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(params): Query<ListParams>,
) -> ServerResult<Json<Value>> {
    let not_found = || ServerError::NotFound(format!("Class {number:?} not found."));
    let n: i32 = number.parse().map_err(|_| not_found())?;
    let conf = state.conference(&params).await?;
    let event = if n == NO_CLASS_CLASS_NUMBER {
        no_class_event(&conf)?
    } else {
        let class = conf.class(n).ok_or_else(not_found)?;
        session_event(&conf, class)?
    };
    Ok(respond(event))
}

/// `GET /api/classes`, optionally `?sort=location` (or `-location`).
pub async fn classes_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ServerResult<Json<Value>> {
    let conf = state.conference(&params).await?;
    let mut classes = conf.classes().to_vec();
    if let Some(key) = &params.sort {
        sort_classes(&mut classes, key);
    }
    let classes: Vec<&Class> = classes.iter().map(|c| c.as_ref()).collect();
    Ok(respond(classes))
}

/// `GET /api/evalCode/:code`: the class session an evaluation code belongs to.
pub async fn eval_code_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<ListParams>,
) -> ServerResult<Json<Value>> {
    let conf = state.conference(&params).await?;
    let sc = conf
        .session_class_from_evaluation_code(&code)
        .ok_or_else(|| ServerError::NotFound(format!("Evaluation code {code:?} not found.")))?;
    Ok(respond(json!({
        "number": sc.class.number,
        "session": sc.session + 1,
        "numberDotPart": sc.number_dot_part(),
        "title": sc.class.title,
        "iOfN": sc.i_of_n(),
    })))
}
