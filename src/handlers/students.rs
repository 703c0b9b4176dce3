use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{debug, info};

use crate::auth::CurrentUser;
use crate::auth::flash::{self, FlashLevel};
use crate::db::models::StudentId;
use crate::error::AppError;
use crate::middleware::auth::HOME_PATH;
use crate::server::router::RosterState;
use crate::templates::{EditTemplate, IndexTemplate, render};
use crate::types::forms::StudentForm;

/// GET / -> every student, ordered by id.
pub async fn list(
    State(state): State<RosterState>,
    user: CurrentUser,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Html<String>), AppError> {
    let students = state.students.list_all().await?;
    let (jar, flashes) = flash::take(jar);
    let page = render(&IndexTemplate {
        username: user.username,
        students,
        flashes,
    })?;
    Ok((jar, page))
}

/// POST /add
pub async fn add(
    State(state): State<RosterState>,
    user: CurrentUser,
    jar: PrivateCookieJar,
    Form(form): Form<StudentForm>,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    let student = match form.validate() {
        Ok(student) => student,
        Err(err) => {
            let jar = flash::push(jar, FlashLevel::Danger, err.to_string());
            return Ok((jar, Redirect::to(HOME_PATH)));
        }
    };
    let id = state.students.create(&student).await?;
    info!(student_id = id, by = %user.username, "student added");
    let jar = flash::push(jar, FlashLevel::Success, "Student added successfully!");
    Ok((jar, Redirect::to(HOME_PATH)))
}

/// Edit routes only exist for integer ids.
fn edit_id(raw: &str) -> Result<StudentId, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

/// GET /edit/{id} -> pre-filled form.
pub async fn edit_form(
    State(state): State<RosterState>,
    Path(raw_id): Path<String>,
    jar: PrivateCookieJar,
) -> Result<Response, AppError> {
    let id = edit_id(&raw_id)?;
    let Some(student) = state.students.get(id).await? else {
        let jar = flash::push(jar, FlashLevel::Warning, "Student not found.");
        return Ok((jar, Redirect::to(HOME_PATH)).into_response());
    };
    let (jar, flashes) = flash::take(jar);
    let page = render(&EditTemplate { student, flashes })?;
    Ok((jar, page).into_response())
}

/// POST /edit/{id}
///
/// An id with no row is accepted silently, like the delete route.
pub async fn edit_submit(
    State(state): State<RosterState>,
    Path(raw_id): Path<String>,
    user: CurrentUser,
    jar: PrivateCookieJar,
    Form(form): Form<StudentForm>,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    let id = edit_id(&raw_id)?;
    let student = match form.validate() {
        Ok(student) => student,
        Err(err) => {
            let jar = flash::push(jar, FlashLevel::Danger, err.to_string());
            return Ok((jar, Redirect::to(&format!("/edit/{id}"))));
        }
    };
    let updated = state.students.update(id, &student).await?;
    if updated == 0 {
        debug!(student_id = id, "update matched no rows");
        return Ok((jar, Redirect::to(HOME_PATH)));
    }
    info!(student_id = id, by = %user.username, "student updated");
    let jar = flash::push(jar, FlashLevel::Success, "Student updated successfully!");
    Ok((jar, Redirect::to(HOME_PATH)))
}

/// GET /delete/{id} -> unconditional delete; unknown or malformed ids are no-ops.
pub async fn delete(
    State(state): State<RosterState>,
    Path(raw_id): Path<String>,
    user: CurrentUser,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    let Ok(id) = raw_id.parse::<StudentId>() else {
        debug!(raw_id = %raw_id, "delete with non-numeric id ignored");
        return Ok((jar, Redirect::to(HOME_PATH)));
    };
    if state.students.delete(id).await? == 0 {
        debug!(student_id = id, "delete matched no rows");
        return Ok((jar, Redirect::to(HOME_PATH)));
    }
    info!(student_id = id, by = %user.username, "student deleted");
    let jar = flash::push(jar, FlashLevel::Info, "Student deleted.");
    Ok((jar, Redirect::to(HOME_PATH)))
}
