//! Server-rendered views (Askama). Every interpolated value is HTML-escaped.

use askama::Template;
use axum::response::Html;

use crate::auth::FlashMessage;
use crate::db::Student;
use crate::error::AppError;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub username: String,
    pub students: Vec<Student>,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub student: Student,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub flashes: Vec<FlashMessage>,
}

pub fn render<T: Template>(tpl: &T) -> Result<Html<String>, AppError> {
    Ok(Html(tpl.render()?))
}
