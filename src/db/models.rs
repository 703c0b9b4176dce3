use serde::Serialize;
use sqlx::FromRow;

pub type UserId = i64;
pub type StudentId = i64;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub last_seen: i64,
}
