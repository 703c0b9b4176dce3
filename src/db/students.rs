use crate::db::SqlitePool;
use crate::db::models::{Student, StudentId};
use crate::error::AppError;
use crate::types::forms::NewStudent;

/// CRUD over the `students` table. Inputs are validated by the caller.
#[derive(Clone)]
pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, Student>(
            "SELECT id, name, age, grade FROM students ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: StudentId) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, Student>(
            "SELECT id, name, age, grade FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, student: &NewStudent) -> Result<StudentId, AppError> {
        let res = sqlx::query("INSERT INTO students (name, age, grade) VALUES (?, ?, ?)")
            .bind(&student.name)
            .bind(student.age)
            .bind(&student.grade)
            .execute(&self.pool)
            .await?;
        Ok(res.last_insert_rowid())
    }

    /// Returns the number of rows touched; zero when `id` does not exist.
    pub async fn update(&self, id: StudentId, student: &NewStudent) -> Result<u64, AppError> {
        let res = sqlx::query("UPDATE students SET name = ?, age = ?, grade = ? WHERE id = ?")
            .bind(&student.name)
            .bind(student.age)
            .bind(&student.grade)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    /// Returns the number of rows removed; zero when `id` does not exist.
    pub async fn delete(&self, id: StudentId) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
