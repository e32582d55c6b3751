//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `tasks` table and its `task_tags` child rows.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before any SQL mutation.
//! - A task row and its tag rows are always written in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Lists are ordered by `updated_at DESC, uuid ASC`.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskKind, TaskValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    context,
    kind,
    minutes,
    is_priority,
    completed_at,
    updated_at,
    energy,
    project
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    AlreadyExists(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "task already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::AlreadyExists(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Exact context match.
    pub context: Option<String>,
    /// Excludes completed tasks when set.
    pub open_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl TaskListQuery {
    /// Returns whether one task passes the non-paging part of this query.
    pub fn matches(&self, task: &Task) -> bool {
        if self.open_only && !task.is_open() {
            return false;
        }
        self.context
            .as_deref()
            .map_or(true, |context| task.context == context)
    }
}

/// Persistence collaborator for task records.
pub trait TaskRepository {
    fn create_task(&mut self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&mut self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&mut self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
///
/// Owns its connection so one repository can live inside a long-lived planner.
pub struct SqliteTaskRepository {
    conn: Connection,
}

impl SqliteTaskRepository {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn create_task(&mut self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        let id_text = task.id.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if task_exists_in_tx(&tx, &id_text)? {
            return Err(RepoError::AlreadyExists(task.id));
        }

        tx.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                context,
                kind,
                minutes,
                is_priority,
                completed_at,
                updated_at,
                energy,
                project
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id_text,
                task.title.as_str(),
                task.context.as_str(),
                task.kind.as_str(),
                task.minutes,
                bool_to_int(task.is_priority),
                task.completed_at,
                task.updated_at,
                task.energy.as_deref(),
                task.project.as_deref(),
            ],
        )?;
        replace_tags_in_tx(&tx, &id_text, &task.tags)?;
        tx.commit()?;

        Ok(task.id)
    }

    fn update_task(&mut self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let id_text = task.id.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks
             SET
                title = ?1,
                context = ?2,
                kind = ?3,
                minutes = ?4,
                is_priority = ?5,
                completed_at = ?6,
                updated_at = ?7,
                energy = ?8,
                project = ?9
             WHERE uuid = ?10;",
            params![
                task.title.as_str(),
                task.context.as_str(),
                task.kind.as_str(),
                task.minutes,
                bool_to_int(task.is_priority),
                task.completed_at,
                task.updated_at,
                task.energy.as_deref(),
                task.project.as_deref(),
                id_text,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        replace_tags_in_tx(&tx, &id_text, &task.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(&self.conn, row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.open_only {
            sql.push_str(" AND completed_at IS NULL");
        }

        if let Some(context) = query.context.as_ref() {
            sql.push_str(" AND context = ?");
            bind_values.push(Value::Text(context.clone()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(&self.conn, row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&mut self, id: TaskId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM task_tags WHERE task_uuid = ?1;", [&id_text])?;
        let changed = tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [&id_text])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(())
    }
}

fn parse_task_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = TaskKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task kind `{kind_text}` in tasks.kind"))
    })?;

    let is_priority = match row.get::<_, i64>("is_priority")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_priority value `{other}` in tasks.is_priority"
            )));
        }
    };

    let task = Task {
        id,
        title: row.get("title")?,
        context: row.get("context")?,
        kind,
        minutes: row.get("minutes")?,
        is_priority,
        completed_at: row.get("completed_at")?,
        updated_at: row.get("updated_at")?,
        energy: row.get("energy")?,
        project: row.get("project")?,
        tags: load_tags(conn, &uuid_text)?,
    };
    task.validate()?;
    Ok(task)
}

fn load_tags(conn: &Connection, task_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag
         FROM task_tags
         WHERE task_uuid = ?1
         ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([task_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn replace_tags_in_tx(tx: &Transaction<'_>, task_uuid: &str, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM task_tags WHERE task_uuid = ?1;", [task_uuid])?;
    for tag in tags {
        tx.execute(
            "INSERT INTO task_tags (task_uuid, tag) VALUES (?1, ?2);",
            params![task_uuid, tag.as_str()],
        )?;
    }
    Ok(())
}

fn task_exists_in_tx(tx: &Transaction<'_>, task_uuid: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE uuid = ?1);",
        [task_uuid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
