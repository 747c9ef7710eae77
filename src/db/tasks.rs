use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::db::Db;
use crate::libs::task::{NewTask, PositionUpdate, Task, TaskOrder, TaskPatch, TaskStatus};

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER NOT NULL PRIMARY KEY,
    description TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Todo',
    priority TEXT NOT NULL DEFAULT 'Medium',
    due_date DATE,
    position INTEGER
)";
const INSERT_TASK: &str = "INSERT INTO tasks (description, status, priority, due_date, position) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_TASKS: &str = "SELECT id, description, status, priority, due_date, position FROM tasks";
const WHERE_ID: &str = "WHERE id = ?1";
const WHERE_STATUS: &str = "WHERE status = ?1";
const ORDER_BY_POSITION: &str = "ORDER BY position IS NULL, position";
const ORDER_BY_ID: &str = "ORDER BY id";
const SELECT_MAX_POSITION: &str = "SELECT MAX(position) FROM tasks";
const SELECT_TASK_COUNT: &str = "SELECT COUNT(*) FROM tasks";
const UPDATE_TASK: &str = "UPDATE tasks SET description = ?2, status = ?3, priority = ?4, due_date = ?5, position = ?6 WHERE id = ?1";
const UPDATE_POSITION: &str = "UPDATE tasks SET position = ?2 WHERE id = ?1";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

pub struct Tasks {
    conn: Connection,
}

impl Tasks {
    /// Take over the connection and make sure the table exists.
    pub fn new(db: Db) -> Result<Tasks> {
        db.conn.execute(SCHEMA_TASKS, [])?;
        Ok(Tasks { conn: db.conn })
    }

    /// Fetch all tasks, optionally filtered by status.
    pub fn fetch(&mut self, order: TaskOrder, filter_status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let order_clause = match order {
            TaskOrder::Position => ORDER_BY_POSITION,
            TaskOrder::Id => ORDER_BY_ID,
        };
        let mut tasks = Vec::new();
        match filter_status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!("{} {} {}", SELECT_TASKS, WHERE_STATUS, order_clause))?;
                let task_iter = stmt.query_map(params![status], map_task)?;
                for task in task_iter {
                    tasks.push(task?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{} {}", SELECT_TASKS, order_clause))?;
                let task_iter = stmt.query_map([], map_task)?;
                for task in task_iter {
                    tasks.push(task?);
                }
            }
        }
        Ok(tasks)
    }

    pub fn get_by_id(&mut self, id: i64) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_TASKS, WHERE_ID), params![id], map_task)
            .optional()
            .map_err(Into::into)
    }

    /// Insert a task. When no position is given the task goes to the end of
    /// the list: max existing position + 1, or 1 for an empty table.
    pub fn insert(&mut self, task: &NewTask) -> Result<i64> {
        let position = match task.position {
            Some(position) => position,
            None => {
                let max: Option<i64> = self.conn.query_row(SELECT_MAX_POSITION, [], |row| row.get(0))?;
                max.unwrap_or(0) + 1
            }
        };
        self.conn.execute(
            INSERT_TASK,
            params![task.description, task.status, task.priority, task.due_date, position],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, "Inserted task");
        Ok(id)
    }

    /// Apply only the fields the patch carries; everything else keeps its
    /// current value. `Ok(false)` when no task has that id.
    pub fn update(&mut self, id: i64, patch: &TaskPatch) -> Result<bool> {
        let Some(current) = self.get_by_id(id)? else {
            return Ok(false);
        };
        let description = patch.description.as_deref().unwrap_or(&current.description);
        let status = patch.status.unwrap_or(current.status);
        let priority = patch.priority.unwrap_or(current.priority);
        let due_date = patch.due_date.or(current.due_date);
        let position = patch.position.or(current.position);
        self.conn.execute(UPDATE_TASK, params![id, description, status, priority, due_date, position])?;
        info!(id, "Updated task");
        Ok(true)
    }

    /// `Ok(false)` when no task has that id.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let affected = self.conn.execute(DELETE_TASK, params![id])?;
        if affected > 0 {
            info!(id, "Deleted task");
        }
        Ok(affected > 0)
    }

    /// Apply a batch of position updates in one transaction. Ids that do not
    /// exist are skipped; when an id appears twice the last entry wins.
    /// Returns the number of rows actually repositioned.
    pub fn reorder(&mut self, updates: &[PositionUpdate]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut changed = 0;
        for update in updates {
            changed += tx.execute(UPDATE_POSITION, params![update.id, update.position])?;
        }
        tx.commit()?;
        info!(requested = updates.len(), changed, "Reordered tasks");
        Ok(changed)
    }

    pub fn count(&mut self) -> Result<i64> {
        self.conn
            .query_row(SELECT_TASK_COUNT, [], |row| row.get(0))
            .map_err(Into::into)
    }
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        status: row.get(2)?,
        priority: row.get(3)?,
        due_date: row.get(4)?,
        position: row.get(5)?,
    })
}
