//! In-memory task store (non-persistent).

use super::{matches_search, StoreError, TaskStore};
use crate::task::{NewTask, Task, TaskId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    last_id: TaskId,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_tasks(&self, search: Option<&str>, limit: usize) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| search.map_or(true, |s| matches_search(t, s)))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        tasks.truncate(limit);
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.inner
            .read()
            .await
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert_task(&self, task: &NewTask) -> Result<TaskId, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.tasks.insert(id, task.clone().with_id(id));
        Ok(id)
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(task.id)),
        }
    }

    async fn update_date(&self, id: TaskId, date: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&id) {
            Some(existing) => {
                existing.date = date.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
