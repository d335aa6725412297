//! In-memory student roster

use std::sync::Arc;

use tokio::sync::Mutex;

/// Ordered, append-only list of submitted student names.
///
/// Cloning the store yields another handle onto the same list. The list lives
/// only as long as the process and is never deduplicated.
#[derive(Debug, Clone, Default)]
pub struct StudentStore {
    students: Arc<Mutex<Vec<String>>>,
}

impl StudentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim `name`, append it and return the list as it stands after the append.
    pub async fn add(&self, name: &str) -> Vec<String> {
        let mut students = self.students.lock().await;
        students.push(name.trim().to_string());
        students.clone()
    }

    /// Snapshot of every name in insertion order
    pub async fn list(&self) -> Vec<String> {
        self.students.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.students.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.students.lock().await.is_empty()
    }
}
