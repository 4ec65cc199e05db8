//! Project Store

use super::StateCell;
use crate::events::{ChangeAction, EntityKind, EventBus, StoreEvent};
use crate::storage::SnapshotStorage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use serde::{Deserialize, Serialize};
use shared::models::{Project, ProjectCreate, ProjectUpdate};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult, ErrorCode};
use tokio::sync::broadcast;

const STORE_KEY: &str = "projects";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ProjectState {
    projects: Vec<Project>,
}

/// Production projects that castings recruit for
pub struct ProjectStore {
    cell: StateCell<ProjectState>,
    events: EventBus,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    pub fn new() -> Self {
        Self {
            cell: StateCell::in_memory(STORE_KEY),
            events: EventBus::new(),
        }
    }

    pub fn open(storage: SnapshotStorage) -> AppResult<Self> {
        Ok(Self {
            cell: StateCell::open(STORE_KEY, storage)?,
            events: EventBus::new(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn list_projects(&self) -> Vec<Project> {
        self.cell.read(|s| s.projects.clone())
    }

    pub fn get_project(&self, id: i64) -> Option<Project> {
        self.cell
            .read(|s| s.projects.iter().find(|p| p.id == id).cloned())
    }

    pub fn exists(&self, id: i64) -> bool {
        self.cell.read(|s| s.projects.iter().any(|p| p.id == id))
    }

    pub fn add_project(&self, data: ProjectCreate) -> AppResult<Project> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

        let project = Project {
            id: snowflake_id(),
            name: data.name.trim().to_string(),
            description: data.description,
            created_at: now_millis(),
        };
        let created = self.cell.mutate(|s| {
            s.projects.push(project.clone());
            Ok(project)
        })?;
        tracing::info!(project_id = created.id, name = %created.name, "Project created");
        self.events
            .publish(EntityKind::Project, ChangeAction::Created, created.id);
        Ok(created)
    }

    pub fn update_project(&self, id: i64, data: ProjectUpdate) -> AppResult<Project> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

        let updated = self.cell.mutate(|s| {
            let project = s
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| AppError::missing(ErrorCode::ProjectNotFound, id))?;
            if let Some(name) = data.name {
                project.name = name.trim().to_string();
            }
            if data.description.is_some() {
                project.description = data.description;
            }
            Ok(project.clone())
        })?;
        self.events
            .publish(EntityKind::Project, ChangeAction::Updated, id);
        Ok(updated)
    }

    /// Remove the project record only
    ///
    /// Casting links live in the sales store, so the public path is
    /// `Dashboard::delete_project`.
    pub(crate) fn delete_project(&self, id: i64) -> AppResult<()> {
        self.cell.mutate(|s| {
            let before = s.projects.len();
            s.projects.retain(|p| p.id != id);
            if s.projects.len() == before {
                return Err(AppError::missing(ErrorCode::ProjectNotFound, id));
            }
            Ok(())
        })?;
        tracing::info!(project_id = id, "Project deleted");
        self.events
            .publish(EntityKind::Project, ChangeAction::Deleted, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_crud() {
        let store = ProjectStore::new();
        let p = store
            .add_project(ProjectCreate {
                name: " Autumn series ".to_string(),
                description: None,
            })
            .unwrap();
        assert_eq!(p.name, "Autumn series");
        assert!(store.exists(p.id));

        let p = store
            .update_project(
                p.id,
                ProjectUpdate {
                    description: Some("Four episodes".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(p.name, "Autumn series");
        assert_eq!(p.description.as_deref(), Some("Four episodes"));

        store.delete_project(p.id).unwrap();
        assert!(store.list_projects().is_empty());
        let err = store.delete_project(p.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectNotFound);
    }

    #[test]
    fn test_project_requires_name() {
        let store = ProjectStore::new();
        let err = store.add_project(ProjectCreate::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_project_snapshot_reopen() {
        let storage = SnapshotStorage::open_in_memory().unwrap();
        let id = ProjectStore::open(storage.clone())
            .unwrap()
            .add_project(ProjectCreate {
                name: "Pilot".to_string(),
                description: None,
            })
            .unwrap()
            .id;
        let reopened = ProjectStore::open(storage).unwrap();
        assert_eq!(reopened.get_project(id).unwrap().name, "Pilot");
    }
}
