//! In-memory task store.
//!
//! The single owner of the task collection and the current filter. Every
//! change goes through [`TaskStore::dispatch`] (or the helper method for that
//! action), which keeps the timestamp invariants of [`Task`]:
//! - `updated_at` is refreshed on every mutation and never precedes `created_at`.
//! - `completed_at` is present exactly when the status is completed.

use chrono::{DateTime, Duration, Local};
use log::info;
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

use crate::app::models::{FilterSpec, NewTask, Status, Task, TaskId};
use crate::error::StoreError;

/// Source of the current moment for mutations.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        ManualClock {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTasks(Vec<Task>),
    AddTask(NewTask),
    UpdateTask(Task),
    DeleteTask(TaskId),
    ToggleStatus(TaskId),
    SetFilters(FilterSpec),
}

pub struct TaskStore {
    tasks: Vec<Task>,
    filters: FilterSpec,
    clock: Box<dyn Clock>,
    revision: u64,
}

impl TaskStore {
    pub fn new(clock: impl Clock + 'static) -> TaskStore {
        TaskStore {
            tasks: Vec::new(),
            filters: FilterSpec::default(),
            clock: Box::new(clock),
            revision: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Changes whenever the task collection changes; filter updates leave it alone.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    // Applies one action. Returns the id of the task the action touched, if any.
    pub fn dispatch(&mut self, action: Action) -> Result<Option<TaskId>, StoreError> {
        match action {
            Action::SetTasks(tasks) => {
                self.set_tasks(tasks);
                Ok(None)
            }
            Action::AddTask(data) => self.add_task(data).map(Some),
            Action::UpdateTask(task) => {
                let id = task.id;
                self.update_task(task).map(|_| Some(id))
            }
            Action::DeleteTask(id) => self.delete_task(id).map(|_| Some(id)),
            Action::ToggleStatus(id) => self.toggle_status(id).map(|_| Some(id)),
            Action::SetFilters(spec) => {
                self.set_filters(spec);
                Ok(None)
            }
        }
    }

    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        info!("event=tasks_load module=store status=ok count={}", tasks.len());
        self.tasks = tasks;
        self.revision += 1;
    }

    pub fn add_task(&mut self, data: NewTask) -> Result<TaskId, StoreError> {
        validate(&data.title, data.estimated_time)?;

        let now = self.clock.now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            category: data.category,
            priority: data.priority,
            status: data.status,
            due_date: data.due_date,
            estimated_time: data.estimated_time,
            created_at: now,
            updated_at: now,
            completed_at: (data.status == Status::Completed).then_some(now),
            tags: data.tags,
        };
        let id = task.id;

        info!("event=task_add module=store status=ok task_id={id}");
        self.tasks.push(task);
        self.revision += 1;
        Ok(id)
    }

    pub fn update_task(&mut self, mut task: Task) -> Result<(), StoreError> {
        validate(&task.title, task.estimated_time)?;

        let now = self.clock.now();
        let stored = self
            .tasks
            .iter_mut()
            .find(|stored| stored.id == task.id)
            .ok_or(StoreError::TaskNotFound(task.id))?;

        task.created_at = stored.created_at;
        task.updated_at = now.max(stored.created_at);
        task.completed_at = match (stored.status, task.status) {
            (Status::Completed, Status::Completed) => stored.completed_at.or(Some(now)),
            (_, Status::Completed) => Some(now),
            _ => None,
        };

        info!(
            "event=task_update module=store status=ok task_id={} task_status={}",
            task.id, task.status
        );
        *stored = task;
        self.revision += 1;
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;

        self.tasks.remove(index);
        info!("event=task_delete module=store status=ok task_id={id}");
        self.revision += 1;
        Ok(())
    }

    // Completed tasks go back to todo, every other status becomes completed
    pub fn toggle_status(&mut self, id: TaskId) -> Result<Status, StoreError> {
        let mut task = self.get(id).cloned().ok_or(StoreError::TaskNotFound(id))?;
        task.status = match task.status {
            Status::Completed => Status::Todo,
            _ => Status::Completed,
        };
        let status = task.status;
        self.update_task(task)?;
        Ok(status)
    }

    pub fn set_filters(&mut self, spec: FilterSpec) {
        self.filters = spec;
    }
}

fn validate(title: &str, estimated_time: u32) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    if estimated_time == 0 {
        return Err(StoreError::ZeroEstimate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{Category, Criterion, Priority};
    use crate::app::test_support::at;
    use pretty_assertions::assert_eq;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "desc".to_string(),
            category: Category::Work,
            priority: Priority::Medium,
            status: Status::Todo,
            due_date: None,
            estimated_time: 30,
            tags: vec!["tag".to_string()],
        }
    }

    fn store_at(now: DateTime<Local>) -> (TaskStore, ManualClock) {
        let clock = ManualClock::new(now);
        (TaskStore::new(clock.clone()), clock)
    }

    #[test]
    fn add_assigns_id_and_timestamps() {
        let now = at(2024, 5, 10, 8, 0);
        let (mut store, _) = store_at(now);
        let id = store.add_task(new_task("Write docs")).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
        assert_eq!(task.completed_at, None);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn add_completed_task_sets_completed_at() {
        let now = at(2024, 5, 10, 8, 0);
        let (mut store, _) = store_at(now);
        let mut data = new_task("Already done");
        data.status = Status::Completed;
        let id = store.add_task(data).unwrap();
        assert_eq!(store.get(id).unwrap().completed_at, Some(now));
    }

    #[test]
    fn add_rejects_empty_title_and_zero_estimate() {
        let (mut store, _) = store_at(at(2024, 5, 10, 8, 0));
        assert_eq!(store.add_task(new_task("  ")), Err(StoreError::EmptyTitle));
        let mut data = new_task("Quick");
        data.estimated_time = 0;
        assert_eq!(store.add_task(data), Err(StoreError::ZeroEstimate));
        assert!(store.tasks().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn update_maintains_completed_at_invariant() {
        let (mut store, clock) = store_at(at(2024, 5, 10, 8, 0));
        let id = store.add_task(new_task("Laundry")).unwrap();

        clock.set(at(2024, 5, 10, 9, 0));
        let mut task = store.get(id).cloned().unwrap();
        task.status = Status::Completed;
        store.update_task(task).unwrap();
        let done = store.get(id).cloned().unwrap();
        assert_eq!(done.completed_at, Some(at(2024, 5, 10, 9, 0)));
        assert_eq!(done.updated_at, at(2024, 5, 10, 9, 0));

        // Editing a completed task keeps the original completion time
        clock.set(at(2024, 5, 10, 10, 0));
        let mut renamed = done.clone();
        renamed.title = "Laundry (folded)".to_string();
        store.update_task(renamed).unwrap();
        assert_eq!(
            store.get(id).unwrap().completed_at,
            Some(at(2024, 5, 10, 9, 0))
        );

        let mut reopened = store.get(id).cloned().unwrap();
        reopened.status = Status::InProgress;
        store.update_task(reopened).unwrap();
        assert_eq!(store.get(id).unwrap().completed_at, None);
    }

    #[test]
    fn update_ignores_caller_supplied_timestamps() {
        let (mut store, clock) = store_at(at(2024, 5, 10, 8, 0));
        let id = store.add_task(new_task("Taxes")).unwrap();
        clock.advance(Duration::hours(1));

        let mut forged = store.get(id).cloned().unwrap();
        forged.created_at = at(2030, 1, 1, 0, 0);
        forged.completed_at = Some(at(2030, 1, 1, 0, 0));
        store.update_task(forged).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.created_at, at(2024, 5, 10, 8, 0));
        assert_eq!(task.updated_at, at(2024, 5, 10, 9, 0));
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (mut store, _) = store_at(at(2024, 5, 10, 8, 0));
        let missing = Uuid::new_v4();
        assert_eq!(store.delete_task(missing), Err(StoreError::TaskNotFound(missing)));
        assert_eq!(
            store.toggle_status(missing),
            Err(StoreError::TaskNotFound(missing))
        );
    }

    #[test]
    fn toggle_flips_between_completed_and_todo() {
        let (mut store, _) = store_at(at(2024, 5, 10, 8, 0));
        let mut data = new_task("Stretch");
        data.status = Status::InProgress;
        let id = store.add_task(data).unwrap();

        assert_eq!(store.toggle_status(id), Ok(Status::Completed));
        assert!(store.get(id).unwrap().completed_at.is_some());
        assert_eq!(store.toggle_status(id), Ok(Status::Todo));
        assert!(store.get(id).unwrap().completed_at.is_none());
    }

    #[test]
    fn dispatch_routes_actions() {
        let (mut store, _) = store_at(at(2024, 5, 10, 8, 0));
        let id = store
            .dispatch(Action::AddTask(new_task("Plan")))
            .unwrap()
            .unwrap();

        let spec = FilterSpec {
            category: Some(Criterion::Is(Category::Health)),
            ..FilterSpec::default()
        };
        assert_eq!(store.dispatch(Action::SetFilters(spec.clone())), Ok(None));
        assert_eq!(store.filters(), &spec);
        assert_eq!(store.revision(), 1);

        assert_eq!(store.dispatch(Action::DeleteTask(id)), Ok(Some(id)));
        assert!(store.tasks().is_empty());
        assert_eq!(store.revision(), 2);
    }
}
