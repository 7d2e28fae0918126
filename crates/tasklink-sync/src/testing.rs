//! In-memory store fakes for engine tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, Utc};

use tasklink_core::domain::{DueDate, LinkTable, LocalId, LocalItem, RemoteId, RemoteTask, TaskStatus};
use tasklink_core::ports::{
    ILinkStore, ILocalReminderStore, IRemoteTaskSource, NewReminder, NewRemoteTask,
    ReminderUpdate, StatusLookup,
};

const READ_OPS: &[&str] = &["list", "status", "access", "get"];

fn is_write(call: &str) -> bool {
    let op = call.split_whitespace().next().unwrap_or_default();
    !READ_OPS.contains(&op)
}

// ============================================================================
// Remote
// ============================================================================

#[derive(Debug, Clone)]
struct FakeTask {
    task: RemoteTask,
    archived: bool,
    /// Still exists but falls outside the active-set filter
    filtered: bool,
}

#[derive(Default)]
struct RemoteState {
    tasks: Vec<FakeTask>,
    calls: Vec<String>,
    fail_ops: HashSet<String>,
    fail_lookups: HashSet<RemoteId>,
    fail_list: bool,
    next_id: u64,
}

impl RemoteState {
    fn find(&mut self, id: &RemoteId) -> Result<&mut FakeTask> {
        self.tasks
            .iter_mut()
            .find(|t| t.task.id == *id)
            .ok_or_else(|| anyhow!("object_not_found: {id}"))
    }

    fn begin(&mut self, op: &str, id: Option<&RemoteId>) -> Result<()> {
        let call = match id {
            Some(id) => format!("{op} {id}"),
            None => op.to_string(),
        };
        self.calls.push(call);
        if self.fail_ops.contains(op) {
            bail!("injected {op} failure");
        }
        Ok(())
    }
}

/// Remote task source holding tasks in memory
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<RemoteState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap()
    }

    pub fn id(n: u64) -> RemoteId {
        RemoteId::new(format!("{n:032x}")).unwrap()
    }

    /// Adds an active task with status New
    pub fn add_task(&self, title: &str, due: Option<DueDate>) -> RemoteId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = Self::id(state.next_id);
        state.tasks.push(FakeTask {
            task: RemoteTask {
                url: RemoteTask::default_url(&id),
                id: id.clone(),
                title: title.to_string(),
                due,
                status: TaskStatus::New,
                last_modified: None,
                customer: None,
            },
            archived: false,
            filtered: false,
        });
        id
    }

    pub fn task(&self, id: &RemoteId) -> Option<RemoteTask> {
        self.lock()
            .tasks
            .iter()
            .find(|t| t.task.id == *id)
            .map(|t| t.task.clone())
    }

    pub fn status(&self, id: &RemoteId) -> Option<TaskStatus> {
        self.task(id).map(|t| t.status)
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn set_status(&self, id: &RemoteId, status: TaskStatus) {
        self.lock().find(id).unwrap().task.status = status;
    }

    pub fn set_due(&self, id: &RemoteId, due: Option<DueDate>) {
        self.lock().find(id).unwrap().task.due = due;
    }

    pub fn set_modified(&self, id: &RemoteId, at: DateTime<Utc>) {
        self.lock().find(id).unwrap().task.last_modified = Some(at);
    }

    pub fn set_customer(&self, id: &RemoteId, customer: &str) {
        self.lock().find(id).unwrap().task.customer = Some(customer.to_string());
    }

    pub fn archive(&self, id: &RemoteId) {
        self.lock().find(id).unwrap().archived = true;
    }

    pub fn filter_out(&self, id: &RemoteId) {
        self.lock().find(id).unwrap().filtered = true;
    }

    pub fn fail_on(&self, op: &str) {
        self.lock().fail_ops.insert(op.to_string());
    }

    pub fn fail_lookup(&self, id: &RemoteId) {
        self.lock().fail_lookups.insert(id.clone());
    }

    pub fn fail_list(&self) {
        self.lock().fail_list = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn writes(&self) -> usize {
        self.lock().calls.iter().filter(|c| is_write(c)).count()
    }
}

#[async_trait::async_trait]
impl IRemoteTaskSource for FakeRemote {
    async fn list_active_tasks(&self) -> Result<Vec<RemoteTask>> {
        let mut state = self.lock();
        state.calls.push("list".to_string());
        if state.fail_list {
            bail!("database unreachable");
        }
        Ok(state
            .tasks
            .iter()
            .filter(|t| !t.archived && !t.filtered && !t.task.status.is_terminal())
            .map(|t| t.task.clone())
            .collect())
    }

    async fn get_task_status(&self, id: &RemoteId) -> Result<StatusLookup> {
        let mut state = self.lock();
        state.calls.push(format!("status {id}"));
        if state.fail_lookups.contains(id) {
            bail!("lookup failed for {id}");
        }
        Ok(match state.tasks.iter().find(|t| t.task.id == *id) {
            Some(t) if !t.archived => StatusLookup::Found(t.task.status.clone()),
            _ => StatusLookup::NotFound,
        })
    }

    async fn create_task(&self, task: &NewRemoteTask) -> Result<RemoteTask> {
        let mut state = self.lock();
        state.begin("create", None)?;
        state.next_id += 1;
        let id = Self::id(0xc0ffee_0000 + state.next_id);
        let created = RemoteTask {
            url: RemoteTask::default_url(&id),
            id,
            title: task.title.clone(),
            due: task.due,
            status: TaskStatus::New,
            last_modified: Some(Utc::now()),
            customer: None,
        };
        state.tasks.push(FakeTask {
            task: created.clone(),
            archived: false,
            filtered: false,
        });
        Ok(created)
    }

    async fn update_title(&self, id: &RemoteId, title: &str) -> Result<()> {
        let mut state = self.lock();
        state.begin("title", Some(id))?;
        let task = &mut state.find(id)?.task;
        task.title = title.to_string();
        task.last_modified = Some(Utc::now());
        Ok(())
    }

    async fn update_due_date(&self, id: &RemoteId, due: Option<NaiveDate>) -> Result<()> {
        let mut state = self.lock();
        state.begin("due", Some(id))?;
        let task = &mut state.find(id)?.task;
        task.due = due.map(DueDate::on);
        task.last_modified = Some(Utc::now());
        Ok(())
    }

    async fn mark_done(&self, id: &RemoteId) -> Result<()> {
        let mut state = self.lock();
        state.begin("done", Some(id))?;
        state.find(id)?.task.status = TaskStatus::Done;
        Ok(())
    }

    async fn mark_canceled(&self, id: &RemoteId) -> Result<()> {
        let mut state = self.lock();
        state.begin("cancel", Some(id))?;
        state.find(id)?.task.status = TaskStatus::Canceled;
        Ok(())
    }
}

// ============================================================================
// Local
// ============================================================================

#[derive(Default)]
struct LocalState {
    items: Vec<LocalItem>,
    calls: Vec<String>,
    fail_ops: HashSet<String>,
    /// `None` makes the access request itself fail
    access: Option<bool>,
    next_id: u64,
}

impl LocalState {
    fn find(&mut self, id: &LocalId) -> Result<&mut LocalItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == *id)
            .ok_or_else(|| anyhow!("no reminder with id {id}"))
    }

    fn begin(&mut self, op: &str, id: Option<&LocalId>) -> Result<()> {
        let call = match id {
            Some(id) => format!("{op} {id}"),
            None => op.to_string(),
        };
        self.calls.push(call);
        if self.fail_ops.contains(op) {
            bail!("injected {op} failure");
        }
        Ok(())
    }
}

/// Local reminder list held in memory
pub struct FakeLocal {
    state: Mutex<LocalState>,
}

impl Default for FakeLocal {
    fn default() -> Self {
        Self {
            state: Mutex::new(LocalState {
                access: Some(true),
                ..LocalState::default()
            }),
        }
    }
}

impl FakeLocal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocalState> {
        self.state.lock().unwrap()
    }

    /// Adds an open item, optionally linked through `url`
    pub fn add_item(&self, title: &str, url: Option<String>) -> LocalId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = LocalId::new(format!("x-apple-reminder://{}", state.next_id)).unwrap();
        state.items.push(LocalItem {
            id: id.clone(),
            title: title.to_string(),
            due: None,
            due_unreadable: false,
            notes: None,
            url,
            completed: false,
            last_modified: None,
            tags: Vec::new(),
        });
        id
    }

    /// Adds an open item linked to `remote`
    pub fn add_linked(&self, title: &str, remote: &RemoteId) -> LocalId {
        self.add_item(title, Some(RemoteTask::default_url(remote)))
    }

    pub fn item(&self, id: &LocalId) -> Option<LocalItem> {
        self.lock().items.iter().find(|i| i.id == *id).cloned()
    }

    pub fn items(&self) -> Vec<LocalItem> {
        self.lock().items.clone()
    }

    pub fn edit(&self, id: &LocalId, f: impl FnOnce(&mut LocalItem)) {
        f(self.lock().find(id).unwrap());
    }

    /// Deletes an item as the user would, outside the engine
    pub fn remove(&self, id: &LocalId) {
        self.lock().items.retain(|i| i.id != *id);
    }

    pub fn set_access(&self, access: Option<bool>) {
        self.lock().access = access;
    }

    pub fn fail_on(&self, op: &str) {
        self.lock().fail_ops.insert(op.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn writes(&self) -> usize {
        self.lock().calls.iter().filter(|c| is_write(c)).count()
    }
}

#[async_trait::async_trait]
impl ILocalReminderStore for FakeLocal {
    async fn request_access(&self, _timeout: Duration) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push("access".to_string());
        state.access.ok_or_else(|| anyhow!("permission prompt timed out"))
    }

    async fn list_items(&self) -> Result<Vec<LocalItem>> {
        let mut state = self.lock();
        state.begin("list", None)?;
        Ok(state.items.clone())
    }

    async fn create_item(&self, item: &NewReminder) -> Result<LocalItem> {
        let mut state = self.lock();
        state.begin("create", None)?;
        state.next_id += 1;
        let created = LocalItem {
            id: LocalId::new(format!("x-apple-reminder://{}", state.next_id))?,
            title: item.title.clone(),
            due: item.due,
            due_unreadable: false,
            notes: item.notes.clone(),
            url: item.url.clone(),
            completed: false,
            last_modified: Some(Utc::now()),
            tags: item.tag.iter().cloned().collect(),
        };
        state.items.push(created.clone());
        Ok(created)
    }

    async fn update_item(&self, id: &LocalId, update: &ReminderUpdate) -> Result<()> {
        let mut state = self.lock();
        state.begin("update", Some(id))?;
        let item = state.find(id)?;
        if let Some(title) = &update.title {
            item.title = title.clone();
        }
        if update.clear_due {
            item.due = None;
        } else if let Some(due) = update.due {
            item.due = Some(due);
        }
        item.last_modified = Some(Utc::now());
        Ok(())
    }

    async fn complete_item(&self, id: &LocalId) -> Result<()> {
        let mut state = self.lock();
        state.begin("complete", Some(id))?;
        state.find(id)?.completed = true;
        Ok(())
    }

    async fn delete_item(&self, id: &LocalId) -> Result<()> {
        let mut state = self.lock();
        state.begin("delete", Some(id))?;
        state.find(id)?;
        state.items.retain(|i| i.id != *id);
        Ok(())
    }

    async fn get_item(&self, id: &LocalId) -> Result<Option<LocalItem>> {
        let mut state = self.lock();
        state.calls.push(format!("get {id}"));
        Ok(state.items.iter().find(|i| i.id == *id).cloned())
    }

    async fn set_url(&self, id: &LocalId, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.begin("set_url", Some(id))?;
        state.find(id)?.url = Some(url.to_string());
        Ok(())
    }
}

// ============================================================================
// Link store
// ============================================================================

/// Link store that keeps the last saved table in memory
#[derive(Default)]
pub struct FakeLinkStore {
    table: Mutex<LinkTable>,
    saves: AtomicUsize,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl FakeLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored table without counting a save
    pub fn seed(&self, table: LinkTable) {
        *self.table.lock().unwrap() = table;
    }

    pub fn table(&self) -> LinkTable {
        self.table.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_load(&self) {
        self.fail_load.store(true, Ordering::SeqCst);
    }

    pub fn fail_save(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ILinkStore for FakeLinkStore {
    async fn load(&self) -> Result<LinkTable> {
        if self.fail_load.load(Ordering::SeqCst) {
            bail!("state file unreadable");
        }
        Ok(self.table())
    }

    async fn save(&self, table: &LinkTable) -> Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            bail!("disk full");
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.table.lock().unwrap() = table.clone();
        Ok(())
    }
}
