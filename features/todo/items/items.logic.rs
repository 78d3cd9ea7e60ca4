//! Todo items kept in process memory.
//!
//! Every mutation publishes a lifecycle event carrying the affected item.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use trellis_core::handler::{HandlerError, HandlerRequest, HandlerResult, Reply};
use trellis_core::platform::events;
use trellis_core::platform::logger::{self, Logger};

const LOG: Logger = logger::scoped("todo", "items");

#[derive(Debug, Clone, Serialize)]
struct Todo {
    id: u64,
    title: String,
    done: bool,
}

#[derive(Deserialize)]
struct NewTodo {
    title: String,
}

#[derive(Deserialize)]
struct TodoPatch {
    title: Option<String>,
    done: Option<bool>,
}

struct Store {
    next_id: u64,
    items: Vec<Todo>,
}

static STORE: Mutex<Store> = Mutex::new(Store {
    next_id: 1,
    items: Vec::new(),
});

fn todo_id(req: &HandlerRequest) -> Result<u64, HandlerError> {
    let raw = req.require_param("id")?;
    raw.parse()
        .map_err(|_| HandlerError::BadRequest(format!("invalid todo id `{}`", raw)))
}

fn title(raw: &str) -> Result<String, HandlerError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(HandlerError::BadRequest("title must not be empty".into()));
    }
    Ok(title.to_string())
}

fn not_found(id: u64) -> HandlerError {
    HandlerError::NotFound(format!("todo {} not found", id))
}

/// All todos in creation order.
pub async fn list(_req: HandlerRequest) -> HandlerResult {
    let store = STORE.lock();
    Ok(Reply::json(json!(store.items)))
}

/// Creates a todo from `{"title": ..}`.
pub async fn create(req: HandlerRequest) -> HandlerResult {
    let input: NewTodo = req.json()?;
    let title = title(&input.title)?;

    let todo = {
        let mut store = STORE.lock();
        let todo = Todo {
            id: store.next_id,
            title,
            done: false,
        };
        store.next_id += 1;
        store.items.push(todo.clone());
        todo
    };

    LOG.info(&format!("created todo {}", todo.id));
    events::bus().emit("todo.created", json!(todo));
    Ok(Reply::created(json!(todo)))
}

/// One todo by id.
pub async fn show(req: HandlerRequest) -> HandlerResult {
    let id = todo_id(&req)?;
    let store = STORE.lock();
    let todo = store
        .items
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| not_found(id))?;
    Ok(Reply::json(json!(todo)))
}

/// Applies `{"title"?: .., "done"?: ..}` to a todo.
pub async fn update(req: HandlerRequest) -> HandlerResult {
    let id = todo_id(&req)?;
    let patch: TodoPatch = req.json()?;
    let new_title = patch.title.as_deref().map(title).transpose()?;

    let todo = {
        let mut store = STORE.lock();
        let todo = store
            .items
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        if let Some(title) = new_title {
            todo.title = title;
        }
        if let Some(done) = patch.done {
            todo.done = done;
        }
        todo.clone()
    };

    events::bus().emit("todo.updated", json!(todo));
    Ok(Reply::json(json!(todo)))
}

/// Deletes a todo.
pub async fn remove(req: HandlerRequest) -> HandlerResult {
    let id = todo_id(&req)?;

    let removed = {
        let mut store = STORE.lock();
        let index = store
            .items
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        store.items.remove(index)
    };

    LOG.info(&format!("deleted todo {}", removed.id));
    events::bus().emit("todo.deleted", json!(removed));
    Ok(Reply::empty())
}
