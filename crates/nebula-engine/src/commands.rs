//! Command registry and the built-in command handlers.
//!
//! Every command pairs an id with a [`Guarded`] handler: the guard is checked
//! once, when the command runs, so handlers never re-implement context checks.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};

use config::Settings;
use futures::{FutureExt, future::BoxFuture};
use nebula_protocol::{
    Action, AppContext, BackendMethod, ConfirmationModal, ModalSpec, PageCreateModal,
    UpdatePageArgs,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, trace};

use crate::{
    Outcome, Result,
    deps::{Backend, Store},
    guard::Guard,
    modal::ModalHost,
};

/// Built-in command identifiers.
pub mod ids {
    /// Show or hide the sidebar.
    pub const TOGGLE_SIDEBAR: &str = "view:toggle-sidebar";
    /// Enter or leave the no-distractions layout.
    pub const TOGGLE_NO_DISTRACTIONS: &str = "view:toggle-no-distractions";
    /// Show only the rendered preview.
    pub const TOGGLE_PREVIEW_ONLY: &str = "view:toggle-preview-only";
    /// Toggle split editor panes.
    pub const TOGGLE_SPLIT_MODE: &str = "view:toggle-split-mode";
    /// Prompt for a page after the current one.
    pub const ADD_PAGE: &str = "core:add-page";
    /// Prompt for a child of the current page.
    pub const ADD_SUB_PAGE: &str = "core:add-sub-page";
    /// Persist the open page and the notebook.
    pub const SAVE_CURRENT_NOTEBOOK: &str = "core:save-current-notebook";
    /// Ask to move the current page to the trash.
    pub const REMOVE_PAGE: &str = "core:remove-page";
    /// Ask to delete the current page permanently.
    pub const REMOVE_PAGE_PERMANENT: &str = "core:remove-page-permanent";
}

/// Everything a handler may touch while it runs.
#[derive(Clone)]
pub struct Scope {
    /// Context snapshot taken when the command was triggered.
    ctx: AppContext,
    /// State store.
    store: Arc<dyn Store>,
    /// Persistence backend.
    backend: Arc<dyn Backend>,
    /// Modal owner.
    modals: ModalHost,
    /// Engine settings.
    settings: Arc<Settings>,
}

impl Scope {
    /// Assemble a scope.
    pub(crate) fn new(
        ctx: AppContext,
        store: Arc<dyn Store>,
        backend: Arc<dyn Backend>,
        modals: ModalHost,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            ctx,
            store,
            backend,
            modals,
            settings,
        }
    }

    /// Context snapshot.
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Emit a store action.
    pub fn emit(&self, action: Action) {
        trace!(?action, "emit");
        self.store.dispatch(action);
    }

    /// Mount a modal and tell the store to show it.
    pub fn show_modal(&self, spec: ModalSpec) {
        mount(&self.modals, self.store.as_ref(), spec);
    }

    /// Invoke a backend method with serializable arguments.
    pub async fn invoke<A>(&self, method: BackendMethod, args: &A) -> Result<Value>
    where
        A: Serialize + Sync + ?Sized,
    {
        call(self.backend.as_ref(), method, args).await
    }
}

/// Mount `spec` in the modal host and emit the matching `ShowModal` action.
pub(crate) fn mount(modals: &ModalHost, store: &dyn Store, spec: ModalSpec) {
    debug!(kind = spec.kind(), id = %spec.id(), "show_modal");
    modals.show(spec.clone());
    store.dispatch(Action::ShowModal(spec));
}

/// Encode `args` and invoke `method` on `backend`.
pub(crate) async fn call<A>(backend: &dyn Backend, method: BackendMethod, args: &A) -> Result<Value>
where
    A: Serialize + Sync + ?Sized,
{
    let args = serde_json::to_value(args)?;
    debug!(method = method.as_str(), "invoke");
    backend.invoke(method, args).await
}

/// Asynchronous handler: owns its scope and resolves when persistence is done.
pub type AsyncHandler = fn(Scope) -> BoxFuture<'static, Result<()>>;

/// Handler body of a command.
#[derive(Clone, Copy)]
pub enum Handler {
    /// Runs to completion immediately.
    Sync(fn(&Scope)),
    /// Awaits the backend.
    Async(AsyncHandler),
}

/// A handler bound to the guard that must hold for it to run.
#[derive(Clone, Copy)]
pub struct Guarded {
    /// Context predicate.
    guard: Guard,
    /// Body run when the guard holds.
    handler: Handler,
}

/// Wrap `handler` so that it only runs while `guard` holds.
pub fn guarded(guard: Guard, handler: Handler) -> Guarded {
    Guarded { guard, handler }
}

/// A registered command.
#[derive(Clone, Copy)]
pub struct Command {
    /// Identifier, e.g. `core:add-page`.
    id: &'static str,
    /// Human-readable title.
    title: &'static str,
    /// Guarded body.
    body: Guarded,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("guard", &self.body.guard)
            .finish()
    }
}

impl Command {
    /// A command with a guarded body.
    pub fn new(id: &'static str, title: &'static str, body: Guarded) -> Self {
        Self { id, title, body }
    }

    /// Identifier.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Run the command against `scope`.
    ///
    /// Returns `Blocked` without side effects when the guard fails. Errors from
    /// asynchronous handlers are logged and reported as `Failed`; they never
    /// propagate to the caller.
    pub async fn run(&self, scope: Scope) -> Outcome {
        if !self.body.guard.allows(&scope.ctx, &scope.settings) {
            trace!(
                command = self.id,
                guard = self.body.guard.name(),
                route = %scope.ctx.route,
                "command_blocked"
            );
            return Outcome::Blocked(self.id);
        }
        match self.body.handler {
            Handler::Sync(f) => {
                f(&scope);
                debug!(command = self.id, "command_ran");
                Outcome::Ran(self.id)
            }
            Handler::Async(f) => match f(scope).await {
                Ok(()) => {
                    debug!(command = self.id, "command_ran");
                    Outcome::Ran(self.id)
                }
                Err(e) => {
                    error!(command = self.id, error = %e, "command_failed");
                    Outcome::Failed(self.id)
                }
            },
        }
    }
}

/// Process-wide registry of the built-in commands, built on first use.
static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();

/// Immutable mapping from command id to command.
#[derive(Debug)]
pub struct CommandRegistry {
    /// Id → command.
    commands: HashMap<&'static str, Command>,
}

impl CommandRegistry {
    /// The built-in registry.
    pub fn global() -> &'static Self {
        REGISTRY.get_or_init(|| Self::from_commands(builtin_commands()))
    }

    /// Build a registry; later duplicates replace earlier ones.
    fn from_commands(list: Vec<Command>) -> Self {
        Self {
            commands: list.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Command registered under `id`. Unknown ids are a normal `None`.
    pub fn lookup(&self, id: &str) -> Option<&Command> {
        self.commands.get(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.commands.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// The built-in commands.
fn builtin_commands() -> Vec<Command> {
    let editor = |h| guarded(Guard::EDITOR, h);
    vec![
        Command::new(
            ids::TOGGLE_SIDEBAR,
            "Toggle Sidebar",
            editor(Handler::Sync(toggle_sidebar)),
        ),
        Command::new(
            ids::TOGGLE_NO_DISTRACTIONS,
            "Toggle No Distractions Mode",
            editor(Handler::Sync(toggle_no_distractions)),
        ),
        Command::new(
            ids::TOGGLE_PREVIEW_ONLY,
            "Toggle Preview Only",
            editor(Handler::Sync(toggle_preview_only)),
        ),
        Command::new(
            ids::TOGGLE_SPLIT_MODE,
            "Toggle Split Mode",
            editor(Handler::Sync(toggle_split_mode)),
        ),
        Command::new(ids::ADD_PAGE, "Add Page", editor(Handler::Sync(add_page))),
        Command::new(
            ids::ADD_SUB_PAGE,
            "Add Sub-Page",
            editor(Handler::Sync(add_sub_page)),
        ),
        Command::new(
            ids::SAVE_CURRENT_NOTEBOOK,
            "Save Notebook",
            editor(Handler::Async(save_current_notebook)),
        ),
        Command::new(
            ids::REMOVE_PAGE,
            "Move Page to Trash",
            editor(Handler::Sync(remove_page)),
        ),
        Command::new(
            ids::REMOVE_PAGE_PERMANENT,
            "Delete Page Permanently",
            editor(Handler::Sync(remove_page_permanent)),
        ),
    ]
}

// ---- Handlers ----

fn toggle_sidebar(scope: &Scope) {
    scope.emit(Action::ToggleSidebar);
}

fn toggle_no_distractions(scope: &Scope) {
    scope.emit(Action::ToggleNoDistractionsMode);
}

fn toggle_preview_only(scope: &Scope) {
    scope.emit(Action::TogglePreviewOnly);
}

fn toggle_split_mode(scope: &Scope) {
    scope.emit(Action::ToggleSplitMode);
}

/// New page as the next sibling of the current page (top level when none is open).
fn add_page(scope: &Scope) {
    let page = scope.context().current_page.as_ref();
    scope.show_modal(ModalSpec::PageCreate(PageCreateModal {
        id: "Create Page Keyboard".to_string(),
        parent_id: page.and_then(|p| p.parent_id.clone()),
        insert_after_id: page.map(|p| p.id.clone()),
        label: "Create Page".to_string(),
    }));
}

/// New child of the current page; nothing happens when no page is open.
fn add_sub_page(scope: &Scope) {
    let Some(page) = scope.context().current_page.as_ref() else {
        trace!("add_sub_page: no current page");
        return;
    };
    scope.show_modal(ModalSpec::PageCreate(PageCreateModal {
        id: "Create Subpage Keyboard".to_string(),
        parent_id: Some(page.id.clone()),
        insert_after_id: None,
        label: "Create Sub-Page".to_string(),
    }));
}

fn remove_page(scope: &Scope) {
    if let Some(page) = scope.context().current_page.as_ref() {
        scope.show_modal(ModalSpec::Confirmation(ConfirmationModal::remove_page(
            page.id.as_str(),
        )));
    }
}

fn remove_page_permanent(scope: &Scope) {
    if let Some(page) = scope.context().current_page.as_ref() {
        scope.show_modal(ModalSpec::Confirmation(
            ConfirmationModal::remove_page_permanent(page.id.as_str()),
        ));
    }
}

/// Write the open document into its page, then save the notebook.
///
/// A failed page update aborts before the notebook save.
fn save_current_notebook(scope: Scope) -> BoxFuture<'static, Result<()>> {
    async move {
        if let Some(page) = scope.context().current_page.as_ref() {
            let args = UpdatePageArgs {
                page_id: page.id.clone(),
                new_content: scope.context().current_doc.clone(),
            };
            scope.invoke(BackendMethod::UpdatePage, &args).await?;
        }
        let res = scope.invoke(BackendMethod::SaveNotebook, &json!({})).await?;
        info!(response = %res, "notebook_saved");
        Ok(())
    }
    .boxed()
}
