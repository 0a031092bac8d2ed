use std::{sync::Arc, time::Duration};

use config::Settings;
use keybind::{KeyEvent, Modifier};
use nebula_engine::{
    ConfirmOutcome, Engine, GateState, Outcome,
    commands::ids,
    test_support::{MemoryStore, RecordingBackend},
};
use nebula_protocol::{
    Action, AppContext, BackendMethod, ConfirmProps, ConfirmationModal, ModalSpec, PageRef,
};
use serde_json::json;
use tokio::time::sleep;

/// Engine over in-memory collaborators, starting at `ctx`.
fn engine_at(ctx: AppContext) -> (Engine, Arc<MemoryStore>, Arc<RecordingBackend>) {
    let store = Arc::new(MemoryStore::new(ctx));
    let backend = Arc::new(RecordingBackend::new());
    let engine = Engine::new(store.clone(), backend.clone(), Settings::default());
    (engine, store, backend)
}

/// Editor open on page `p1` (child of `root`) showing `doc`.
fn editor_ctx(doc: &str) -> AppContext {
    AppContext::at("/editor/abc/p1").with_page(PageRef::new("p1").with_parent("root"), doc)
}

fn ctrl(key: &str) -> KeyEvent {
    KeyEvent::new(key).with(Modifier::Ctrl)
}

#[tokio::test(start_paused = true)]
async fn ctrl_n_in_editor_shows_one_page_modal() {
    let (engine, store, _) = engine_at(editor_ctx(""));

    let outcome = engine.handle_key(&ctrl("n")).await;
    assert_eq!(outcome, Outcome::Ran(ids::ADD_PAGE));
    assert_eq!(store.shown_modals("page/create"), 1);
    assert_eq!(store.actions().len(), 1);

    let Some(ModalSpec::PageCreate(m)) = engine.modals().active() else {
        panic!("page modal mounted");
    };
    assert_eq!(m.id, "Create Page Keyboard");
    assert_eq!(m.parent_id.as_deref(), Some("root"));
    assert_eq!(m.insert_after_id.as_deref(), Some("p1"));
}

#[tokio::test(start_paused = true)]
async fn ctrl_n_outside_editor_is_blocked() {
    let (engine, store, backend) = engine_at(AppContext::at("/settings"));

    let outcome = engine.handle_key(&ctrl("n")).await;
    assert_eq!(outcome, Outcome::Blocked(ids::ADD_PAGE));
    assert!(store.actions().is_empty());
    assert!(backend.calls().is_empty());
    assert_eq!(engine.modals().active(), None);
}

#[tokio::test(start_paused = true)]
async fn guard_follows_route_changes() {
    let (engine, store, _) = engine_at(AppContext::at("/"));
    assert_eq!(
        engine.dispatch("ctrl+.").await,
        Outcome::Blocked(ids::TOGGLE_SIDEBAR)
    );
    store.set_route("/editor/abc");
    assert_eq!(engine.dispatch("ctrl+.").await, Outcome::Ran(ids::TOGGLE_SIDEBAR));
    assert_eq!(store.take_actions(), vec![Action::ToggleSidebar]);
}

#[tokio::test(start_paused = true)]
async fn sub_page_uses_current_page_as_parent() {
    let (engine, store, _) = engine_at(editor_ctx(""));
    let ev = KeyEvent::new("N").with(Modifier::Ctrl).with(Modifier::Shift);

    assert_eq!(engine.handle_key(&ev).await, Outcome::Ran(ids::ADD_SUB_PAGE));
    let actions = store.take_actions();
    let [Action::ShowModal(ModalSpec::PageCreate(m))] = actions.as_slice() else {
        panic!("one page modal, got {actions:?}");
    };
    assert_eq!(m.id, "Create Subpage Keyboard");
    assert_eq!(m.parent_id.as_deref(), Some("p1"));
    assert_eq!(m.insert_after_id, None);
}

#[tokio::test(start_paused = true)]
async fn sub_page_without_open_page_does_nothing() {
    let (engine, store, _) = engine_at(AppContext::at("/editor/abc"));
    assert_eq!(
        engine.dispatch("ctrl+shift+n").await,
        Outcome::Ran(ids::ADD_SUB_PAGE)
    );
    assert!(store.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn toggles_emit_one_action_per_press() {
    let (engine, store, backend) = engine_at(editor_ctx(""));

    for binding in ["ctrl+.", "ctrl+shift+d", "ctrl+/", "ctrl+shift+?"] {
        assert!(matches!(engine.dispatch(binding).await, Outcome::Ran(_)));
    }
    assert_eq!(
        store.take_actions(),
        vec![
            Action::ToggleSidebar,
            Action::ToggleNoDistractionsMode,
            Action::TogglePreviewOnly,
            Action::ToggleSplitMode,
        ]
    );

    // Toggling twice emits twice; the store owns the flag.
    engine.dispatch("ctrl+.").await;
    engine.dispatch("ctrl+.").await;
    assert_eq!(
        store.take_actions(),
        vec![Action::ToggleSidebar, Action::ToggleSidebar]
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn split_mode_binding_from_raw_event() {
    let (engine, store, _) = engine_at(editor_ctx(""));
    let ev = KeyEvent::new("?").with(Modifier::Shift).with(Modifier::Ctrl);
    assert_eq!(
        engine.handle_key(&ev).await,
        Outcome::Ran(ids::TOGGLE_SPLIT_MODE)
    );
    assert_eq!(store.actions(), vec![Action::ToggleSplitMode]);
}

#[tokio::test(start_paused = true)]
async fn bare_modifier_and_unbound_keys_are_ignored() {
    let (engine, store, backend) = engine_at(editor_ctx(""));

    let bare = KeyEvent::new("Control").with(Modifier::Ctrl);
    assert_eq!(engine.handle_key(&bare).await, Outcome::NoBinding);
    assert_eq!(
        engine.handle_key(&ctrl("q")).await,
        Outcome::Unbound("ctrl+q".into())
    );
    assert_eq!(
        engine.handle_key(&KeyEvent::new("n")).await,
        Outcome::Unbound("n".into())
    );
    assert_eq!(
        engine.handle_key(&KeyEvent::new("n").with(Modifier::Alt).with(Modifier::Ctrl)).await,
        Outcome::Unbound("ctrl+alt+n".into())
    );
    assert_eq!(
        engine.execute("core:does-not-exist").await,
        Outcome::Unhandled("core:does-not-exist".into())
    );
    assert!(store.actions().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn save_updates_page_then_saves_notebook() {
    let (engine, store, backend) = engine_at(editor_ctx("# Hello"));

    let outcome = engine.handle_key(&ctrl("s")).await;
    assert_eq!(outcome, Outcome::Ran(ids::SAVE_CURRENT_NOTEBOOK));

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].method, BackendMethod::UpdatePage);
    assert_eq!(
        calls[0].args,
        json!({ "pageId": "p1", "newContent": "# Hello" })
    );
    assert_eq!(calls[1].method, BackendMethod::SaveNotebook);
    assert!(store.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn save_without_open_page_only_saves_notebook() {
    let (engine, _, backend) = engine_at(AppContext::at("/editor/abc"));
    assert_eq!(
        engine.dispatch("ctrl+s").await,
        Outcome::Ran(ids::SAVE_CURRENT_NOTEBOOK)
    );
    assert_eq!(backend.methods(), vec![BackendMethod::SaveNotebook]);
}

#[tokio::test(start_paused = true)]
async fn failed_page_update_aborts_save() {
    let (engine, _, backend) = engine_at(editor_ctx("text"));
    backend.fail_on(BackendMethod::UpdatePage);

    assert_eq!(
        engine.dispatch("ctrl+s").await,
        Outcome::Failed(ids::SAVE_CURRENT_NOTEBOOK)
    );
    assert_eq!(backend.methods(), vec![BackendMethod::UpdatePage]);

    // The engine keeps serving commands after a failure.
    backend.recover(BackendMethod::UpdatePage);
    assert_eq!(
        engine.dispatch("ctrl+s").await,
        Outcome::Ran(ids::SAVE_CURRENT_NOTEBOOK)
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_saves_never_interleave() {
    let (engine, _, backend) = engine_at(editor_ctx("body"));
    backend.set_latency(Duration::from_millis(100));

    let (a, b) = tokio::join!(engine.dispatch("ctrl+s"), engine.dispatch("ctrl+s"));
    assert_eq!(a, Outcome::Ran(ids::SAVE_CURRENT_NOTEBOOK));
    assert_eq!(b, Outcome::Ran(ids::SAVE_CURRENT_NOTEBOOK));

    let one = [
        "start:update_page",
        "end:update_page",
        "start:save_notebook",
        "end:save_notebook",
    ];
    let expected: Vec<String> = one.iter().chain(one.iter()).map(|s| s.to_string()).collect();
    assert_eq!(backend.journal(), expected);
}

#[tokio::test(start_paused = true)]
async fn input_channel_processes_keys_in_order() {
    let (engine, store, backend) = engine_at(editor_ctx("body"));
    backend.set_latency(Duration::from_millis(50));
    let (tx, handle) = engine.spawn_input(8);

    tx.send(ctrl("s")).await.expect("send");
    tx.send(ctrl("s")).await.expect("send");
    tx.send(ctrl(".")).await.expect("send");
    drop(tx);
    handle.await.expect("input task");

    assert_eq!(
        backend.methods(),
        vec![
            BackendMethod::UpdatePage,
            BackendMethod::SaveNotebook,
            BackendMethod::UpdatePage,
            BackendMethod::SaveNotebook,
        ]
    );
    let journal = backend.journal();
    for pair in journal.chunks(2) {
        assert_eq!(pair[0].replace("start:", ""), pair[1].replace("end:", ""));
    }
    assert_eq!(store.actions(), vec![Action::ToggleSidebar]);
}

#[tokio::test(start_paused = true)]
async fn permanent_delete_waits_for_countdown() {
    let (engine, store, backend) = engine_at(editor_ctx(""));
    assert_eq!(
        engine.execute(ids::REMOVE_PAGE_PERMANENT).await,
        Outcome::Ran(ids::REMOVE_PAGE_PERMANENT)
    );
    assert_eq!(store.shown_modals("confirmation"), 1);
    assert_eq!(engine.modals().countdown(), Some(5));
    assert_eq!(engine.modals().confirm_label().as_deref(), Some("Wait 5 (s)"));

    assert_eq!(
        engine.confirm().await,
        ConfirmOutcome::NotReady { remaining: 5 }
    );
    sleep(Duration::from_millis(3500)).await;
    assert_eq!(
        engine.confirm().await,
        ConfirmOutcome::NotReady { remaining: 2 }
    );
    assert!(backend.calls().is_empty());

    sleep(Duration::from_secs(2)).await;
    assert_eq!(engine.modals().gate_state(), Some(GateState::Ready));
    assert_eq!(engine.modals().countdown(), Some(-1));
    assert_eq!(
        engine.confirm().await,
        ConfirmOutcome::Confirmed(BackendMethod::DeletePagePermanent)
    );
    assert_eq!(
        backend.calls()[0].args,
        json!({ "pageId": "p1" }),
        "exact page id"
    );
    assert_eq!(engine.modals().active(), None);
    assert_eq!(store.actions().last(), Some(&Action::UnloadModal));
}

#[tokio::test(start_paused = true)]
async fn remove_page_moves_to_trash_only() {
    let (engine, _, backend) = engine_at(editor_ctx(""));
    engine.show_modal(ModalSpec::Confirmation(ConfirmationModal::remove_page(
        "page-42",
    )));
    assert!(engine.modals().can_confirm(), "warning level needs no wait");
    assert!(!engine.modals().is_ticking());

    assert_eq!(
        engine.confirm().await,
        ConfirmOutcome::Confirmed(BackendMethod::MovePageToTrash)
    );
    assert_eq!(backend.methods(), vec![BackendMethod::MovePageToTrash]);
    assert_eq!(backend.calls()[0].args, json!({ "pageId": "page-42" }));

    // Modal is gone; a second confirm does nothing.
    assert_eq!(engine.confirm().await, ConfirmOutcome::NoConfirmation);
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_has_no_side_effects_and_stops_ticking() {
    let (engine, store, backend) = engine_at(editor_ctx(""));
    engine.show_modal(ModalSpec::Confirmation(
        ConfirmationModal::remove_page_permanent("p1"),
    ));
    sleep(Duration::from_millis(1500)).await;
    assert!(engine.modals().is_ticking());

    assert!(engine.cancel());
    assert!(!engine.cancel(), "nothing left to cancel");
    assert!(!engine.modals().is_ticking());
    sleep(Duration::from_secs(10)).await;

    assert_eq!(engine.confirm().await, ConfirmOutcome::NoConfirmation);
    assert!(backend.calls().is_empty());
    let unloads = store
        .actions()
        .iter()
        .filter(|a| **a == Action::UnloadModal)
        .count();
    assert_eq!(unloads, 1);
}

#[tokio::test(start_paused = true)]
async fn mismatched_payload_is_a_no_op() {
    let (engine, _, backend) = engine_at(editor_ctx(""));
    let mut modal = ConfirmationModal::remove_page("p1");
    modal.props = ConfirmProps::RemovePagePermanent {
        page_id: "p1".into(),
    };
    engine.show_modal(ModalSpec::Confirmation(modal));

    assert_eq!(engine.confirm().await, ConfirmOutcome::Mismatch);
    assert!(backend.calls().is_empty());
    assert!(engine.modals().active().is_some(), "modal stays open");
}

#[tokio::test(start_paused = true)]
async fn unknown_confirmation_id_is_a_no_op() {
    let (engine, _, backend) = engine_at(editor_ctx(""));
    let mut modal = ConfirmationModal::remove_page("p1");
    modal.id = "emptyTrash".into();
    engine.show_modal(ModalSpec::Confirmation(modal));

    assert_eq!(engine.confirm().await, ConfirmOutcome::Mismatch);
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn backend_failure_keeps_confirmation_open() {
    let (engine, store, backend) = engine_at(editor_ctx(""));
    backend.fail_on(BackendMethod::MovePageToTrash);
    engine.show_modal(ModalSpec::Confirmation(ConfirmationModal::remove_page("p1")));

    assert_eq!(
        engine.confirm().await,
        ConfirmOutcome::Failed(BackendMethod::MovePageToTrash)
    );
    assert!(engine.modals().active().is_some());
    assert!(!store.actions().contains(&Action::UnloadModal));

    backend.recover(BackendMethod::MovePageToTrash);
    assert_eq!(
        engine.confirm().await,
        ConfirmOutcome::Confirmed(BackendMethod::MovePageToTrash)
    );
    assert_eq!(backend.calls().len(), 2);
    assert_eq!(engine.modals().active(), None);
}

#[tokio::test(start_paused = true)]
async fn cancel_is_refused_while_confirm_runs() {
    let (engine, store, backend) = engine_at(editor_ctx(""));
    backend.set_latency(Duration::from_millis(500));
    engine.show_modal(ModalSpec::Confirmation(ConfirmationModal::remove_page("p1")));

    let e = engine.clone();
    let confirming = tokio::spawn(async move { e.confirm().await });
    sleep(Duration::from_millis(100)).await;

    assert!(engine.modals().is_confirming());
    assert!(!engine.cancel(), "confirmation already accepted");
    assert!(engine.modals().active().is_some());

    assert_eq!(
        confirming.await.expect("confirm task"),
        ConfirmOutcome::Confirmed(BackendMethod::MovePageToTrash)
    );
    assert_eq!(backend.methods(), vec![BackendMethod::MovePageToTrash]);
    assert_eq!(engine.modals().active(), None);
    let unloads = store
        .actions()
        .iter()
        .filter(|a| **a == Action::UnloadModal)
        .count();
    assert_eq!(unloads, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_confirm_can_then_be_cancelled() {
    let (engine, store, backend) = engine_at(editor_ctx(""));
    backend.set_latency(Duration::from_millis(500));
    backend.fail_on(BackendMethod::MovePageToTrash);
    engine.show_modal(ModalSpec::Confirmation(ConfirmationModal::remove_page("p1")));

    let e = engine.clone();
    let confirming = tokio::spawn(async move { e.confirm().await });
    sleep(Duration::from_millis(100)).await;
    assert!(!engine.cancel());

    assert_eq!(
        confirming.await.expect("confirm task"),
        ConfirmOutcome::Failed(BackendMethod::MovePageToTrash)
    );
    assert!(!engine.modals().is_confirming());
    assert!(engine.modals().can_confirm(), "ready for a retry");
    assert!(engine.cancel());
    assert_eq!(engine.modals().active(), None);
    assert_eq!(store.actions().last(), Some(&Action::UnloadModal));
}

#[tokio::test(start_paused = true)]
async fn new_modal_replaces_pending_confirmation() {
    let (engine, store, backend) = engine_at(editor_ctx(""));
    engine.execute(ids::REMOVE_PAGE_PERMANENT).await;
    sleep(Duration::from_secs(2)).await;

    assert_eq!(engine.dispatch("ctrl+n").await, Outcome::Ran(ids::ADD_PAGE));
    assert_eq!(engine.modals().gate_state(), None);
    assert!(!engine.modals().is_ticking());
    sleep(Duration::from_secs(10)).await;

    assert_eq!(engine.confirm().await, ConfirmOutcome::NoConfirmation);
    assert!(backend.calls().is_empty());
    assert_eq!(store.shown_modals("confirmation"), 1);
    assert_eq!(store.shown_modals("page/create"), 1);
}
