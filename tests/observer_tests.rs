use modal_registry::{ModalEvent, SizeHint};
use serde_json::json;

use test_utils::{content, test_registry};

#[tokio::test(start_paused = true)]
async fn test_snapshot_follows_lifecycle() {
    let registry = test_registry();
    let mut watcher = registry.subscribe();
    assert!(watcher.borrow_and_update().is_empty());

    let handle = registry.open(content("Watched"), SizeHint::Xl);
    assert!(watcher.has_changed().expect("registry alive"));
    {
        let snapshot = watcher.borrow_and_update();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, *handle.id());
        assert!(snapshot[0].visible);
        assert_eq!(snapshot[0].size_hint, SizeHint::Xl);
    }

    registry.close_modal(handle.id());
    {
        let snapshot = watcher.borrow_and_update();
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot[0].visible);
    }

    watcher.changed().await.expect("removal published");
    assert!(watcher.borrow_and_update().is_empty());
    assert_eq!(handle.await, serde_json::Value::Null);
}

#[tokio::test(start_paused = true)]
async fn test_events_describe_structural_changes() {
    let registry = test_registry();
    let mut events = registry.events();

    let handle = registry.open_default(content("Evented"));
    let id = handle.id().clone();
    registry.close_modal_with_success(&id, json!("done"));
    assert_eq!(handle.await, json!("done"));

    assert_eq!(events.recv().await.ok(), Some(ModalEvent::Opened(id.clone())));
    assert_eq!(events.recv().await.ok(), Some(ModalEvent::Closing(id.clone())));
    assert_eq!(events.recv().await.ok(), Some(ModalEvent::Removed(id)));
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_matches_modals_accessor() {
    let registry = test_registry();
    let watcher = registry.subscribe();

    let _a = registry.open_default(content("A"));
    let _b = registry.open_default(content("B"));

    let from_watch = watcher.borrow().clone();
    assert_eq!(from_watch, registry.modals());
    let components: Vec<_> = from_watch
        .iter()
        .map(|view| view.content.component.as_str())
        .collect();
    assert_eq!(components, ["A", "B"]);
}
