//! Single-assignment completion cell for modal results
//!
//! A [`Settler`] and a [`ModalHandle`] are created together for every opened
//! modal. The registry keeps the settler; the caller awaits the handle.

use crate::modal::ModalId;
use crate::{trace_debug, trace_warn};

use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Create a linked settle/await pair for the modal `id`
pub(crate) fn channel(id: ModalId) -> (Settler, ModalHandle) {
    let (tx, rx) = oneshot::channel();
    let settler = Settler {
        id: id.clone(),
        slot: Arc::new(Mutex::new(Some(tx))),
    };
    (settler, ModalHandle { id, rx })
}

/// Settling side of a modal result. Clones share the same slot.
#[derive(Debug, Clone)]
pub(crate) struct Settler {
    id: ModalId,
    slot: Arc<Mutex<Option<oneshot::Sender<Value>>>>,
}

impl Settler {
    /// Deliver `value` to the awaiting handle.
    ///
    /// Only the first call takes effect; returns whether this call was it.
    pub(crate) fn settle(&self, value: Value) -> bool {
        let Some(tx) = self.slot.lock().take() else {
            return false;
        };
        if tx.send(value).is_err() {
            trace_debug!("Modal {} settled after its handle was dropped", self.id);
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_settled(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// Awaitable result of [`crate::ModalRegistry::open`]
///
/// Resolves to `Value::Null` when the modal was dismissed, or to the payload
/// passed to `close_modal_with_success`. If the registry side goes away
/// without settling, it also resolves to `Value::Null`.
#[derive(Debug)]
#[must_use = "a modal handle does nothing unless awaited"]
pub struct ModalHandle {
    id: ModalId,
    rx: oneshot::Receiver<Value>,
}

impl ModalHandle {
    /// Id of the modal this handle waits on
    pub fn id(&self) -> &ModalId {
        &self.id
    }
}

impl Future for ModalHandle {
    type Output = Value;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let id = &this.id;
        Pin::new(&mut this.rx).poll(cx).map(|result| {
            result.unwrap_or_else(|_| {
                trace_warn!("Modal {} went away without a result", id);
                Value::Null
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    #[tokio::test]
    async fn first_settle_wins() {
        let (settler, handle) = channel(ModalId::from("m1"));

        assert!(!settler.is_settled());
        assert!(settler.settle(json!({"ok": true})));
        assert!(!settler.settle(json!("late")));
        assert!(settler.is_settled());

        assert_eq!(handle.await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn clones_share_one_slot() {
        let (settler, handle) = channel(ModalId::from("m2"));
        let other = settler.clone();

        assert!(other.settle(Value::Null));
        assert!(!settler.settle(json!(1)));
        assert_eq!(handle.await, Value::Null);
    }

    #[test]
    fn handle_pending_until_settled() {
        let (settler, mut handle) = channel(ModalId::from("m3"));

        assert!((&mut handle).now_or_never().is_none());
        settler.settle(json!(42));
        assert_eq!((&mut handle).now_or_never(), Some(json!(42)));
    }

    #[tokio::test]
    async fn dropped_settler_resolves_to_null() {
        let (settler, handle) = channel(ModalId::from("m4"));
        assert_eq!(handle.id().as_str(), "m4");

        drop(settler);
        assert_eq!(handle.await, Value::Null);
    }

    #[test]
    fn settle_after_handle_dropped_is_quiet() {
        let (settler, handle) = channel(ModalId::from("m5"));
        drop(handle);

        assert!(settler.settle(json!("nobody listening")));
        assert!(settler.is_settled());
    }
}
