// pizza-client/src/orders/queue.rs
// Employee processing queue - pending orders and the assign action

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use shared::{AssignmentResult, Order, OrderFilter, ProcessOrderRequest};

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult, ProcessingError};
use crate::notify::Notification;
use crate::session::SessionStore;

pub const QUEUE_FAILED: &str = "Failed to fetch orders.";

/// Successful assignment, formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    /// Server snapshot after assignment (normally `PROCESSING`)
    pub order: Order,
    /// e.g. `12.50 km`
    pub distance: String,
    /// e.g. `0.75 h`
    pub time: String,
}

impl From<AssignmentResult> for AssignmentOutcome {
    fn from(result: AssignmentResult) -> Self {
        Self {
            distance: result.distance_label(),
            time: result.time_label(),
            order: result.order,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    /// Bumped by every refresh and every replaced snapshot
    ticket: u64,
    orders: Vec<Order>,
    error: Option<String>,
}

impl QueueState {
    fn next_ticket(&mut self) -> u64 {
        self.ticket += 1;
        self.ticket
    }
}

/// Marks an order id as in flight until dropped
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<i64>>,
    order_id: i64,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<i64>>, order_id: i64) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order_id);
        inserted.then_some(Self { set, order_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.order_id);
    }
}

/// Pending orders as seen by an employee
///
/// All methods take `&self`; at most one `process` call per order id is
/// outstanding at any time.
pub struct ProcessQueue {
    backend: Arc<dyn Backend>,
    session: SessionStore,
    state: Mutex<QueueState>,
    in_flight: Mutex<HashSet<i64>>,
}

impl ProcessQueue {
    pub fn new(backend: Arc<dyn Backend>, session: SessionStore) -> Self {
        Self {
            backend,
            session,
            state: Mutex::new(QueueState::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `GET /orders?status=NEW`, in server order
    pub async fn list_pending(&self) -> ClientResult<Vec<Order>> {
        self.backend.list_orders(&OrderFilter::pending()).await
    }

    /// Reload the queue; on failure the previous list stays and an error is set
    ///
    /// A response is dropped if another refresh started, or a snapshot was
    /// replaced by [`Self::process`], while it was outstanding.
    pub async fn refresh(&self) -> ClientResult<()> {
        let ticket = self.state().next_ticket();
        let result = self.list_pending().await;

        let mut state = self.state();
        if state.ticket != ticket {
            tracing::debug!(ticket, current = state.ticket, "Discarding stale order list");
            return result.map(|_| ());
        }
        match result {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "Pending orders loaded");
                state.orders = orders;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch pending orders");
                state.error = Some(QUEUE_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Current snapshot list
    pub fn orders(&self) -> Vec<Order> {
        self.state().orders.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Whether a `process` call for this order is outstanding
    pub fn is_processing(&self, order_id: i64) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&order_id)
    }

    /// Assign the order to the current user and trigger the distance/time
    /// calculation
    ///
    /// On success the local snapshot is replaced (the order stays in the
    /// list). On failure nothing local changes and no retry is made.
    pub async fn process(&self, order_id: i64) -> ClientResult<AssignmentOutcome> {
        let employee_id = self
            .session
            .read()
            .user_id()
            .ok_or(ClientError::NotAuthenticated)?;

        let local_status = self
            .state()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status);
        if let Some(status) = local_status.filter(|s| !s.is_assignable()) {
            return Err(ProcessingError::NotAssignable { order_id, status }.into());
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, order_id) else {
            tracing::debug!(order_id, "Ignoring duplicate process request");
            return Err(ProcessingError::AlreadyInFlight(order_id).into());
        };

        let request = ProcessOrderRequest { employee_id };
        let result = match self.backend.process_order(order_id, &request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(order_id, employee_id, error = %e, "Order assignment failed");
                return Err(ProcessingError::Backend {
                    order_id,
                    source: Box::new(e),
                }
                .into());
            }
        };

        let outcome = AssignmentOutcome::from(result);
        {
            let mut state = self.state();
            state.next_ticket();
            if let Some(slot) = state.orders.iter_mut().find(|o| o.id == order_id) {
                *slot = outcome.order.clone();
            }
        }
        tracing::info!(
            order_id,
            employee_id,
            status = %outcome.order.status,
            distance = %outcome.distance,
            time = %outcome.time,
            "Order assigned"
        );
        Ok(outcome)
    }

    /// [`Self::process`] folded into the toast the user sees
    pub async fn process_with_notice(
        &self,
        order_id: i64,
    ) -> (Notification, Option<AssignmentOutcome>) {
        match self.process(order_id).await {
            Ok(outcome) => (Notification::order_processing(order_id), Some(outcome)),
            Err(e) => (Notification::processing_failed(&e), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::PROCESSING_FAILED;
    use crate::session::MemorySessionStorage;
    use crate::testing::{FakeBackend, order};
    use http::StatusCode;
    use shared::{OrderStatus, Role};

    fn queue(fake: &Arc<FakeBackend>) -> ProcessQueue {
        let session = SessionStore::restore(MemorySessionStorage::new()).unwrap();
        session.set_credentials("t", Role::Employee, 7).unwrap();
        ProcessQueue::new(fake.clone(), session)
    }

    #[tokio::test]
    async fn test_refresh_keeps_server_order() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![
            order(5, OrderStatus::New, 1),
            order(2, OrderStatus::Processing, 1),
            order(3, OrderStatus::New, 2),
        ]);
        let queue = queue(&fake);
        queue.refresh().await.unwrap();

        let ids: Vec<i64> = queue.orders().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![5, 3]);
        assert_eq!(fake.last_payload("list_orders").unwrap()["status"], "NEW");
    }

    #[tokio::test]
    async fn test_process_formats_measures_and_replaces_snapshot() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(41, OrderStatus::New, 1), order(42, OrderStatus::New, 1)]);
        fake.set_assignment(12.5, 0.75);
        let queue = queue(&fake);
        queue.refresh().await.unwrap();

        let outcome = queue.process(42).await.unwrap();
        assert_eq!(outcome.distance, "12.50 km");
        assert_eq!(outcome.time, "0.75 h");
        assert_eq!(outcome.order.status, OrderStatus::Processing);

        let sent = fake.last_payload("process_order").unwrap();
        assert_eq!(sent["employeeId"], 7);

        let orders = queue.orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].status, OrderStatus::Processing);
        assert!(!queue.is_processing(42));
    }

    #[tokio::test]
    async fn test_double_click_sends_one_request() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(42, OrderStatus::New, 1)]);
        let gate = fake.hold("process_order");
        let queue = queue(&fake);
        queue.refresh().await.unwrap();

        let (first, second) = tokio::join!(queue.process(42), async {
            while !queue.is_processing(42) {
                tokio::task::yield_now().await;
            }
            let second = queue.process(42).await;
            gate.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(ClientError::Processing(ProcessingError::AlreadyInFlight(42)))
        ));
        assert_eq!(fake.calls("process_order"), 1);
        assert!(!queue.is_processing(42));
    }

    #[tokio::test]
    async fn test_list_answered_before_assignment_is_discarded() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(42, OrderStatus::New, 1)]);
        let queue = queue(&fake);
        queue.refresh().await.unwrap();

        let hold = fake.hold("list_orders");
        let (refreshed, processed) = tokio::join!(queue.refresh(), async {
            while fake.calls("list_orders") < 2 {
                tokio::task::yield_now().await;
            }
            let processed = queue.process(42).await;
            hold.notify_one();
            processed
        });

        assert!(refreshed.is_ok());
        assert!(processed.is_ok());
        assert_eq!(queue.orders()[0].status, OrderStatus::Processing);
        assert!(matches!(
            queue.process(42).await,
            Err(ClientError::Processing(ProcessingError::NotAssignable { order_id: 42, .. }))
        ));
        assert_eq!(fake.calls("process_order"), 1);
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_keep_latest() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(42, OrderStatus::New, 1)]);
        let queue = queue(&fake);

        let hold = fake.hold("list_orders");
        let (first, second) = tokio::join!(queue.refresh(), async {
            while fake.calls("list_orders") < 1 {
                tokio::task::yield_now().await;
            }
            fake.set_orders(vec![
                order(42, OrderStatus::New, 1),
                order(43, OrderStatus::New, 2),
            ]);
            let second = queue.refresh();
            tokio::pin!(second);
            // Let the second request reach the backend, then release both
            while fake.calls("list_orders") < 2 {
                tokio::select! {
                    biased;
                    _ = &mut second => unreachable!("held call answered early"),
                    _ = tokio::task::yield_now() => {}
                }
            }
            hold.notify_waiters();
            second.await
        });

        assert!(first.is_ok());
        assert!(second.is_ok());
        let ids: Vec<i64> = queue.orders().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![42, 43]);
    }

    #[tokio::test]
    async fn test_failure_leaves_list_untouched() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(42, OrderStatus::New, 1)]);
        let queue = queue(&fake);
        queue.refresh().await.unwrap();
        fake.fail("process_order", StatusCode::INTERNAL_SERVER_ERROR, None);

        let (notification, outcome) = queue.process_with_notice(42).await;
        assert!(outcome.is_none());
        assert_eq!(notification.text, PROCESSING_FAILED);
        assert_eq!(queue.orders()[0].status, OrderStatus::New);
        assert!(!queue.is_processing(42));
        assert_eq!(fake.calls("process_order"), 1);
    }

    #[tokio::test]
    async fn test_processed_order_is_rejected_locally() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(42, OrderStatus::New, 1)]);
        let queue = queue(&fake);
        queue.refresh().await.unwrap();
        queue.process(42).await.unwrap();

        let err = queue.process(42).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Processing(ProcessingError::NotAssignable {
                order_id: 42,
                status: OrderStatus::Processing
            })
        ));
        assert_eq!(fake.calls("process_order"), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_inline_error() {
        let fake = Arc::new(FakeBackend::new());
        fake.set_orders(vec![order(42, OrderStatus::New, 1)]);
        let queue = queue(&fake);
        queue.refresh().await.unwrap();

        fake.fail("list_orders", StatusCode::SERVICE_UNAVAILABLE, None);
        assert!(queue.refresh().await.is_err());
        assert_eq!(queue.error().as_deref(), Some(QUEUE_FAILED));
        assert_eq!(queue.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_process_requires_session() {
        let fake = Arc::new(FakeBackend::new());
        let session = SessionStore::restore(MemorySessionStorage::new()).unwrap();
        let queue = ProcessQueue::new(fake.clone(), session);
        assert!(matches!(
            queue.process(1).await,
            Err(ClientError::NotAuthenticated)
        ));
        assert_eq!(fake.calls("process_order"), 0);
    }
}
