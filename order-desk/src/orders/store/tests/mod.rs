use super::*;
use crate::orders::customers::{Customer, DirectoryError, DirectoryResult, InMemoryCustomerDirectory};
use crate::orders::storage::{StorageError, StorageResult};
use shared::order::{DeliveryMethod, OrderItemInput};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn create_test_store() -> OrderStore {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrderStore::new(storage)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    today().and_hms_opt(hour, minute, 0).unwrap()
}

fn new_order(customer: &str, items: Vec<OrderItemInput>) -> NewOrder {
    NewOrder {
        customer: customer.to_string(),
        phone: "090-1234-5678".to_string(),
        items,
        date: today(),
        pickup_time: "17:00".to_string(),
        delivery_method: DeliveryMethod::Pickup,
        notes: None,
    }
}

fn single_item_order(customer: &str) -> NewOrder {
    new_order(customer, vec![OrderItemInput::grams("Pork loin", 300)])
}

fn two_item_order(customer: &str) -> NewOrder {
    new_order(
        customer,
        vec![
            OrderItemInput::grams("Beef chuck", 500).with_cut("cubes"),
            OrderItemInput::grams("Chicken thigh", 800).with_part("momo"),
        ],
    )
}

fn item_ids(store: &OrderStore, order_id: &str) -> Vec<String> {
    store
        .get_order(order_id)
        .unwrap()
        .items
        .iter()
        .map(|item| item.id.clone())
        .collect()
}

fn drain(rx: &mut broadcast::Receiver<OrderEvent>) -> Vec<OrderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ========================================================================
// Helper: persistence that counts saves and can be made to fail
// ========================================================================

#[derive(Clone)]
struct RecordingPersistence {
    inner: OrderStorage,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl RecordingPersistence {
    fn new() -> Self {
        Self {
            inner: OrderStorage::open_in_memory().unwrap(),
            saves: Arc::new(AtomicUsize::new(0)),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }
}

impl OrderPersistence for RecordingPersistence {
    fn load(&self) -> StorageResult<PersistedOrders> {
        self.inner.load()
    }

    fn save(&self, active: &[Order], completed: &[Order], order_count: u64) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.inner.save(active, completed, order_count)
    }
}

/// Persistence whose load always fails
struct BrokenLoad;

impl OrderPersistence for BrokenLoad {
    fn load(&self) -> StorageResult<PersistedOrders> {
        Err(StorageError::Unavailable("corrupt file".to_string()))
    }

    fn save(&self, _: &[Order], _: &[Order], _: u64) -> StorageResult<()> {
        Ok(())
    }
}

// ========================================================================
// Creation
// ========================================================================

#[test]
fn test_create_issues_sequential_ids() {
    let mut store = create_test_store();
    assert_eq!(store.next_order_id(), "ORD-001");

    let ids: Vec<String> = ["Abe", "Baba", "Chiba"]
        .iter()
        .map(|name| store.create(single_item_order(name)).unwrap().id)
        .collect();

    assert_eq!(ids, vec!["ORD-001", "ORD-002", "ORD-003"]);
    assert_eq!(store.next_order_id(), "ORD-004");
}

#[test]
fn test_create_starts_received_and_unweighed() {
    let mut store = create_test_store();
    let order = store.create(two_item_order("Endo")).unwrap();

    assert_eq!(order.status, OrderStatus::Received);
    assert_eq!(order.items.len(), 2);
    assert!(order.items.iter().all(|item| item.actual_weight.is_none()));
    assert_ne!(order.items[0].id, order.items[1].id);
    assert_eq!(order.items[0].cut_type, "cubes");
    assert_eq!(order.items[1].cut_type, "");
    assert_eq!(store.orders().len(), 1);
    assert!(store.completed_orders().is_empty());
}

#[test]
fn test_create_trims_contact_and_drops_blank_notes() {
    let mut store = create_test_store();
    let mut input = single_item_order("  Fujita  ");
    input.phone = " 080-0000-1111 ".to_string();
    input.notes = Some("   ".to_string());

    let order = store.create(input).unwrap();
    assert_eq!(order.customer, "Fujita");
    assert_eq!(order.phone, "080-0000-1111");
    assert!(order.notes.is_none());
}

#[test]
fn test_create_persists() {
    let persistence = RecordingPersistence::new();
    let mut store = OrderStore::new(persistence.clone());
    store.create(single_item_order("Goto")).unwrap();

    assert_eq!(persistence.save_count(), 1);
    let saved = persistence.inner.load().unwrap();
    assert_eq!(saved.active.len(), 1);
    assert_eq!(saved.order_count, Some(1));
}

// ========================================================================
// Status changes
// ========================================================================

#[test]
fn test_status_progression_archives_on_completion() {
    let mut store = create_test_store();
    let id = store.create(single_item_order("Hara")).unwrap().id;

    store.set_status(&id, OrderStatus::Preparing).unwrap();
    assert_eq!(store.get_order(&id).unwrap().status, OrderStatus::Preparing);
    assert!(store.completed_orders().is_empty());

    store.set_status(&id, OrderStatus::Completed).unwrap();
    assert_eq!(store.get_order(&id).unwrap().status, OrderStatus::Completed);
    assert_eq!(store.completed_orders().len(), 1);
    assert_eq!(store.completed_orders()[0].id, id);
    assert_eq!(store.completed_orders()[0].status, OrderStatus::Completed);
    // Completed orders stay in the active collection
    assert_eq!(store.orders().len(), 1);
}

#[test]
fn test_set_status_unknown_order() {
    let mut store = create_test_store();
    let err = store.set_status("ORD-404", OrderStatus::Preparing).unwrap_err();
    assert!(matches!(err, StoreError::OrderNotFound(ref id) if id == "ORD-404"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_cancel_never_archives() {
    let mut store = create_test_store();
    let id = store.create(single_item_order("Ikeda")).unwrap().id;

    store.set_status(&id, OrderStatus::Cancelled).unwrap();
    assert_eq!(store.get_order(&id).unwrap().status, OrderStatus::Cancelled);
    assert!(store.completed_orders().is_empty());
}

// ========================================================================
// Weights
// ========================================================================

#[test]
fn test_record_weight_sets_item_weight() {
    let mut store = create_test_store();
    let id = store.create(two_item_order("Kudo")).unwrap().id;
    let items = item_ids(&store, &id);

    let outcome = store.record_weight(&id, &items[0], 512.5).unwrap();
    assert!(!outcome.auto_completed);

    let order = store.get_order(&id).unwrap();
    assert_eq!(order.item(&items[0]).unwrap().actual_weight, Some(512.5));
    assert_eq!(order.item(&items[1]).unwrap().actual_weight, None);
    assert_eq!(order.status, OrderStatus::Received);
}

#[test]
fn test_weighing_every_item_completes_order() {
    let mut store = create_test_store();
    let id = store.create(two_item_order("Mori")).unwrap().id;
    store.set_status(&id, OrderStatus::Preparing).unwrap();
    let items = item_ids(&store, &id);

    store.record_weight(&id, &items[0], 3.0).unwrap();
    assert_eq!(store.get_order(&id).unwrap().status, OrderStatus::Preparing);
    assert!(store.completed_orders().is_empty());

    let outcome = store.record_weight(&id, &items[1], 5.0).unwrap();
    assert!(outcome.auto_completed);
    assert_eq!(store.get_order(&id).unwrap().status, OrderStatus::Completed);
    assert_eq!(store.completed_orders().len(), 1);

    // Archive snapshot carries both weights
    let archived = &store.completed_orders()[0];
    assert_eq!(archived.weighed_count(), 2);
}

#[test]
fn test_auto_completion_is_one_durable_write() {
    let persistence = RecordingPersistence::new();
    let mut store = OrderStore::new(persistence.clone());
    let id = store.create(two_item_order("Kubo")).unwrap().id;
    let items = item_ids(&store, &id);
    store.record_weight(&id, &items[0], 310.0).unwrap();
    let saves_before = persistence.save_count();

    let outcome = store.record_weight(&id, &items[1], 275.0).unwrap();
    assert!(outcome.auto_completed);
    assert_eq!(persistence.save_count(), saves_before + 1);

    // That single write carries both the weight and the completion
    let saved = persistence.inner.load().unwrap();
    assert_eq!(saved.active[0].status, OrderStatus::Completed);
    assert_eq!(saved.active[0].items[1].actual_weight, Some(275.0));
    assert_eq!(saved.completed.len(), 1);
}

#[test]
fn test_reweighing_before_completion_overwrites() {
    let mut store = create_test_store();
    let id = store.create(two_item_order("Noda")).unwrap().id;
    let items = item_ids(&store, &id);

    store.record_weight(&id, &items[0], 100.0).unwrap();
    store.record_weight(&id, &items[0], 120.0).unwrap();

    let order = store.get_order(&id).unwrap();
    assert_eq!(order.item(&items[0]).unwrap().actual_weight, Some(120.0));
    assert_eq!(order.status, OrderStatus::Received);
}

#[test]
fn test_zero_weight_counts_as_weighed() {
    let mut store = create_test_store();
    let id = store.create(single_item_order("Ota")).unwrap().id;
    let items = item_ids(&store, &id);

    let outcome = store.record_weight(&id, &items[0], 0.0).unwrap();
    assert!(outcome.auto_completed);
    assert_eq!(store.get_order(&id).unwrap().status, OrderStatus::Completed);
}

#[test]
fn test_record_weight_unknown_item() {
    let mut store = create_test_store();
    let id = store.create(single_item_order("Sakai")).unwrap().id;

    let err = store.record_weight(&id, "missing-0", 10.0).unwrap_err();
    assert!(matches!(err, StoreError::ItemNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_record_weight_unknown_order() {
    let mut store = create_test_store();
    let err = store.record_weight("ORD-999", "x-0", 10.0).unwrap_err();
    assert!(matches!(err, StoreError::OrderNotFound(_)));
}

// ========================================================================
// Reset
// ========================================================================

#[test]
fn test_reset_all_clears_both_collections() {
    let storage = OrderStorage::open_in_memory().unwrap();
    let mut store = OrderStore::new(storage.clone());
    let first = store.create(single_item_order("Tani")).unwrap().id;
    store.create(single_item_order("Ueno")).unwrap();
    store.set_status(&first, OrderStatus::Completed).unwrap();
    assert_eq!(store.completed_orders().len(), 1);

    store.reset_all().unwrap();
    assert!(store.orders().is_empty());
    assert!(store.completed_orders().is_empty());

    let reloaded = OrderStore::new(storage);
    assert!(reloaded.orders().is_empty());
    assert!(reloaded.completed_orders().is_empty());
}

#[test]
fn test_ids_not_reused_after_reset() {
    let mut store = create_test_store();
    store.create(single_item_order("Wada")).unwrap();
    store.create(single_item_order("Yagi")).unwrap();
    store.reset_all().unwrap();

    let order = store.create(single_item_order("Zaitsu")).unwrap();
    assert_eq!(order.id, "ORD-003");
}

// ========================================================================
// Loading
// ========================================================================

#[test]
fn test_load_failure_starts_empty() {
    let mut store = OrderStore::new(BrokenLoad);
    assert!(store.orders().is_empty());
    assert!(store.completed_orders().is_empty());
    assert_eq!(store.create(single_item_order("Aoki")).unwrap().id, "ORD-001");
}

#[test]
fn test_reload_restores_collections_and_counter() {
    let storage = OrderStorage::open_in_memory().unwrap();
    {
        let mut store = OrderStore::new(storage.clone());
        let id = store.create(single_item_order("Baba")).unwrap().id;
        store.create(single_item_order("Chiba")).unwrap();
        store.set_status(&id, OrderStatus::Completed).unwrap();
    }

    let mut reloaded = OrderStore::new(storage);
    assert_eq!(reloaded.orders().len(), 2);
    assert_eq!(reloaded.completed_orders().len(), 1);
    assert_eq!(reloaded.create(single_item_order("Doi")).unwrap().id, "ORD-003");
}

#[test]
fn test_missing_counter_recovers_from_existing_ids() {
    let storage = OrderStorage::open_in_memory().unwrap();
    {
        let mut store = OrderStore::new(storage.clone());
        for name in ["A", "B", "C", "D"] {
            store.create(single_item_order(name)).unwrap();
        }
    }
    // Rewrite with a stale counter below the ids in use
    let loaded = storage.load().unwrap();
    storage.save(&loaded.active, &loaded.completed, 1).unwrap();

    let mut store = OrderStore::new(storage);
    assert_eq!(store.create(single_item_order("E")).unwrap().id, "ORD-005");
}

#[test]
fn test_corrupt_active_collection_keeps_archive_and_counter() {
    let storage = OrderStorage::open_in_memory().unwrap();
    {
        let mut store = OrderStore::new(storage.clone());
        let done = store.create(single_item_order("Gima")).unwrap().id;
        store.create(single_item_order("Hoshi")).unwrap();
        store.set_status(&done, OrderStatus::Completed).unwrap();
    }
    storage
        .put_raw(crate::orders::storage::ACTIVE_ORDERS_KEY, b"{not json")
        .unwrap();

    let mut store = OrderStore::new(storage.clone());
    assert!(store.orders().is_empty());
    assert_eq!(store.completed_orders().len(), 1);
    assert_eq!(store.completed_orders()[0].id, "ORD-001");

    let order = store.create(single_item_order("Iida")).unwrap();
    assert_eq!(order.id, "ORD-003");

    let saved = storage.load().unwrap();
    assert_eq!(saved.completed.len(), 1);
    assert_eq!(saved.order_count, Some(3));
}

#[test]
fn test_load_drops_invalid_archive_entries() {
    let storage = OrderStorage::open_in_memory().unwrap();
    let mut store = OrderStore::new(storage.clone());
    let done = store.create(single_item_order("Eda")).unwrap().id;
    let open = store.create(single_item_order("Fuse")).unwrap().id;
    store.set_status(&done, OrderStatus::Completed).unwrap();

    let snapshot = store.completed_orders()[0].clone();
    let not_completed = store.get_order(&open).unwrap().clone();
    storage
        .save(store.orders(), &[snapshot.clone(), snapshot, not_completed], 2)
        .unwrap();

    let reloaded = OrderStore::new(storage);
    assert_eq!(reloaded.completed_orders().len(), 1);
    assert_eq!(reloaded.completed_orders()[0].id, done);
}

// ========================================================================
// Customer directory
// ========================================================================

#[test]
fn test_create_registers_customer() {
    let directory = Arc::new(InMemoryCustomerDirectory::new());
    let mut store = create_test_store();
    store.set_customer_directory(directory.clone());

    store.create(single_item_order("Hayashi")).unwrap();
    store.create(single_item_order("Hayashi")).unwrap();

    assert_eq!(directory.len(), 1);
    let customer = directory.find_by_phone("090-1234-5678").unwrap().unwrap();
    assert_eq!(customer.name, "Hayashi");
}

struct UnavailableDirectory;

impl CustomerDirectory for UnavailableDirectory {
    fn find_by_phone(&self, _: &str) -> DirectoryResult<Option<Customer>> {
        Err(DirectoryError::Unavailable("offline".into()))
    }

    fn create(&self, _: &str, _: &str) -> DirectoryResult<Customer> {
        Err(DirectoryError::Unavailable("offline".into()))
    }

    fn search_by_name(&self, _: &str) -> DirectoryResult<Vec<Customer>> {
        Err(DirectoryError::Unavailable("offline".into()))
    }
}

#[test]
fn test_directory_failure_does_not_block_order() {
    let mut store = create_test_store();
    store.set_customer_directory(Arc::new(UnavailableDirectory));

    let order = store.create(single_item_order("Inoue")).unwrap();
    assert_eq!(store.get_order(&order.id).unwrap().customer, "Inoue");
}
