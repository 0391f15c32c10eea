//! Integration tests for void_inventory

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use void_inventory::*;

const SINGLE: ContainerPosition = ContainerPosition::SINGLE;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn potion(max: i64) -> Arc<Item> {
    Item::builder("consumables", 1)
        .with_name("Potion")
        .with_quantity(QuantityKind::integral(max))
        .build()
        .unwrap()
}

fn sword() -> Arc<Item> {
    Item::builder("weapons", 1)
        .with_name("Sword")
        .with_quantity(QuantityKind::integral(4))
        .with_usage(DurabilityUsage::new(100.0), [])
        .with_rendering(DurabilityBarRendering, [Requirement::usage(DurabilityUsage::KIND)])
        .build()
        .unwrap()
}

fn stack(item: &Arc<Item>, quantity: i64) -> Stack {
    Item::create(item, Quantity::Integral(quantity), None).unwrap()
}

fn bounded(size: usize) -> Inventory {
    Inventory::builder()
        .with_spatial(IndexedSpatialStrategy::bounded(size))
        .build()
        .unwrap()
}

fn quantity_at(inventory: &Inventory, container: ContainerPosition, position: StackPosition) -> Option<Quantity> {
    inventory
        .find(container, position)
        .unwrap()
        .map(Stack::quantity)
}

// Usage strategy that waits for the test to release it
#[derive(Debug)]
struct GatedUsage {
    gate: Mutex<Option<oneshot::Receiver<UsageEffect>>>,
}

impl GatedUsage {
    const KIND: StrategyKind = StrategyKind::new("gated");

    fn new(gate: oneshot::Receiver<UsageEffect>) -> Self {
        Self {
            gate: Mutex::new(Some(gate)),
        }
    }
}

#[async_trait]
impl InventoryUsageStrategy for GatedUsage {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn accepts(&self, _strategy: &dyn StackUsageStrategy) -> bool {
        true
    }

    async fn use_stack(&self, _request: UsageRequest) -> std::result::Result<UsageEffect, UsageError> {
        let gate = self.gate.lock().take();
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| UsageError::Failed("gate closed".to_string())),
            None => Ok(UsageEffect::Nothing),
        }
    }
}

// Only accepts stacks whose main usage is durability
#[derive(Debug)]
struct DurableOnly;

#[async_trait]
impl InventoryUsageStrategy for DurableOnly {
    fn kind(&self) -> StrategyKind {
        StrategyKind::new("durable-only")
    }

    fn accepts(&self, strategy: &dyn StackUsageStrategy) -> bool {
        strategy.kind() == DurabilityUsage::KIND
    }

    async fn use_stack(&self, request: UsageRequest) -> std::result::Result<UsageEffect, UsageError> {
        let durability = request.state.as_f64().unwrap_or(0.0);
        Ok(UsageEffect::UpdateState(UsageState::Float(durability - 10.0)))
    }
}

#[test]
fn test_optimal_put_saturates_existing() {
    init_logging();
    let item = potion(10);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, None, stack(&item, 8), None).unwrap();

    let outcome = inventory.put(SINGLE, None, stack(&item, 5), Some(true)).unwrap();

    assert_eq!(outcome.position(), Some(1));
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(10)));
    assert_eq!(quantity_at(&inventory, SINGLE, 1), Some(Quantity::Integral(3)));
}

#[test]
fn test_optimal_put_sink_absorbs() {
    let item = potion(20);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, None, stack(&item, 8), None).unwrap();

    let outcome = inventory.put(SINGLE, None, stack(&item, 5), Some(true)).unwrap();

    assert!(matches!(outcome, PutOutcome::Absorbed));
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(13)));
    assert_eq!(inventory.len(SINGLE).unwrap(), 1);
}

#[test]
fn test_optimal_put_skips_full_stacks() {
    let item = potion(10);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, None, stack(&item, 10), None).unwrap();
    inventory.put(SINGLE, None, stack(&item, 10), Some(false)).unwrap();

    let outcome = inventory.put(SINGLE, None, stack(&item, 3), Some(true)).unwrap();

    assert_eq!(outcome.position(), Some(2));
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(10)));
    assert_eq!(quantity_at(&inventory, SINGLE, 1), Some(Quantity::Integral(10)));
    assert_eq!(quantity_at(&inventory, SINGLE, 2), Some(Quantity::Integral(3)));
}

#[test]
fn test_optimal_put_ignores_other_items() {
    let item = potion(10);
    let other = Item::builder("consumables", 2)
        .with_quantity(QuantityKind::integral(10))
        .build()
        .unwrap();
    let mut inventory = bounded(4);
    inventory.put(SINGLE, None, stack(&other, 1), None).unwrap();

    let outcome = inventory.put(SINGLE, None, stack(&item, 1), None).unwrap();
    assert_eq!(outcome.position(), Some(1));
}

#[test]
fn test_fractional_optimal_put() {
    let dust = Item::builder("materials", 1)
        .with_quantity(QuantityKind::fractional(1.0))
        .build()
        .unwrap();
    let mut inventory = bounded(4);
    let first = Item::create(&dust, Quantity::Fractional(0.75), None).unwrap();
    let second = Item::create(&dust, Quantity::Fractional(0.5), None).unwrap();
    inventory.put(SINGLE, None, first, None).unwrap();
    inventory.put(SINGLE, None, second, None).unwrap();

    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Fractional(1.0)));
    assert_eq!(quantity_at(&inventory, SINGLE, 1), Some(Quantity::Fractional(0.25)));
}

#[test]
fn test_put_wrong_quantity_kind() {
    let item = potion(10);
    let mut inventory = bounded(2);
    assert!(matches!(
        Item::create(&item, Quantity::Fractional(1.0), None),
        Err(QuantityError::InvalidQuantityKind { .. })
    ));
    assert!(matches!(
        inventory.put(SINGLE, Some(5), stack(&item, 1), None),
        Err(InventoryError::InvalidStackPosition { .. })
    ));
}

#[test]
fn test_incompatible_usage_strategy() {
    let mut inventory = Inventory::builder().with_usage(DurableOnly, []).build().unwrap();
    let item = potion(10);
    assert!(matches!(
        inventory.put(SINGLE, None, stack(&item, 1), None),
        Err(InventoryError::IncompatibleUsageStrategy)
    ));
    assert!(inventory.put(SINGLE, None, stack(&sword(), 1), None).unwrap().is_success());
}

#[test]
fn test_split_refunds_on_occupied_destination() {
    let item = potion(20);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, Some(0), stack(&item, 10), None).unwrap();
    inventory.put(SINGLE, Some(1), stack(&item, 1), None).unwrap();

    let outcome = inventory
        .split(SINGLE, 0, Quantity::Integral(4), SINGLE, Some(1))
        .unwrap();

    assert_eq!(outcome, SplitOutcome::Failed);
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(10)));
    assert_eq!(quantity_at(&inventory, SINGLE, 1), Some(Quantity::Integral(1)));
}

#[test]
fn test_split_to_free_slot() {
    let item = potion(20);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, Some(0), stack(&item, 10), None).unwrap();

    let outcome = inventory
        .split(SINGLE, 0, Quantity::Integral(4), SINGLE, Some(3))
        .unwrap();

    assert_eq!(outcome, SplitOutcome::Placed(3));
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(6)));
    assert_eq!(quantity_at(&inventory, SINGLE, 3), Some(Quantity::Integral(4)));
}

#[test]
fn test_split_refunds_on_error() {
    let item = potion(20);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, Some(0), stack(&item, 10), None).unwrap();

    let result = inventory.split(SINGLE, 0, Quantity::Integral(4), SINGLE, Some(9));

    assert!(matches!(result, Err(InventoryError::InvalidStackPosition { .. })));
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(10)));
}

#[test]
fn test_split_more_than_available() {
    let item = potion(20);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, Some(0), stack(&item, 3), None).unwrap();

    let outcome = inventory
        .split(SINGLE, 0, Quantity::Integral(4), SINGLE, Some(1))
        .unwrap();
    assert_eq!(outcome, SplitOutcome::Failed);
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(3)));
}

#[test]
fn test_take_disallow_empty() {
    let item = potion(10);
    let mut inventory = bounded(4);
    inventory.put(SINGLE, None, stack(&item, 3), None).unwrap();

    assert!(inventory
        .take(SINGLE, 0, Some(Quantity::Integral(3)), true)
        .unwrap()
        .is_none());
    assert!(inventory.take(SINGLE, 0, None, true).unwrap().is_none());
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(3)));
    assert!(inventory.take(SINGLE, 2, None, false).unwrap().is_none());
}

#[test]
fn test_merge_interpolates_durability() {
    let item = sword();
    let mut inventory = bounded(4);
    let mut worn = stack(&item, 1);
    worn.main_usage_mut()
        .downcast_mut::<StackDurability>()
        .unwrap()
        .set_durability(50.0);
    inventory.put(SINGLE, None, stack(&item, 1), None).unwrap();
    // Different durability never matches during optimal put
    assert_eq!(inventory.put(SINGLE, None, worn, None).unwrap().position(), Some(1));

    assert!(inventory.merge(SINGLE, 0, SINGLE, 1).unwrap());

    let merged = inventory.find(SINGLE, 0).unwrap().unwrap();
    assert_eq!(merged.quantity(), Quantity::Integral(2));
    let durability = merged.main_usage().downcast_ref::<StackDurability>().unwrap();
    assert!((durability.durability() - 75.0).abs() < 1e-9);
    assert!(inventory.find(SINGLE, 1).unwrap().is_none());
    assert_eq!(
        merged.rendering_data().get("durability"),
        Some(&serde_json::json!(0.75))
    );
}

#[test]
fn test_merge_unstacked_denied() {
    let key = Item::builder("keys", 1).build().unwrap();
    let mut inventory = bounded(4);
    inventory
        .put(SINGLE, None, Item::create(&key, Quantity::Unstacked(true), None).unwrap(), None)
        .unwrap();
    inventory
        .put(SINGLE, None, Item::create(&key, Quantity::Unstacked(true), None).unwrap(), None)
        .unwrap();

    assert_eq!(inventory.len(SINGLE).unwrap(), 2);
    assert!(!inventory.merge(SINGLE, 0, SINGLE, 1).unwrap());
}

#[test]
fn test_merge_between_inventories() {
    let item = potion(10);
    let mut target = bounded(2);
    let mut source = bounded(2);
    target.put(SINGLE, None, stack(&item, 6), None).unwrap();
    source.put(SINGLE, None, stack(&item, 7), None).unwrap();

    assert!(Inventory::merge_between(&mut target, SINGLE, 0, &mut source, SINGLE, 0).unwrap());
    assert_eq!(quantity_at(&target, SINGLE, 0), Some(Quantity::Integral(10)));
    assert_eq!(quantity_at(&source, SINGLE, 0), Some(Quantity::Integral(3)));

    target.take(SINGLE, 0, Some(Quantity::Integral(5)), false).unwrap();
    assert!(Inventory::merge_between(&mut target, SINGLE, 0, &mut source, SINGLE, 0).unwrap());
    assert_eq!(quantity_at(&target, SINGLE, 0), Some(Quantity::Integral(8)));
    assert!(source.is_empty());
}

#[test]
fn test_multiple_containers() {
    let item = potion(10);
    let mut inventory = Inventory::builder()
        .with_positioning(IndexedPositioning::new(3))
        .with_spatial(IndexedSpatialStrategy::bounded(2))
        .build()
        .unwrap();

    inventory.put(ContainerPosition(2), None, stack(&item, 4), None).unwrap();
    assert_eq!(inventory.len(ContainerPosition(2)).unwrap(), 1);
    assert_eq!(inventory.len(ContainerPosition(0)).unwrap(), 0);
    assert!(matches!(
        inventory.put(ContainerPosition(3), None, stack(&item, 4), None),
        Err(InventoryError::InvalidContainerPosition(ContainerPosition(3)))
    ));

    let outcome = inventory
        .split(ContainerPosition(2), 0, Quantity::Integral(1), ContainerPosition(0), None)
        .unwrap();
    assert_eq!(outcome, SplitOutcome::Placed(0));
    assert_eq!(
        quantity_at(&inventory, ContainerPosition(2), 0),
        Some(Quantity::Integral(3))
    );

    let exported = inventory.export();
    assert_eq!(exported.containers().count(), 3);
    assert!(exported.container(ContainerPosition(1)).unwrap().is_empty());
    assert_eq!(exported.len(), 2);
}

#[test]
fn test_export_import_round_trip() {
    init_logging();
    let mut registry = ItemRegistry::new();
    let potion = potion(10);
    let sword = sword();
    registry.register(Arc::clone(&potion));
    registry.register(Arc::clone(&sword));

    let mut inventory = bounded(8);
    inventory.put(SINGLE, Some(0), stack(&potion, 7), None).unwrap();
    let mut worn = stack(&sword, 1);
    worn.main_usage_mut().import(&UsageState::Float(35.0));
    inventory.put(SINGLE, Some(5), worn, None).unwrap();

    for format in [SerializedFormat::Json, SerializedFormat::Binary] {
        let bytes = inventory.export().to_bytes(format).unwrap();
        let decoded = SerializedInventory::from_bytes(&bytes, format).unwrap();

        let mut restored = bounded(8);
        restored.put(SINGLE, None, stack(&potion, 1), None).unwrap();
        assert_eq!(restored.import(&decoded, &registry).unwrap(), 2);

        assert_eq!(restored.len(SINGLE).unwrap(), 2);
        assert_eq!(quantity_at(&restored, SINGLE, 0), Some(Quantity::Integral(7)));
        let restored_sword = restored.find(SINGLE, 5).unwrap().unwrap();
        assert_eq!(restored_sword.main_usage().export(), UsageState::Float(35.0));
        assert_eq!(restored.export(), inventory.export());
    }
}

#[test]
fn test_import_skips_unknown_and_mismatched() {
    init_logging();
    let mut registry = ItemRegistry::new();
    let potion = potion(10);
    registry.register(Arc::clone(&potion));

    let mut serialized = SerializedInventory::new();
    serialized.insert(
        SINGLE,
        0,
        SerializedStack::new("consumables", 1, Quantity::Integral(2), UsageState::None),
    );
    serialized.insert(
        SINGLE,
        1,
        SerializedStack::new("consumables", 99, Quantity::Integral(2), UsageState::None),
    );
    serialized.insert(
        SINGLE,
        2,
        SerializedStack::new("consumables", 1, Quantity::Unstacked(true), UsageState::None),
    );

    let mut inventory = bounded(4);
    assert_eq!(inventory.import(&serialized, &registry).unwrap(), 1);
    assert_eq!(inventory.len(SINGLE).unwrap(), 1);
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(2)));
}

#[test]
fn test_import_skips_entries_over_max() {
    init_logging();
    let mut registry = ItemRegistry::new();
    let potion = potion(10);
    registry.register(Arc::clone(&potion));

    let mut serialized = SerializedInventory::new();
    serialized.insert(
        SINGLE,
        0,
        SerializedStack::new("consumables", 1, Quantity::Integral(5), UsageState::None),
    );
    serialized.insert(
        SINGLE,
        1,
        SerializedStack::new("consumables", 1, Quantity::Integral(50), UsageState::None),
    );
    serialized.insert(
        SINGLE,
        2,
        SerializedStack::new("consumables", 1, Quantity::Integral(3), UsageState::None),
    );
    serialized.insert(
        SINGLE,
        9,
        SerializedStack::new("consumables", 1, Quantity::Integral(1), UsageState::None),
    );

    let mut inventory = bounded(4);
    assert_eq!(inventory.import(&serialized, &registry).unwrap(), 2);
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(5)));
    assert_eq!(quantity_at(&inventory, SINGLE, 1), None);
    assert_eq!(quantity_at(&inventory, SINGLE, 2), Some(Quantity::Integral(3)));
}

#[test]
fn test_import_invalid_container_keeps_contents() {
    let mut registry = ItemRegistry::new();
    let potion = potion(10);
    registry.register(Arc::clone(&potion));

    let mut inventory = bounded(4);
    inventory.put(SINGLE, None, stack(&potion, 7), None).unwrap();

    let mut serialized = SerializedInventory::new();
    serialized.insert(
        SINGLE,
        0,
        SerializedStack::new("consumables", 1, Quantity::Integral(2), UsageState::None),
    );
    serialized.insert(
        ContainerPosition(4),
        0,
        SerializedStack::new("consumables", 1, Quantity::Integral(2), UsageState::None),
    );

    assert!(matches!(
        inventory.import(&serialized, &registry),
        Err(InventoryError::InvalidContainerPosition(ContainerPosition(4)))
    ));
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(7)));
}

#[test]
fn test_unbounded_put_at_highest_index() {
    let item = potion(10);
    let mut inventory = Inventory::builder().build().unwrap();

    let outcome = inventory.put(SINGLE, Some(usize::MAX), stack(&item, 1), None).unwrap();
    assert_eq!(outcome.position(), Some(usize::MAX));
    assert_eq!(quantity_at(&inventory, SINGLE, usize::MAX), Some(Quantity::Integral(1)));

    let outcome = inventory.put(SINGLE, Some(1 << 40), stack(&item, 1), Some(false)).unwrap();
    assert_eq!(outcome.position(), Some(1 << 40));
    let outcome = inventory.put(SINGLE, None, stack(&item, 1), Some(false)).unwrap();
    assert_eq!(outcome.position(), Some(0));
    assert_eq!(inventory.len(SINGLE).unwrap(), 3);
}

#[test]
fn test_config_built_inventory() {
    let config = InventoryConfig::from_json(
        r#"{ "containers": 2, "container_size": 3, "optimal_put": false }"#,
    )
    .unwrap();
    let item = potion(10);
    let mut inventory = InventoryBuilder::from_config(&config).build().unwrap();

    for expected in 0..3 {
        let outcome = inventory.put(ContainerPosition(1), None, stack(&item, 1), None).unwrap();
        assert_eq!(outcome.position(), Some(expected));
    }
    assert!(!inventory
        .put(ContainerPosition(1), None, stack(&item, 1), None)
        .unwrap()
        .is_success());
    assert!(inventory
        .put(ContainerPosition(1), None, stack(&item, 1), Some(true))
        .unwrap()
        .is_success());
}

#[tokio::test]
async fn test_usage_guard_allows_interleaving() {
    init_logging();
    let (release, gate) = oneshot::channel();
    let item = potion(10);
    let mut inventory = Inventory::builder()
        .with_spatial(IndexedSpatialStrategy::bounded(4))
        .with_usage(GatedUsage::new(gate), [])
        .build()
        .unwrap();
    assert_eq!(inventory.main_usage().kind(), GatedUsage::KIND);
    inventory.put(SINGLE, None, stack(&item, 5), None).unwrap();

    let pending = inventory.begin_use(SINGLE, 0, None).unwrap().unwrap();
    assert!(inventory.is_using());
    assert!(matches!(
        inventory.begin_use(SINGLE, 0, None),
        Err(InventoryError::UsageInProgress)
    ));

    // Other operations keep working while the usage is pending
    inventory.put(SINGLE, Some(1), stack(&item, 2), Some(false)).unwrap();
    assert_eq!(inventory.move_stack(SINGLE, 0, 3).unwrap(), Some(3));

    release.send(UsageEffect::Consume(Quantity::Integral(2))).unwrap();
    let completion = pending.await;
    assert!(!inventory.is_using());
    assert!(inventory.complete_use(completion).unwrap());
    assert_eq!(quantity_at(&inventory, SINGLE, 3), Some(Quantity::Integral(3)));
}

#[tokio::test]
async fn test_usage_of_foreign_stack() {
    let item = potion(10);
    let mut inventory = bounded(4);
    let mut other = bounded(4);
    inventory.put(SINGLE, None, stack(&item, 5), None).unwrap();
    other.put(SINGLE, None, stack(&item, 2), None).unwrap();

    let foreign = other.find(SINGLE, 0).unwrap().unwrap();
    assert!(matches!(
        inventory.begin_use_stack(foreign, None),
        Err(InventoryError::StackNotManagedHere)
    ));
    assert!(matches!(
        inventory.begin_use_stack(&stack(&item, 1), None),
        Err(InventoryError::StackNotManagedHere)
    ));
    assert!(!inventory.is_using());

    let resident = inventory.find(SINGLE, 0).unwrap().unwrap();
    let pending = inventory.begin_use_stack(resident, None).unwrap();
    assert!(matches!(
        inventory.begin_use_stack(inventory.find(SINGLE, 0).unwrap().unwrap(), None),
        Err(InventoryError::UsageInProgress)
    ));
    assert!(inventory.complete_use(pending.await).unwrap());
    assert!(!inventory.is_using());
}

#[tokio::test]
async fn test_usage_on_removed_stack() {
    let (release, gate) = oneshot::channel();
    let item = potion(10);
    let mut inventory = Inventory::builder()
        .with_usage(GatedUsage::new(gate), [])
        .build()
        .unwrap();
    inventory.put(SINGLE, None, stack(&item, 5), None).unwrap();

    let pending = inventory.begin_use(SINGLE, 0, None).unwrap().unwrap();
    inventory.remove(SINGLE, 0).unwrap();
    release.send(UsageEffect::Consume(Quantity::Integral(1))).unwrap();

    assert!(!inventory.complete_use(pending.await).unwrap());
}

#[tokio::test]
async fn test_dropped_usage_releases_guard() {
    let (_release, gate) = oneshot::channel();
    let item = potion(10);
    let mut inventory = Inventory::builder()
        .with_usage(GatedUsage::new(gate), [])
        .build()
        .unwrap();
    inventory.put(SINGLE, None, stack(&item, 5), None).unwrap();

    let pending = inventory.begin_use(SINGLE, 0, None).unwrap().unwrap();
    assert!(inventory.is_using());
    drop(pending);
    assert!(!inventory.is_using());
    assert!(inventory.begin_use(SINGLE, 0, None).unwrap().is_some());
}

#[tokio::test]
async fn test_consuming_usage() {
    let item = potion(10);
    let mut inventory = Inventory::builder()
        .with_usage(ConsumingUsage, [])
        .build()
        .unwrap();
    inventory.put(SINGLE, None, stack(&item, 3), None).unwrap();

    assert!(inventory.use_stack(SINGLE, 0, None).await.unwrap());
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(2)));

    assert!(inventory
        .use_stack(SINGLE, 0, Some(UsageState::Int(2)))
        .await
        .unwrap());
    assert!(inventory.is_empty());

    assert!(!inventory.use_stack(SINGLE, 0, None).await.unwrap());
}

#[tokio::test]
async fn test_usage_failure_is_reported() {
    let item = potion(10);
    let mut inventory = Inventory::builder()
        .with_usage(ConsumingUsage, [])
        .build()
        .unwrap();
    inventory.put(SINGLE, None, stack(&item, 3), None).unwrap();

    let result = inventory.use_stack(SINGLE, 0, Some(UsageState::Int(0))).await;
    assert!(matches!(result, Err(InventoryError::Usage(UsageError::Rejected(_)))));
    assert!(!inventory.is_using());
    assert_eq!(quantity_at(&inventory, SINGLE, 0), Some(Quantity::Integral(3)));
}

#[tokio::test]
async fn test_usage_updates_state() {
    let item = sword();
    let mut inventory = Inventory::builder().with_usage(DurableOnly, []).build().unwrap();
    inventory.put(SINGLE, None, stack(&item, 1), None).unwrap();

    assert!(inventory.use_stack(SINGLE, 0, None).await.unwrap());
    let used = inventory.find(SINGLE, 0).unwrap().unwrap();
    assert_eq!(used.main_usage().export(), UsageState::Float(90.0));
}

#[test]
fn test_usage_dependency_validation() {
    let result = Inventory::builder()
        .with_usage(ConsumingUsage, [Requirement::usage(StrategyKind::new("missing"))])
        .build();
    assert!(matches!(
        result,
        Err(InventoryError::Definition(DefinitionError::MissingDependency { .. }))
    ));

    let result = Inventory::builder()
        .with_usage(ConsumingUsage, [Requirement::spatial(StrategyKind::INDEXED)])
        .with_usage(NullInventoryUsage, [Requirement::usage(ConsumingUsage::KIND)])
        .with_main_usage(NullInventoryUsage::KIND)
        .build()
        .unwrap();
    assert_eq!(result.main_usage().kind(), NullInventoryUsage::KIND);
}
