//! Integration tests for the link manager's public API.
//!
//! # Test Coverage
//!
//! - The Design/Build/Test walkthrough end to end
//! - Link validation
//! - Cycle policies
//! - Link lifecycle (create, retype, delete) and item removal
//! - Queries against unknown features and items

use rstest::{fixture, rstest};
use trellis::domain::{
    FeatureId, ItemId, LinkDirection, LinkRecord, RelationshipType, TimelineItem,
};
use trellis::links::{CyclePolicy, LinkManager, LinkOutcome, LinkRemoval};
use trellis::store::{InMemoryItemStore, ItemStore};
use trellis::Error;

use RelationshipType::{Complements, Dependency};

// =============================================================================
// Test Helpers
// =============================================================================

fn fid() -> FeatureId {
    FeatureId::new("F")
}

fn id(s: &str) -> ItemId {
    ItemId::new(s)
}

/// Feature `F` with items I1 "Design", I2 "Build", I3 "Test".
#[fixture]
fn store() -> InMemoryItemStore {
    let mut store = InMemoryItemStore::new();
    store.create_feature(fid(), "Checkout").unwrap();
    for (item, name) in [("I1", "Design"), ("I2", "Build"), ("I3", "Test")] {
        store.add_item(&fid(), TimelineItem::new(item, name)).unwrap();
    }
    store
}

fn link(
    manager: LinkManager,
    store: &mut InMemoryItemStore,
    source: &str,
    target: &str,
    kind: RelationshipType,
) -> trellis::Result<LinkOutcome> {
    manager.create_link(store, &fid(), &id(source), &id(target), kind)
}

fn ids(items: &[&TimelineItem]) -> Vec<String> {
    items.iter().map(|item| item.id.to_string()).collect()
}

// =============================================================================
// Walkthrough
// =============================================================================

#[rstest]
fn design_build_test_walkthrough(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();

    assert_eq!(link(manager, &mut store, "I1", "I2", Dependency).unwrap(), LinkOutcome::Created);
    assert_eq!(link(manager, &mut store, "I2", "I3", Dependency).unwrap(), LinkOutcome::Created);

    assert!(manager.would_create_circular(&store, &fid(), &id("I3"), &id("I1")));
    assert!(!manager.would_create_circular(&store, &fid(), &id("I1"), &id("I3")));

    // Edges point from dependent to dependency: I2 depends on I3, I1 on I2.
    assert_eq!(ids(&manager.dependencies(&store, &fid(), &id("I2"))), ["I3"]);
    assert_eq!(ids(&manager.dependents(&store, &fid(), &id("I2"))), ["I1"]);

    let stats = manager.stats(&store, &fid());
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_type.dependency, 2);
    assert_eq!(stats.by_type.complements, 0);

    let order = manager.schedule_order(&store, &fid()).unwrap();
    assert_eq!(ids(&order), ["I3", "I2", "I1"]);
}

#[rstest]
fn every_link_is_visible_from_both_ends(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    link(manager, &mut store, "I1", "I3", Complements).unwrap();

    let on_source = manager.outgoing_links(&store, &fid(), &id("I1"));
    let on_target = manager.incoming_links(&store, &fid(), &id("I3"));

    assert_eq!(on_source.len(), 1);
    assert_eq!(on_target.len(), 1);
    assert_eq!(on_source[0].direction(), LinkDirection::Outgoing);
    assert_eq!(on_source[0].other_id(), &id("I3"));
    assert_eq!(on_target[0].direction(), LinkDirection::Incoming);
    assert_eq!(on_target[0].other_id(), &id("I1"));
    assert_eq!(on_source[0].created_at(), on_target[0].created_at());
    assert_eq!(on_target[0].relationship_type(), Complements);

    let feature = store.feature(&fid()).unwrap();
    assert_eq!(feature.linked_items(&id("I2")), Vec::<LinkRecord>::new());
}

// =============================================================================
// Validation
// =============================================================================

#[rstest]
#[case("I1", "I2", "dependency", &[])]
#[case("I1", "I2", "complements", &[])]
#[case("", "I2", "dependency", &["Source item ID is required"])]
#[case("I1", "  ", "dependency", &["Target item ID is required"])]
#[case("I1", "I1", "dependency", &["Cannot create a link from an item to itself"])]
#[case(" I1", "I1 ", "complements", &[])]
fn validate_reports_each_problem(
    #[case] source: &str,
    #[case] target: &str,
    #[case] kind: &str,
    #[case] expected: &[&str],
) {
    let result = LinkManager::validate(source, target, kind);
    assert_eq!(result.valid, expected.is_empty());
    assert_eq!(result.errors, expected);
}

#[test]
fn validate_collects_all_errors() {
    let result = LinkManager::validate("", "", "blocks");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 3);
    assert!(result.errors[2].contains("blocks"));
}

// =============================================================================
// Cycle Policies
// =============================================================================

#[rstest]
fn strict_policy_rejects_cycles_without_writing(mut store: InMemoryItemStore) {
    let manager = LinkManager::new(CyclePolicy::Strict);
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    link(manager, &mut store, "I2", "I3", Dependency).unwrap();
    let before = manager.stats(&store, &fid());

    let err = link(manager, &mut store, "I3", "I1", Dependency).unwrap_err();
    assert!(matches!(err, Error::CyclicDependency { .. }));
    assert_eq!(manager.stats(&store, &fid()), before);
    assert!(manager.dependency_cycles(&store, &fid()).is_empty());
}

#[rstest]
fn complements_links_never_form_cycles(mut store: InMemoryItemStore) {
    let manager = LinkManager::new(CyclePolicy::Strict);
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    link(manager, &mut store, "I2", "I3", Dependency).unwrap();

    assert!(link(manager, &mut store, "I3", "I1", Complements).unwrap().is_created());
    assert!(manager.schedule_order(&store, &fid()).is_ok());
}

#[rstest]
fn advisory_policy_allows_and_reports_cycles(mut store: InMemoryItemStore) {
    let manager = LinkManager::new(CyclePolicy::Advisory);
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    link(manager, &mut store, "I2", "I1", Dependency).unwrap();

    let cycles = manager.dependency_cycles(&store, &fid());
    assert_eq!(cycles, vec![vec![id("I1"), id("I2")]]);

    match manager.schedule_order(&store, &fid()) {
        Err(Error::DependencyCycles(reported)) => assert_eq!(reported, cycles),
        other => panic!("expected DependencyCycles, got {other:?}"),
    }
}

#[rstest]
fn retype_to_dependency_is_cycle_checked(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    link(manager, &mut store, "I2", "I1", Complements).unwrap();

    let err = manager
        .set_relationship_type(&mut store, &fid(), &id("I2"), &id("I1"), Dependency)
        .unwrap_err();
    assert!(matches!(err, Error::CyclicDependency { .. }));

    let previous = manager
        .set_relationship_type(&mut store, &fid(), &id("I1"), &id("I2"), Complements)
        .unwrap();
    assert_eq!(previous, Dependency);
    assert_eq!(manager.stats(&store, &fid()).by_type.complements, 2);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[rstest]
fn duplicate_create_is_a_no_op(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    let updated = store.feature(&fid()).unwrap().updated_at;

    // Same ordered pair with another type still counts as linked.
    assert_eq!(
        link(manager, &mut store, "I1", "I2", Complements).unwrap(),
        LinkOutcome::AlreadyLinked
    );
    assert_eq!(manager.outgoing_links(&store, &fid(), &id("I1")).len(), 1);
    assert_eq!(manager.incoming_links(&store, &fid(), &id("I2")).len(), 1);
    assert_eq!(store.feature(&fid()).unwrap().updated_at, updated);

    // The reverse direction is a different link.
    link(manager, &mut store, "I2", "I1", Complements).unwrap();
    assert_eq!(manager.stats(&store, &fid()).total, 2);
}

#[rstest]
fn delete_undoes_create(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    let before = manager.stats(&store, &fid());

    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    let removal = manager
        .delete_link(&mut store, &fid(), &id("I1"), &id("I2"))
        .unwrap();

    assert_eq!(removal, LinkRemoval::Removed);
    assert!(!manager.link_exists(&store, &fid(), &id("I1"), &id("I2")));
    assert_eq!(manager.stats(&store, &fid()), before);
    assert!(manager.incoming_links(&store, &fid(), &id("I2")).is_empty());
}

#[rstest]
fn delete_missing_link_still_touches_feature(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    let updated = store.feature(&fid()).unwrap().updated_at;

    let removal = manager
        .delete_link(&mut store, &fid(), &id("I1"), &id("I3"))
        .unwrap();
    assert_eq!(removal, LinkRemoval::NotLinked);
    assert!(store.feature(&fid()).unwrap().updated_at >= updated);
}

#[rstest]
fn mutations_require_known_feature_and_items(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();

    let err = manager
        .create_link(&mut store, &FeatureId::new("nope"), &id("I1"), &id("I2"), Dependency)
        .unwrap_err();
    assert!(matches!(err, Error::FeatureNotFound(_)));

    let err = link(manager, &mut store, "I1", "ghost", Dependency).unwrap_err();
    assert!(matches!(err, Error::ItemNotFound { .. }));

    let err = link(manager, &mut store, "I2", "I2", Complements).unwrap_err();
    assert!(matches!(err, Error::SelfLink(_)));

    let err = manager
        .delete_link(&mut store, &fid(), &id("ghost"), &id("I2"))
        .unwrap_err();
    assert!(matches!(err, Error::ItemNotFound { .. }));

    let err = manager
        .set_relationship_type(&mut store, &fid(), &id("I1"), &id("I2"), Complements)
        .unwrap_err();
    assert!(matches!(err, Error::LinkNotFound { .. }));
}

#[rstest]
fn removing_an_item_drops_its_links(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    link(manager, &mut store, "I2", "I3", Dependency).unwrap();
    link(manager, &mut store, "I1", "I3", Complements).unwrap();

    let (removed, dropped) = store.remove_item(&fid(), &id("I2")).unwrap();
    assert_eq!(removed.name, "Build");
    assert_eq!(dropped, 2);
    assert_eq!(manager.stats(&store, &fid()).total, 1);
    assert!(manager.dependencies(&store, &fid(), &id("I1")).is_empty());
}

// =============================================================================
// Queries
// =============================================================================

#[rstest]
fn queries_degrade_to_empty(store: InMemoryItemStore) {
    let manager = LinkManager::default();
    let missing = FeatureId::new("missing");

    assert!(manager.all_links(&store, &missing, &id("I1")) == Default::default());
    assert!(manager.outgoing_links(&store, &fid(), &id("ghost")).is_empty());
    assert!(!manager.link_exists(&store, &missing, &id("I1"), &id("I2")));
    assert_eq!(manager.stats(&store, &missing).total, 0);
    assert!(manager.dependencies(&store, &missing, &id("I1")).is_empty());
    assert!(manager.dependents(&store, &fid(), &id("ghost")).is_empty());
    assert!(!manager.would_create_circular(&store, &missing, &id("I1"), &id("I2")));
    assert!(manager.dependency_tree(&store, &missing, &id("I1"), None).is_empty());
    assert!(manager.schedule_order(&store, &missing).unwrap().is_empty());
    assert!(manager.dependency_cycles(&store, &missing).is_empty());
}

#[rstest]
fn self_check_is_always_circular(store: InMemoryItemStore) {
    let manager = LinkManager::default();
    assert!(manager.would_create_circular(&store, &fid(), &id("I1"), &id("I1")));
}

#[rstest]
fn records_keep_creation_order(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    link(manager, &mut store, "I1", "I3", Complements).unwrap();
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();

    let targets: Vec<ItemId> = manager
        .outgoing_links(&store, &fid(), &id("I1"))
        .iter()
        .map(|record| record.other_id().clone())
        .collect();
    assert_eq!(targets, vec![id("I3"), id("I2")]);
}

#[rstest]
fn trees_follow_dependency_links_only(mut store: InMemoryItemStore) {
    let manager = LinkManager::default();
    link(manager, &mut store, "I1", "I2", Dependency).unwrap();
    link(manager, &mut store, "I2", "I3", Dependency).unwrap();
    link(manager, &mut store, "I3", "I1", Complements).unwrap();

    let tree = manager.dependency_tree(&store, &fid(), &id("I1"), None);
    let reached: Vec<(String, usize)> = tree
        .iter()
        .map(|entry| (entry.item_id.to_string(), entry.depth))
        .collect();
    assert_eq!(reached, [("I2".to_string(), 1), ("I3".to_string(), 2)]);

    let shallow = manager.dependents_tree(&store, &fid(), &id("I3"), Some(1));
    assert_eq!(shallow.len(), 1);
    assert_eq!(shallow[0].item_id, id("I2"));
    assert_eq!(shallow[0].parent, id("I3"));
}
