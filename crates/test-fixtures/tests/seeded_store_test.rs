use somigrate_core::traits::DocumentStore;
use test_fixtures::{kibana_1_store, seeded_store, KIBANA_1, KIBANA_1_MIGRATED};

#[tokio::test]
async fn kibana_1_store_resolves_the_current_alias() {
    let store = kibana_1_store();
    let found = store.get_indices(&[".kibana".to_string()]).await.unwrap();
    assert_eq!(found.keys().collect::<Vec<_>>(), ["kibana_1"]);
    assert_eq!(store.documents("kibana_1").len(), 3);
}

#[test]
fn later_fixture_replaces_an_index_of_the_same_name() {
    let store = seeded_store(&[KIBANA_1, KIBANA_1_MIGRATED]);
    assert_eq!(store.documents("kibana_1").len(), 1);
    assert_eq!(store.alias_targets(".kibana_8.8.0"), vec!["kibana_1".to_string()]);
}
