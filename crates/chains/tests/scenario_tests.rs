//! End-to-end chain scenarios through the resolver and in-memory adapters.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use questgraph_chains::{
    ChainDefinition, ChainId, ChainResolver, Completability, Error, InMemoryCatalog,
    InMemoryQuestStore, PrerequisiteEdge, QuestChain, QuestId, QuestNodeRef,
};
use std::collections::HashSet;
use std::sync::Arc;

struct Harness {
    store: Arc<InMemoryQuestStore>,
    catalog: Arc<InMemoryCatalog>,
    resolver: ChainResolver,
}

fn harness(quests: &[&str]) -> Harness {
    let store = Arc::new(InMemoryQuestStore::new());
    let catalog = Arc::new(InMemoryCatalog::with_quests(quests.iter().copied()));
    let resolver = ChainResolver::new(store.clone(), catalog.clone());
    Harness {
        store,
        catalog,
        resolver,
    }
}

fn chain(nodes: &[&str], edges: &[(&str, &str)]) -> ChainDefinition {
    let def = nodes
        .iter()
        .fold(ChainDefinition::new(), |def, id| def.with_quest(*id, id.to_uppercase()));
    edges
        .iter()
        .fold(def, |def, (from, to)| def.with_prerequisite(*from, *to))
}

fn ids(nodes: &[QuestNodeRef]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

fn completed(ids: &[&str]) -> HashSet<QuestId> {
    ids.iter().map(|id| QuestId::from(*id)).collect()
}

#[tokio::test]
async fn linear_chain_resolves_in_order() {
    let h = harness(&["a", "b", "c"]);
    let created = h
        .resolver
        .create_chain(chain(&["a", "b", "c"], &[("a", "b"), ("b", "c")]))
        .await
        .unwrap();
    let id = created.id();

    assert_eq!(ids(&h.resolver.order(id).await.unwrap()), vec!["a", "b", "c"]);
    assert_eq!(
        ids(&h.resolver.next_eligible(id, &completed(&[])).await.unwrap()),
        vec!["a"]
    );
    assert_eq!(
        ids(&h.resolver.next_eligible(id, &completed(&["a"])).await.unwrap()),
        vec!["b"]
    );
    assert!(
        h.resolver
            .next_eligible(id, &completed(&["a", "b", "c"]))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn cyclic_chain_is_rejected_with_members() {
    let h = harness(&["a", "b", "c"]);
    let err = h
        .resolver
        .create_chain(chain(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]))
        .await
        .unwrap_err();

    assert!(err.is_cycle());
    assert_eq!(ids(err.cycle_members().unwrap()), vec!["a", "b", "c"]);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn dangling_edge_is_rejected() {
    // "c" exists in the catalog but was never added to the chain
    let h = harness(&["a", "b", "c"]);
    let err = h
        .resolver
        .create_chain(chain(&["a", "b"], &[("a", "b"), ("a", "c")]))
        .await
        .unwrap_err();

    match err {
        Error::Graph(questgraph_graph::Error::DanglingReference { edge }) => {
            assert_eq!(edge, PrerequisiteEdge::new("a", "c"));
        }
        other => panic!("expected dangling reference, got {other:?}"),
    }
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn diamond_unlocks_join_after_both_branches() {
    let h = harness(&["a", "b", "c", "d"]);
    let created = h
        .resolver
        .create_chain(chain(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        ))
        .await
        .unwrap();
    let id = created.id();

    assert_eq!(
        ids(&h.resolver.order(id).await.unwrap()),
        vec!["a", "b", "c", "d"]
    );
    assert_eq!(
        ids(&h.resolver.next_eligible(id, &completed(&["a"])).await.unwrap()),
        vec!["b", "c"]
    );
    assert_eq!(
        ids(&h.resolver.next_eligible(id, &completed(&["a", "b"])).await.unwrap()),
        vec!["c"]
    );
    assert_eq!(
        ids(&h
            .resolver
            .next_eligible(id, &completed(&["a", "b", "c"]))
            .await
            .unwrap()),
        vec!["d"]
    );
}

#[tokio::test]
async fn rejected_mutations_leave_snapshot_untouched() {
    let h = harness(&["a", "b", "c"]);
    let before = h
        .resolver
        .create_chain(chain(&["a", "b"], &[("a", "b")]))
        .await
        .unwrap();
    let id = before.id().clone();

    let attempts = [
        h.resolver
            .add_node(&id, QuestNodeRef::new("ghost", "Ghost"))
            .await,
        h.resolver.add_node(&id, QuestNodeRef::new("a", "A")).await,
        h.resolver
            .add_edge(&id, PrerequisiteEdge::new("b", "a"))
            .await,
        h.resolver
            .add_edge(&id, PrerequisiteEdge::new("a", "c"))
            .await,
        h.resolver.remove_node(&id, &"c".into()).await,
        h.resolver
            .remove_edge(&id, &PrerequisiteEdge::new("b", "a"))
            .await,
    ];
    assert!(attempts.iter().all(Result::is_err));

    let after = h.resolver.get(&id).await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn quest_removed_from_catalog_blocks_further_edits() {
    let h = harness(&["a", "b", "c"]);
    let id = h
        .resolver
        .create_chain(chain(&["a", "b"], &[("a", "b")]))
        .await
        .unwrap()
        .id()
        .clone();

    h.catalog.remove(&"a".into());
    let err = h
        .resolver
        .add_node(&id, QuestNodeRef::new("c", "C"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownQuest { ref id } if id.as_str() == "a"));
}

#[tokio::test]
async fn out_of_band_cycle_is_caught_on_read() {
    let h = harness(&["a", "b"]);
    let id = h
        .resolver
        .create_chain(chain(&["a", "b"], &[("a", "b")]))
        .await
        .unwrap()
        .id()
        .clone();

    h.store.replace_unchecked(QuestChain::from_parts(
        id.clone(),
        0,
        chain(&["a", "b"], &[("a", "b"), ("b", "a")]),
    ));

    let err = h.resolver.order(&id).await.unwrap_err();
    assert_eq!(ids(err.cycle_members().unwrap()), vec!["a", "b"]);

    assert!(h.resolver.tiers(&id).await.is_err());
    assert!(
        h.resolver
            .next_eligible(&id, &completed(&[]))
            .await
            .unwrap()
            .is_empty()
    );

    match h.resolver.is_completable(&id).await.unwrap() {
        Completability::Blocked { cycle } => assert_eq!(ids(&cycle), vec!["a", "b"]),
        Completability::Completable => panic!("cyclic chain reported completable"),
    }
}

#[tokio::test]
async fn quests_outside_an_out_of_band_cycle_stay_eligible() {
    let h = harness(&["r", "a", "b", "s"]);
    let id = h
        .resolver
        .create_chain(chain(&["r", "a", "b", "s"], &[("r", "s")]))
        .await
        .unwrap()
        .id()
        .clone();

    h.store.replace_unchecked(QuestChain::from_parts(
        id.clone(),
        0,
        chain(&["r", "a", "b", "s"], &[("r", "s"), ("a", "b"), ("b", "a")]),
    ));

    assert_eq!(
        ids(&h.resolver.next_eligible(&id, &completed(&[])).await.unwrap()),
        vec!["r"]
    );
    assert_eq!(
        ids(&h.resolver.next_eligible(&id, &completed(&["r"])).await.unwrap()),
        vec!["s"]
    );
    assert!(h.resolver.order(&id).await.unwrap_err().is_cycle());
}

#[tokio::test]
async fn unknown_chain_is_not_found() {
    let h = harness(&["a"]);
    let err = h
        .resolver
        .is_completable(&ChainId::from("chain-404"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
