//! Integration tests for the catalog store and relationship resolver.

use std::collections::HashSet;

use role_catalog::catalog::{
    bootstrap, CatalogError, CatalogResolver, CatalogStore, Entity, SeedData,
};

async fn resolver_with(data: SeedData) -> CatalogResolver {
    let store = CatalogStore::open_in_memory()
        .await
        .expect("Failed to open store");
    assert!(store.seed_if_empty(data).await.expect("Failed to seed"));
    CatalogResolver::new(store)
}

async fn baseline() -> (CatalogResolver, SeedData) {
    let data = SeedData::baseline().expect("Baseline should parse");
    (resolver_with(data.clone()).await, data)
}

/// Seeding then listing returns exactly the inserted roles.
#[tokio::test]
async fn test_list_roles_round_trip() {
    let (resolver, data) = baseline().await;

    let listed: HashSet<(i64, String)> = resolver
        .store()
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();
    let inserted: HashSet<(i64, String)> =
        data.roles.into_iter().map(|r| (r.id, r.name)).collect();

    assert_eq!(listed, inserted);
}

/// A role linked to one knowledge item reports exactly that item with its level.
#[tokio::test]
async fn test_role_detail_single_knowledge() {
    let data = SeedData::from_toml_str(
        r#"
        roles = [{ id = 1, name = "Backend Developer" }]
        knowledge = [{ id = 2, name = "SQL" }]
        role_knowledge = [{ role = 1, knowledge = 2, level = 4 }]
        "#,
    )
    .unwrap();
    let resolver = resolver_with(data).await;

    let detail = resolver.role_detail(1).await.unwrap();
    assert_eq!(detail.knowledge.len(), 1);
    assert_eq!(detail.knowledge[0].knowledge, Entity::new(2, "SQL"));
    assert_eq!(detail.knowledge[0].level, 4);
    assert!(detail.qualities.is_empty());
    assert!(detail.pathways.is_empty());
}

/// Items of one level keep insertion order and levels ascend.
#[tokio::test]
async fn test_pathway_detail_levels() {
    let data = SeedData::from_toml_str(
        r#"
        roles = [{ id = 1, name = "Web Developer" }]
        pathways = [{ id = 1, name = "Web Dev" }]
        knowledge = [
          { id = 1, name = "C" },
          { id = 2, name = "B" },
          { id = 3, name = "A" },
        ]
        role_pathways = [{ role = 1, pathway = 1 }]
        pathway_knowledge = [
          { pathway = 1, knowledge = 3, level = 0 },
          { pathway = 1, knowledge = 1, level = 1 },
          { pathway = 1, knowledge = 2, level = 0 },
        ]
        "#,
    )
    .unwrap();
    let resolver = resolver_with(data).await;

    let detail = resolver.pathway_detail("Web Dev").await.unwrap();
    let shape: Vec<(i64, Vec<&str>)> = detail
        .knowledge_by_level
        .iter()
        .map(|g| {
            (
                g.level,
                g.items.iter().map(|i| i.knowledge.name.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(shape, vec![(0, vec!["A", "B"]), (1, vec!["C"])]);
    assert_eq!(detail.roles, vec![Entity::new(1, "Web Developer")]);
}

/// Every pathway/knowledge link shows up in the bucket of its stored level.
#[tokio::test]
async fn test_pathway_buckets_match_stored_levels() {
    let (resolver, data) = baseline().await;

    for role in &data.roles {
        let detail = resolver.role_detail(role.id).await.unwrap();
        for pathway in &detail.pathways {
            let pathway_detail = resolver.pathway_detail(&pathway.name).await.unwrap();

            let levels: Vec<i64> = pathway_detail
                .knowledge_by_level
                .iter()
                .map(|g| g.level)
                .collect();
            let mut sorted = levels.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(levels, sorted, "Levels must be strictly ascending");

            for link in data
                .pathway_knowledge
                .iter()
                .filter(|l| l.pathway == pathway.id)
            {
                let bucket = pathway_detail
                    .knowledge_by_level
                    .iter()
                    .find(|g| g.level == link.level)
                    .expect("Bucket for stored level");
                assert!(
                    bucket.items.iter().any(|i| i.knowledge.id == link.knowledge),
                    "Knowledge {} missing from level {} of {}",
                    link.knowledge,
                    link.level,
                    pathway.name
                );
            }
        }
    }
}

/// No related list of a role contains the same id twice.
#[tokio::test]
async fn test_role_detail_has_no_duplicates() {
    let (resolver, data) = baseline().await;

    for role in &data.roles {
        let detail = resolver.role_detail(role.id).await.unwrap();

        let ids: Vec<i64> = detail.qualities.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), ids.iter().collect::<HashSet<_>>().len());

        let ids: Vec<i64> = detail.knowledge.iter().map(|k| k.knowledge.id).collect();
        assert_eq!(ids.len(), ids.iter().collect::<HashSet<_>>().len());

        let ids: Vec<i64> = detail.pathways.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), ids.iter().collect::<HashSet<_>>().len());
    }
}

/// Unknown ids and names are reported as not found, never as partial results.
#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let (resolver, _) = baseline().await;

    let err = resolver.role_detail(0).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    for name in ["", " ", "No existe"] {
        assert!(resolver.quality_detail(name).await.unwrap_err().is_not_found());
        assert!(resolver
            .knowledge_detail(name)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(resolver.pathway_detail(name).await.unwrap_err().is_not_found());
    }
}

/// Entities without relation rows resolve to empty lists.
#[tokio::test]
async fn test_unlinked_entities_have_empty_lists() {
    let data = SeedData::from_toml_str(
        r#"
        roles = [{ id = 1, name = "Lonely" }]
        qualities = [{ id = 1, name = "Patience" }]
        knowledge = [{ id = 1, name = "COBOL" }]
        pathways = [{ id = 1, name = "Empty" }]
        "#,
    )
    .unwrap();
    let resolver = resolver_with(data).await;

    let quality = resolver.quality_detail("Patience").await.unwrap();
    assert!(quality.roles.is_empty() && quality.pathways.is_empty());

    let knowledge = resolver.knowledge_detail("COBOL").await.unwrap();
    assert!(knowledge.roles.is_empty());
    assert!(knowledge.pathways.is_empty());
    assert!(knowledge.categories.is_empty());
    assert!(knowledge.related.is_empty());

    let pathway = resolver.pathway_detail("Empty").await.unwrap();
    assert!(pathway.knowledge_by_level.is_empty() && pathway.roles.is_empty());
}

/// A file-backed store keeps its rows and is not seeded twice.
#[tokio::test]
async fn test_bootstrap_is_idempotent_across_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    {
        let store = CatalogStore::open(&db_path).await.unwrap();
        assert!(bootstrap(&store, None).await.unwrap());
    }

    let store = CatalogStore::open(&db_path).await.unwrap();
    assert!(!bootstrap(&store, None).await.unwrap());
    assert_eq!(store.count_roles().await.unwrap(), 4);
    assert_eq!(store.list_categories().await.unwrap().len(), 4);
}

/// Many readers can query the same resolver at once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads() {
    let (resolver, data) = baseline().await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        for role in &data.roles {
            let resolver = resolver.clone();
            let id = role.id;
            handles.push(tokio::spawn(async move { resolver.role_detail(id).await }));
        }
    }

    for handle in handles {
        let detail = handle.await.expect("Task panicked").expect("Query failed");
        assert!(!detail.pathways.is_empty());
    }
}
