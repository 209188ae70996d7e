//! Integration tests for configuration driving store setup and seeding.

use role_catalog::catalog::{bootstrap, CatalogResolver, CatalogStore};
use role_catalog::config::{ConfigError, ConfigLoader};

#[tokio::test]
async fn test_config_selects_database_and_seed_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("data").join("catalog.db");
    let seed_path = temp_dir.path().join("seed.toml");
    let config_path = temp_dir.path().join("config.toml");

    std::fs::write(
        &seed_path,
        r#"
        roles = [{ id = 7, name = "Tester", description = "Breaks things on purpose." }]
        qualities = [{ id = 1, name = "Curiosidad" }]
        role_qualities = [{ role = 7, quality = 1 }]
        "#,
    )
    .unwrap();
    std::fs::write(
        &config_path,
        format!(
            "[server]\nport = 8088\n\n[database]\npath = {:?}\nseed_file = {:?}\n",
            db_path.display().to_string(),
            seed_path.display().to_string()
        ),
    )
    .unwrap();

    let config = ConfigLoader::with_path(config_path).load().unwrap().config;
    assert_eq!(config.server.port, 8088);
    assert!(config.database.seed_on_start);
    assert!(!config.database.is_in_memory());
    assert_eq!(config.database.resolved_path(), db_path);

    let store = CatalogStore::open(config.database.resolved_path())
        .await
        .unwrap();
    assert!(bootstrap(&store, config.database.seed_file.as_deref())
        .await
        .unwrap());
    assert!(db_path.exists());

    let resolver = CatalogResolver::new(store);
    let detail = resolver.role_detail(7).await.unwrap();
    assert_eq!(detail.role.name, "Tester");
    assert_eq!(detail.qualities.len(), 1);
    assert_eq!(detail.qualities[0].name, "Curiosidad");
}

#[tokio::test]
async fn test_relative_database_path_is_next_to_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[database]\npath = \"state/catalog.db\"\n").unwrap();

    let config = ConfigLoader::with_path(config_path).load().unwrap().config;
    let store = CatalogStore::open(config.database.resolved_path())
        .await
        .unwrap();
    assert!(bootstrap(&store, None).await.unwrap());
    assert!(temp_dir.path().join("state").join("catalog.db").exists());
}

#[tokio::test]
async fn test_in_memory_database_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[database]\npath = \":memory:\"\nseed_on_start = false\n",
    )
    .unwrap();

    let config = ConfigLoader::with_path(config_path).load().unwrap().config;
    assert!(config.database.is_in_memory());
    assert!(!config.database.seed_on_start);
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[server]\nport = \"not a number\"\n").unwrap();

    let err = ConfigLoader::with_path(config_path).load().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[tokio::test]
async fn test_invalid_seed_file_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let seed_path = temp_dir.path().join("seed.toml");
    std::fs::write(
        &seed_path,
        r#"
        roles = [{ id = 1, name = "A" }, { id = 2, name = "A" }]
        "#,
    )
    .unwrap();

    let store = CatalogStore::open_in_memory().await.unwrap();
    let err = bootstrap(&store, Some(&seed_path)).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.count_roles().await.unwrap(), 0);
}
