mod common;

use common::{fixtures, init_test_tracing, TestEnvironment};
use permigrate::{ForeignKey, SchemaInspector};
use tokio_postgres::IsolationLevel;

#[tokio::test]
async fn test_list_tables_orders_by_name_and_skips_views() -> Result<(), Box<dyn std::error::Error>> {
    init_test_tracing();
    let env = TestEnvironment::new().await?;
    env.execute_sql(fixtures::PERMISSIONS_SCHEMA).await?;
    env.execute_sql(fixtures::OUTSIDE_OBJECTS).await?;

    let tables = SchemaInspector::new(&env.client).list_tables("public").await?;
    assert_eq!(tables, vec!["roles", "user_roles", "users"]);

    let audit = SchemaInspector::new(&env.client).list_tables("audit").await?;
    assert_eq!(audit, vec!["role_changes"]);

    Ok(())
}

#[tokio::test]
async fn test_list_tables_of_empty_schema() -> Result<(), Box<dyn std::error::Error>> {
    init_test_tracing();
    let env = TestEnvironment::new().await?;

    let inspector = SchemaInspector::new(&env.client);
    assert!(inspector.list_tables("public").await?.is_empty());
    assert!(inspector.list_tables("no_such_schema").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_foreign_keys() -> Result<(), Box<dyn std::error::Error>> {
    init_test_tracing();
    let env = TestEnvironment::new().await?;
    env.execute_sql(fixtures::PERMISSIONS_SCHEMA).await?;
    env.execute_sql(fixtures::OUTSIDE_OBJECTS).await?;

    let inspector = SchemaInspector::new(&env.client);
    let tables = inspector.list_tables("public").await?;
    let fks = inspector.list_foreign_keys("public", &tables).await?;

    let pairs: Vec<String> = fks.iter().map(ToString::to_string).collect();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.contains(&"user_roles.user_id -> users.id".to_string()));
    assert!(pairs.contains(&"user_roles.role_id -> roles.id".to_string()));

    // audit.role_changes references public.roles but lives elsewhere
    assert!(fks.iter().all(|fk| fk.from_table != "role_changes"));
    assert!(fks.iter().all(|fk| fk.constraint.is_some()));

    Ok(())
}

#[tokio::test]
async fn test_foreign_keys_restricted_to_given_tables() -> Result<(), Box<dyn std::error::Error>> {
    init_test_tracing();
    let env = TestEnvironment::new().await?;
    env.execute_sql(fixtures::PERMISSIONS_SCHEMA).await?;

    let inspector = SchemaInspector::new(&env.client);
    let subset = vec!["user_roles".to_string(), "users".to_string()];
    let fks = inspector.list_foreign_keys("public", &subset).await?;

    assert_eq!(fks, vec![
        ForeignKey::new("user_roles", "user_id", "users", "id")
            .with_constraint("user_roles_user_id_fkey"),
    ]);

    assert!(inspector.list_foreign_keys("public", &[]).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_composite_and_self_references() -> Result<(), Box<dyn std::error::Error>> {
    init_test_tracing();
    let env = TestEnvironment::new().await?;
    env.execute_sql(fixtures::PERMISSIONS_SCHEMA).await?;
    env.execute_sql(fixtures::GRANTS_SCHEMA).await?;
    env.execute_sql(fixtures::FOLDER_TREE).await?;

    let snapshot = SchemaInspector::new(&env.client).snapshot("public").await?;

    let membership: Vec<&ForeignKey> = snapshot.foreign_keys
        .iter()
        .filter(|fk| fk.constraint.as_deref() == Some("grants_membership_fkey"))
        .collect();
    assert_eq!(membership.len(), 2);
    assert_eq!(membership[0].from_column, "user_id");
    assert_eq!(membership[0].to_column, "user_id");
    assert_eq!(membership[1].from_column, "role_id");
    assert_eq!(membership[1].to_column, "role_id");

    assert!(snapshot.foreign_keys
        .iter()
        .any(|fk| fk.from_table == "folders" && fk.to_table == "folders"));

    Ok(())
}

#[tokio::test]
async fn test_snapshot_inside_repeatable_read_transaction() -> Result<(), Box<dyn std::error::Error>> {
    init_test_tracing();
    let mut env = TestEnvironment::new().await?;
    env.execute_sql(fixtures::PERMISSIONS_SCHEMA).await?;

    let tx = env.client
        .build_transaction()
        .isolation_level(IsolationLevel::RepeatableRead)
        .read_only(true)
        .start()
        .await?;

    let snapshot = SchemaInspector::new(&tx).snapshot("public").await?;
    tx.rollback().await?;

    assert_eq!(snapshot.namespace, "public");
    assert_eq!(snapshot.tables, vec!["roles", "user_roles", "users"]);
    assert_eq!(snapshot.foreign_keys.len(), 2);

    Ok(())
}
