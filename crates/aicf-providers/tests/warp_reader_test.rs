use aicf_providers::{ProjectScope, SourceReader, WarpReader};
use aicf_testing::{TestWorld, seed_warp_db};
use serde_json::json;

#[test]
fn test_probes_conversations_and_filters_by_workspace() {
    let world = TestWorld::new().unwrap();
    let alpha = world.project_dir("alpha").unwrap();
    let db_path = world.warp_db_path();

    seed_warp_db(
        &db_path,
        &[
            (
                alpha.display().to_string(),
                json!({
                    "id": "w-1",
                    "timestamp": "2025-10-21T09:00:00Z",
                    "messages": [{"role": "user", "content": "profile the query"}],
                }),
            ),
            (
                format!("{}-experiments", alpha.display()),
                json!({
                    "id": "w-2",
                    "timestamp": "2025-10-21T09:30:00Z",
                    "messages": [{"role": "user", "content": "other project"}],
                }),
            ),
        ],
    )
    .unwrap();

    let reader = WarpReader::new(vec![db_path]);
    assert!(reader.is_available());

    let outcome = reader.read_all(&ProjectScope::new(&alpha)).unwrap();
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].conversation_id, "w-1");
    assert_eq!(outcome.records[0].workspace_name, "alpha");
}

#[test]
fn test_missing_db_is_unavailable() {
    let world = TestWorld::new().unwrap();
    let reader = WarpReader::new(vec![world.warp_db_path()]);
    assert!(!reader.is_available());
}

#[test]
fn test_unparseable_rows_are_skipped_not_fatal() {
    let world = TestWorld::new().unwrap();
    let alpha = world.project_dir("alpha").unwrap();
    let db_path = world.warp_db_path();

    seed_warp_db(
        &db_path,
        &[(
            alpha.display().to_string(),
            json!({
                "id": "w-1",
                "timestamp": "2025-10-21T09:00:00Z",
                "messages": [],
            }),
        )],
    )
    .unwrap();

    // One readable row, one corrupt: under the 50% threshold overall is
    // false here (1 of 2 fails), which aborts the source for the cycle.
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "INSERT INTO agent_conversations VALUES ('bad', 'not json', NULL, NULL)",
        [],
    )
    .unwrap();
    drop(conn);

    let reader = WarpReader::new(vec![db_path]);
    let result = reader.read_all(&ProjectScope::new(&alpha));
    assert!(matches!(
        result,
        Err(aicf_providers::Error::Corrupt { .. })
    ));
}
