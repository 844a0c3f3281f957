use boardchain_test_harness::BoardHarness;

#[tokio::test]
async fn duplicate_unique_key_is_rejected_before_replication() {
    let logs = tempfile::tempdir().unwrap();
    let nodes = BoardHarness::spawn_chain(2, logs.path()).await.unwrap();
    let head = &nodes[0].board;

    let first = head.create_user("u1".into(), "alice".into()).await.unwrap();
    assert!(first.ok);

    let second = head.create_user("u2".into(), "alice".into()).await.unwrap();
    assert!(!second.ok);
    assert!(second.error.contains("unique"), "unexpected error: {}", second.error);

    assert_eq!(nodes[0].board.list_users().await.len(), 1);
    assert_eq!(nodes[1].board.list_users().await.len(), 1);
}
