use boardchain_store::RecordState;
use boardchain_test_harness::BoardHarness;
use boardchain_types::RecordId;

#[tokio::test]
async fn write_then_read_comes_back_clean() {
    let logs = tempfile::tempdir().unwrap();
    let nodes = BoardHarness::spawn_chain(1, logs.path()).await.unwrap();
    let node = &nodes[0].board;

    node.create_topic("t1".into(), "general".into()).await.unwrap();
    node.create_user("u1".into(), "alice".into()).await.unwrap();
    let confirmation =
        node.create_message("m1".into(), RecordId::new(1), RecordId::new(1), "a".into(), 0).await.unwrap();
    assert!(confirmation.ok, "{}", confirmation.error);
    assert_eq!(confirmation.message_index, 3);

    let stored = node.get_message(RecordId::new(1)).await.expect("message should exist");
    assert_eq!(stored.state, RecordState::Clean);
    assert_eq!(stored.confirmed.unwrap().text, "a");
}
