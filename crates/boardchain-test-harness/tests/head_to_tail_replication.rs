use boardchain_test_harness::BoardHarness;
use boardchain_types::RecordId;

#[tokio::test]
async fn a_write_at_the_head_replicates_to_every_node() {
    let logs = tempfile::tempdir().unwrap();
    let nodes = BoardHarness::spawn_chain(3, logs.path()).await.unwrap();
    let head = &nodes[0].board;

    head.create_topic("t1".into(), "general".into()).await.unwrap();
    head.create_user("u1".into(), "alice".into()).await.unwrap();
    let confirmation =
        head.create_message("m1".into(), RecordId::new(1), RecordId::new(1), "hello".into(), 0).await.unwrap();
    assert!(confirmation.ok, "{}", confirmation.error);

    for handle in &nodes {
        let seen = handle.board.get_message(RecordId::new(1)).await.expect("every node should have replicated it");
        assert_eq!(seen.confirmed.unwrap().text, "hello");
    }
}
