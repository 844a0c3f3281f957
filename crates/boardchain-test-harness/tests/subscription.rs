use boardchain_test_harness::BoardHarness;
use boardchain_types::{Op, Payload, RecordId};

#[tokio::test]
async fn subscriber_on_a_mid_node_sees_every_confirmed_create() {
    let logs = tempfile::tempdir().unwrap();
    let nodes = BoardHarness::spawn_chain(3, logs.path()).await.unwrap();
    let head = &nodes[0].board;
    let mid = &nodes[1].board;

    let mut events = mid.subscribe();

    head.create_topic("t1".into(), "general".into()).await.unwrap();
    head.create_user("u1".into(), "alice".into()).await.unwrap();
    for i in 0..3 {
        let confirmation =
            head.create_message(format!("m{i}"), RecordId::new(1), RecordId::new(1), format!("msg{i}"), 0).await.unwrap();
        assert!(confirmation.ok, "{}", confirmation.error);
    }

    let mut creates = Vec::new();
    while creates.len() < 3 {
        let event = tokio::time::timeout(std::time::Duration::from_secs(2), events.recv())
            .await
            .expect("event should arrive")
            .expect("channel should stay open");
        if event.op == Op::Create && matches!(event.payload, Payload::Message(_)) {
            creates.push(event);
        }
    }
    assert_eq!(creates.len(), 3);
}
