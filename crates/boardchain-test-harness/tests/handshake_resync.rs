use std::time::Duration;

use boardchain_procmgr::send_control;
use boardchain_test_harness::BoardHarness;
use boardchain_types::RecordId;
use boardchain_wire::{ControlRequest, ControlResponse};

#[tokio::test]
async fn reconnecting_a_disconnected_successor_delivers_exactly_the_missing_messages() {
    let logs = tempfile::tempdir().unwrap();
    let nodes = BoardHarness::spawn_chain(2, logs.path()).await.unwrap();
    let head = &nodes[0];
    let tail = &nodes[1];

    head.board.create_topic("t1".into(), "general".into()).await.unwrap();
    head.board.create_user("u1".into(), "alice".into()).await.unwrap();

    for i in 0..10 {
        let confirmation = head
            .board
            .create_message(format!("before-{i}"), RecordId::new(1), RecordId::new(1), format!("msg{i}"), 0)
            .await
            .unwrap();
        assert!(confirmation.ok, "{}", confirmation.error);
    }

    let response = send_control(&head.descriptor.control_addr, ControlRequest::SwitchSuccessor { address: String::new() })
        .await
        .unwrap();
    assert_eq!(response, ControlResponse::Ok);
    tokio::time::sleep(Duration::from_millis(50)).await;

    for i in 0..5 {
        let confirmation = head
            .board
            .create_message(format!("during-{i}"), RecordId::new(1), RecordId::new(1), format!("gap{i}"), 0)
            .await
            .unwrap();
        assert!(confirmation.ok, "{}", confirmation.error);
    }

    let response = send_control(
        &head.descriptor.control_addr,
        ControlRequest::SwitchSuccessor { address: tail.descriptor.ingress_addr.clone() },
    )
    .await
    .unwrap();
    assert_eq!(response, ControlResponse::Ok);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let count = tail.board.list_messages_in_topic(RecordId::new(1), 0).await.len();
        if count == 15 {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "tail only has {count}/15 messages after resync");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
