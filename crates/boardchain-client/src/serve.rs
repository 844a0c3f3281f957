use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, instrument, warn};

use boardchain_wire::{BoardRequest, BoardResponse};

use crate::board::BoardClient;
use crate::framed::{write_frame, FrameReader};

/// Answers a data node's client-facing service-addr surface: unary
/// CRUD/list requests get one response and the connection moves on to the
/// next frame; `Subscribe` switches the connection to server-streaming
/// `BoardResponse::Event` frames until the peer disconnects.
#[instrument(skip(board), fields(addr))]
pub async fn serve(board: BoardClient, subscribe_token: &str, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "board rpc connection accepted");
        let board = board.clone();
        let subscribe_token = subscribe_token.to_string();
        tokio::spawn(async move {
            if let Err(err) = handle_one(board, &subscribe_token, stream).await {
                warn!(%peer, %err, "board rpc connection ended");
            }
        });
    }
}

async fn handle_one(board: BoardClient, subscribe_token: &str, stream: TcpStream) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = FrameReader::new(read_half);
    let request: BoardRequest = reader.read_one().await?;

    if let BoardRequest::Subscribe { subscribe_token: presented } = request {
        if presented != subscribe_token {
            write_frame(&mut write_half, &BoardResponse::Err("invalid subscribe token".to_string())).await?;
            return Ok(());
        }
        let mut events = board.subscribe();
        loop {
            match events.recv().await {
                Ok(event) => write_frame(&mut write_half, &BoardResponse::Event(event)).await?,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return Ok(()),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged behind the event stream");
                    continue;
                }
            }
        }
    }

    let response = dispatch(&board, request).await;
    write_frame(&mut write_half, &response).await
}

async fn dispatch(board: &BoardClient, request: BoardRequest) -> BoardResponse {
    match request {
        BoardRequest::Submit { request_id, op, payload } => match board.submit(request_id, op, payload).await {
            Ok(confirmation) => BoardResponse::Confirmation(confirmation),
            Err(err) => BoardResponse::Err(err.to_string()),
        },
        BoardRequest::ListUsers => BoardResponse::Users(board.list_users().await),
        BoardRequest::ListTopics => BoardResponse::Topics(board.list_topics().await),
        BoardRequest::ListMessagesInTopic { topic_id, limit } => {
            BoardResponse::Messages(board.list_messages_in_topic(topic_id, limit).await)
        }
        BoardRequest::ListLikesForMessage { message_id } => {
            BoardResponse::Likes(board.list_likes_for_message(message_id).await)
        }
        BoardRequest::Subscribe { .. } => unreachable!("handled in handle_one before dispatch"),
    }
}
