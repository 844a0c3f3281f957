use boardchain_store::{Database, Relation};
use boardchain_types::{Entity, Op, Payload};

/// Applies one replicated write against the store and resolves the
/// resulting [`boardchain_store::Receipt`] immediately — chain nodes never
/// hold a write open across a suspension point, since confirmation is
/// driven purely by the downstream chain rather than a second local
/// decision.
pub async fn apply(db: &Database, op: Op, payload: Payload) -> std::result::Result<(), String> {
    match payload {
        Payload::User(entity) => apply_one(&db.users, op, entity).await,
        Payload::Topic(entity) => apply_one(&db.topics, op, entity).await,
        Payload::Message(entity) => apply_one(&db.messages, op, entity).await,
        Payload::Like(entity) => apply_one(&db.likes, op, entity).await,
    }
}

async fn apply_one<E: Entity + Send + 'static>(relation: &Relation<E>, op: Op, entity: E) -> std::result::Result<(), String> {
    let receipt = match op {
        Op::Create => relation.insert(entity).await,
        Op::Update => {
            let id = entity.id();
            relation.update(id, move |_old| entity).await
        }
        Op::Delete => relation.delete(entity.id()).await,
    };

    let receipt = receipt.map_err(|err| err.to_string())?;
    receipt.confirm().await.map_err(|err| err.to_string())
}
