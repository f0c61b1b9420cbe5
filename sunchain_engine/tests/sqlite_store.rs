use std::sync::Arc;

use sqlx::{migrate::MigrateDatabase, Sqlite};
use sunchain_common::{Address, Coin};
use sunchain_engine::{
    db_types::OrderId,
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    KeyValueStore,
    OrderFlowApi,
    SettlementConfig,
    SqliteDatabase,
    StoreBackend,
    StoreTransaction,
};
use tokio::task::JoinSet;

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database")
}

async fn tear_down(mut db: SqliteDatabase) {
    db.close().await.expect("Error closing database");
    Sqlite::drop_database(db.url()).await.unwrap();
}

#[tokio::test]
async fn committed_writes_are_persisted() {
    let db = setup().await;
    let mut tx = db.begin().await.unwrap();
    tx.set("order/1", b"first".to_vec()).await.unwrap();
    tx.set("order/2", b"second".to_vec()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    assert_eq!(tx.get("order/1").await.unwrap(), Some(b"first".to_vec()));
    assert!(tx.has("order/2").await.unwrap());
    assert!(!tx.has("order/3").await.unwrap());
    tx.set("order/1", b"replaced".to_vec()).await.unwrap();
    tx.delete("order/2").await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    assert_eq!(tx.get("order/1").await.unwrap(), Some(b"replaced".to_vec()));
    assert_eq!(tx.get("order/2").await.unwrap(), None);
    drop(tx);
    tear_down(db).await;
}

#[tokio::test]
async fn dropped_transactions_roll_back() {
    let db = setup().await;
    let mut tx = db.begin().await.unwrap();
    tx.set("order_count", 1u64.to_be_bytes().to_vec()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    tx.set("order_count", 2u64.to_be_bytes().to_vec()).await.unwrap();
    tx.set("order/2", b"pending".to_vec()).await.unwrap();
    // Uncommitted writes are visible inside the unit of work
    assert!(tx.has("order/2").await.unwrap());
    drop(tx);

    let mut tx = db.begin().await.unwrap();
    assert_eq!(tx.get("order_count").await.unwrap(), Some(1u64.to_be_bytes().to_vec()));
    assert!(!tx.has("order/2").await.unwrap());
    drop(tx);
    tear_down(db).await;
}

#[tokio::test]
async fn iterate_matches_prefix_literally() {
    let db = setup().await;
    let mut tx = db.begin().await.unwrap();
    for key in ["balance/alice/stake", "balance/alice/gold", "balance/alicia/stake", "balance/ALICE/stake", "balance_x"] {
        tx.set(key, vec![1]).await.unwrap();
    }
    tx.commit().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    let keys = tx.iterate("balance/alice/").await.unwrap().into_iter().map(|(k, _)| k).collect::<Vec<_>>();
    assert_eq!(keys, vec!["balance/alice/gold", "balance/alice/stake"]);
    // '_' is not a wildcard
    let keys = tx.iterate("balance_").await.unwrap().into_iter().map(|(k, _)| k).collect::<Vec<_>>();
    assert_eq!(keys, vec!["balance_x"]);
    drop(tx);
    tear_down(db).await;
}

#[tokio::test]
async fn concurrent_buys_are_queued_not_rejected() {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let api = OrderFlowApi::new(db, SettlementConfig::default(), EventProducers::default()).unwrap();
    api.open_channel("sunchain", "channel-0", "oracle", "channel-9").await.unwrap();
    api.bind_channel("bandchain", "sunchain", "channel-0").await.unwrap();
    let buyers = (0..8).map(|i| Address::from(format!("buyer{i}"))).collect::<Vec<_>>();
    for buyer in &buyers {
        api.mint(buyer, &Coin::new(100, "stake")).await.unwrap();
    }

    let api = Arc::new(api);
    let mut buys = JoinSet::new();
    for buyer in buyers.clone() {
        let api = api.clone();
        buys.spawn(async move { api.buy(&buyer, &"100stake".parse().unwrap()).await });
    }
    let mut ids = Vec::new();
    while let Some(result) = buys.join_next().await {
        ids.push(result.unwrap().unwrap());
    }
    ids.sort();
    assert_eq!(ids, (1..=8).map(OrderId).collect::<Vec<_>>());
    assert_eq!(api.order_count().await.unwrap(), 8);
    for buyer in &buyers {
        assert_eq!(api.balance(buyer, "stake").await.unwrap(), 0);
    }
    assert_eq!(api.balance(api.escrow_address(), "stake").await.unwrap(), 800);
    let packets = api.packet_commitments("sunchain", "channel-0").await.unwrap();
    assert_eq!(packets.len(), 8);

    tear_down(api.db().clone()).await;
}
