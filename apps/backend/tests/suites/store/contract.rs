// Behaviour every CoordinationStore must share. Runs against MemoryStore,
// and against Redis too when REDIS_URL points at a disposable instance.

use std::sync::Arc;
use std::time::Duration;

use achi_backend::store::memory::MemoryStore;
use achi_backend::store::redis_store::RedisStore;
use achi_backend::store::{CommitOutcome, CoordinationStore, WriteSet, UNWRITTEN};
use futures_util::StreamExt;
use uuid::Uuid;

async fn stores() -> Vec<(&'static str, Arc<dyn CoordinationStore>)> {
    let mut stores: Vec<(&'static str, Arc<dyn CoordinationStore>)> =
        vec![("memory", Arc::new(MemoryStore::new()))];
    if let Ok(url) = std::env::var("REDIS_URL") {
        let redis = RedisStore::connect(&url).await.expect("REDIS_URL should be reachable");
        stores.push(("redis", Arc::new(redis)));
    }
    stores
}

/// Keys unique to one test run so a shared Redis is not polluted.
fn fresh_keys(n: usize) -> Vec<String> {
    let run = Uuid::new_v4();
    (0..n).map(|i| format!("test:{run}:{i}")).collect()
}

#[tokio::test]
async fn unwritten_keys_read_as_absent() {
    for (name, store) in stores().await {
        let keys = fresh_keys(2);
        let snapshot = store.read(&keys).await.unwrap();
        for key in &keys {
            assert_eq!(snapshot.raw(key), None, "{name}");
            assert_eq!(snapshot.version(key), UNWRITTEN, "{name}");
        }
    }
}

#[tokio::test]
async fn commit_is_all_or_nothing_on_a_stale_snapshot() {
    for (name, store) in stores().await {
        let keys = fresh_keys(2);
        let (a, b) = (keys[0].clone(), keys[1].clone());
        let stale = store.read(&keys).await.unwrap();

        let mut first = WriteSet::new();
        first.put_json(a.clone(), &"first").unwrap();
        assert_eq!(store.commit(&stale, first).await.unwrap(), CommitOutcome::Committed, "{name}");

        let mut second = WriteSet::new();
        second.put_json(a.clone(), &"second").unwrap();
        second.put_json(b.clone(), &"second").unwrap();
        assert_eq!(store.commit(&stale, second).await.unwrap(), CommitOutcome::Conflict, "{name}");

        let now = store.read(&keys).await.unwrap();
        assert_eq!(now.get::<String>(&a).unwrap().as_deref(), Some("first"), "{name}");
        assert_eq!(now.raw(&b), None, "{name}");
    }
}

#[tokio::test]
async fn delete_then_recreate_needs_a_fresh_snapshot() {
    for (name, store) in stores().await {
        let keys = fresh_keys(1);
        let key = keys[0].clone();

        let snapshot = store.read(&keys).await.unwrap();
        let mut put = WriteSet::new();
        put.put_json(key.clone(), &1).unwrap();
        store.commit(&snapshot, put).await.unwrap();

        let live = store.read(&keys).await.unwrap();
        let mut delete = WriteSet::new();
        delete.delete(key.clone());
        assert_eq!(store.commit(&live, delete).await.unwrap(), CommitOutcome::Committed, "{name}");

        let mut recreate = WriteSet::new();
        recreate.put_json(key.clone(), &2).unwrap();
        assert_eq!(store.commit(&live, recreate).await.unwrap(), CommitOutcome::Conflict, "{name}");

        let gone = store.read(&keys).await.unwrap();
        assert_eq!(gone.raw(&key), None, "{name}");
        assert!(gone.version(&key) > live.version(&key), "{name}");
    }
}

#[tokio::test]
async fn published_payloads_arrive_in_order() {
    for (name, store) in stores().await {
        let channel = format!("events:player:{}", Uuid::new_v4());
        let mut sub = store.subscribe(&channel).await.unwrap();

        for payload in ["one", "two", "three"] {
            store.publish(&channel, payload).await.unwrap();
        }

        let mut got = Vec::new();
        for _ in 0..3 {
            let next = tokio::time::timeout(Duration::from_secs(2), sub.next())
                .await
                .unwrap_or_else(|_| panic!("{name}: timed out"));
            got.push(next.unwrap_or_else(|| panic!("{name}: stream ended")));
        }
        assert_eq!(got, vec!["one", "two", "three"], "{name}");
    }
}

#[tokio::test]
async fn ping_succeeds_on_a_healthy_store() {
    for (name, store) in stores().await {
        assert!(store.ping().await.is_ok(), "{name}");
    }
}
