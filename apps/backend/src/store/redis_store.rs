use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tracing::{debug, info};

use super::{CommitOutcome, CoordinationStore, Snapshot, StoreError, Subscription, WriteOp, WriteSet, UNWRITTEN};
use crate::error::AppError;

/// Checks every watched version, then applies the writes and bumps their
/// versions. Returns 1 on commit and 0 on conflict.
///
/// KEYS: watched version keys, then (data key, version key) pairs.
/// ARGV: watched count, expected versions, then (op, value) pairs.
const COMMIT_SCRIPT: &str = r#"
local watched = tonumber(ARGV[1])
for i = 1, watched do
  local current = tonumber(redis.call('GET', KEYS[i]) or '0')
  if current ~= tonumber(ARGV[i + 1]) then
    return 0
  end
end
local k = watched + 1
local a = watched + 2
while k <= #KEYS do
  if ARGV[a] == 'put' then
    redis.call('SET', KEYS[k], ARGV[a + 1])
  else
    redis.call('DEL', KEYS[k])
  end
  redis.call('INCR', KEYS[k + 1])
  k = k + 2
  a = a + 2
end
return 1
"#;

fn version_key(key: &str) -> String {
    format!("{key}:version")
}

/// Redis-backed store. Values live under their key and versions under
/// `{key}:version`; version keys are never deleted.
pub struct RedisStore {
    client: Client,
    conn: ConnectionManager,
    commit_script: Script,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(|err| AppError::store(StoreError::Redis(err)))?;

        info!("Connected to Redis coordination store");

        Ok(Self {
            client,
            conn,
            commit_script: Script::new(COMMIT_SCRIPT),
        })
    }
}

#[async_trait]
impl CoordinationStore for RedisStore {
    async fn read(&self, keys: &[String]) -> Result<Snapshot, StoreError> {
        let mut snapshot = Snapshot::new();
        if keys.is_empty() {
            return Ok(snapshot);
        }

        let args: Vec<String> = keys
            .iter()
            .flat_map(|key| [key.clone(), version_key(key)])
            .collect();

        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(&args).query_async(&mut conn).await?;
        if values.len() != args.len() {
            return Err(StoreError::Protocol(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                args.len()
            )));
        }

        for (key, pair) in keys.iter().zip(values.chunks(2)) {
            let version = match &pair[1] {
                Some(raw) => raw
                    .parse::<u64>()
                    .map_err(|_| StoreError::Protocol(format!("bad version for {key}: {raw}")))?,
                None => UNWRITTEN,
            };
            snapshot.insert(key.clone(), pair[0].clone(), version);
        }
        Ok(snapshot)
    }

    async fn commit(&self, snapshot: &Snapshot, writes: WriteSet) -> Result<CommitOutcome, StoreError> {
        let watched: Vec<(&str, u64)> = snapshot.watched().collect();

        let mut invocation = self.commit_script.prepare_invoke();
        for (key, _) in &watched {
            invocation.key(version_key(key));
        }
        invocation.arg(watched.len());
        for (_, version) in &watched {
            invocation.arg(*version);
        }
        for (key, op) in writes.iter() {
            invocation.key(key).key(version_key(key));
            match op {
                WriteOp::Put(value) => invocation.arg("put").arg(value),
                WriteOp::Delete => invocation.arg("del").arg(""),
            };
        }

        let mut conn = self.conn.clone();
        let applied: i64 = invocation.invoke_async(&mut conn).await?;
        if applied == 1 {
            Ok(CommitOutcome::Committed)
        } else {
            debug!(watched = watched.len(), "redis commit script reported a conflict");
            Ok(CommitOutcome::Conflict)
        }
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(channel, payload).await?;
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        let stream = pubsub
            .into_on_message()
            .filter_map(|msg| async move { msg.get_payload::<String>().ok() });
        Ok(stream.boxed())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
