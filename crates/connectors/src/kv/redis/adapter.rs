use engine_config::layout::Connection;
use redis::{
    Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, aio::MultiplexedConnection,
};
use tracing::{error, info};

/// Shared multiplexed connection to one Redis server.
#[derive(Clone)]
pub struct RedisAdapter {
    conn: MultiplexedConnection,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl RedisAdapter {
    pub async fn connect(conn: &Connection) -> Result<Self, redis::RedisError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(conn.host.clone(), conn.port),
            redis: RedisConnectionInfo {
                username: non_empty(&conn.username),
                password: non_empty(&conn.password),
                ..Default::default()
            },
        };

        let client = Client::open(info)?;
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(host = %conn.host, port = conn.port, "Redis connection failed: {}", e);
                e
            })?;

        let _: String = redis::cmd("PING").query_async(&mut connection).await?;
        info!(host = %conn.host, port = conn.port, "Connected to Redis");

        Ok(RedisAdapter { conn: connection })
    }

    /// Clones are cheap and share the underlying socket.
    pub fn connection(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}
