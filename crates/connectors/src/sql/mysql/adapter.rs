use engine_config::layout::Connection;
use mysql_async::{OptsBuilder, Pool, prelude::*};
use tracing::{error, info};

#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl MySqlAdapter {
    /// Builds the pool and checks that the server answers before any batch
    /// is read.
    pub async fn connect(conn: &Connection) -> Result<Self, mysql_async::Error> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(conn.host.clone())
            .tcp_port(conn.port)
            .user(non_empty(&conn.username))
            .pass(non_empty(&conn.password))
            .db_name(non_empty(&conn.database));
        let pool = Pool::new(opts);

        let mut probe = pool.get_conn().await.map_err(|e| {
            error!(host = %conn.host, port = conn.port, "MySQL connection failed: {}", e);
            e
        })?;
        probe.ping().await?;
        drop(probe);

        info!(host = %conn.host, port = conn.port, database = %conn.database, "Connected to MySQL");
        Ok(MySqlAdapter { pool })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub async fn disconnect(&self) -> Result<(), mysql_async::Error> {
        self.pool.clone().disconnect().await
    }
}
