//! Throwaway Postgres databases for integration tests.
//!
//! Tests read the server DSN from `PWE_PG_DSN`, create a uniquely named database on it, and drop
//! that database when done, either through [`TestDatabase::cleanup`] or on drop.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const DSN_ENV: &str = "PWE_PG_DSN";
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(server_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(server_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse {DSN_ENV}: {err}.")))?;
		let (maintenance, mut conn) = connect_maintenance(&server).await?;
		let name = format!("pwe_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to create {name}: {err}.")))?;

		let dsn = server.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Connection settings for the store under test, pointing at this database.
	pub fn postgres_config(&self, pool_max_conns: u32) -> pwe_config::Postgres {
		pwe_config::Postgres { dsn: self.dsn.clone(), pool_max_conns, acquire_timeout_ms: 5_000 }
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		// The test's runtime may be gone by now.
		let handle = thread::spawn(move || {
			let runtime =
				match tokio::runtime::Builder::new_current_thread().enable_all().build() {
					Ok(runtime) => runtime,
					Err(err) => {
						eprintln!("Failed to start cleanup runtime for {name}: {err}.");

						return;
					},
				};

			if let Err(err) = runtime.block_on(drop_database(&name, &maintenance)) {
				eprintln!("{err}");
			}
		});

		let _ = handle.join();
	}
}

/// The Postgres server DSN for integration tests, if configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn connect_maintenance(
	server: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = server.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!(
		"Failed to connect to a maintenance database ({}).",
		failures.join("; ")
	)))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.execute(&mut conn)
	.await?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str())
		.await
		.map_err(|err| Error::Message(format!("Failed to drop {name}: {err}.")))?;

	Ok(())
}
