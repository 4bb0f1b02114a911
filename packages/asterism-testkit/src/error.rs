pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("ASTERISM_PG_DSN is not a usable Postgres DSN: {0}.")]
	InvalidDsn(#[source] sqlx::Error),
	#[error("No admin database accepted a connection: {0}.")]
	NoAdminDatabase(#[source] sqlx::Error),

	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
}
