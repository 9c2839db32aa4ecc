use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::{Client, NewClient, NewService, NewServiceRequest, Service, ServiceRequestView};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        login TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        cpf TEXT NOT NULL,
        birth_date TEXT NOT NULL,
        phone TEXT,
        marital_status TEXT,
        education TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        price REAL NOT NULL,
        lead_time_days INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        service_id INTEGER NOT NULL,
        order_date TEXT NOT NULL,
        status TEXT NOT NULL,
        charged_price REAL NOT NULL,
        expected_date TEXT NOT NULL,
        FOREIGN KEY (client_id) REFERENCES clients(id),
        FOREIGN KEY (service_id) REFERENCES services(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token_digest TEXT PRIMARY KEY,
        client_id INTEGER NOT NULL,
        expires_at TEXT NOT NULL,
        FOREIGN KEY (client_id) REFERENCES clients(id)
    )
    "#,
];

/// Catalog inserted the first time the service table is found empty.
const SEED_SERVICES: &[(&str, &str, f64, i64)] = &[
    ("Suporte Nível 1", "Atendimento remoto para incidentes básicos", 150.0, 2),
    ("Backup em Nuvem", "Configuração e monitoramento de backups", 320.0, 5),
    ("Monitoramento 24/7", "Monitoramento contínuo de infraestrutura", 890.0, 1),
    ("Projeto de Segurança", "Análise e reforço de segurança da informação", 1200.0, 7),
];

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(config.database_url())?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives only as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.database_max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create missing tables and seed the catalog when it is empty
    pub async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&mut *tx)
            .await?;

        if count == 0 {
            for (name, description, price, lead_time_days) in SEED_SERVICES {
                sqlx::query(
                    "INSERT INTO services (name, description, price, lead_time_days) VALUES (?, ?, ?, ?)",
                )
                .bind(*name)
                .bind(*description)
                .bind(*price)
                .bind(*lead_time_days)
                .execute(&mut *tx)
                .await?;
            }
            tracing::info!(services = SEED_SERVICES.len(), "seeded service catalog");
        }

        tx.commit().await?;

        Ok(())
    }

    // Client operations
    pub async fn get_client_by_login(&self, login: &str) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE login = ?")
            .bind(login)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(client)
    }

    pub async fn get_client_id(&self, login: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar("SELECT id FROM clients WHERE login = ?")
            .bind(login)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(id)
    }

    pub async fn create_client(&self, client: &NewClient) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (login, password_hash, name, cpf, birth_date, phone, marital_status, education)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.login)
        .bind(&client.password_hash)
        .bind(&client.name)
        .bind(&client.cpf)
        .bind(client.birth_date)
        .bind(&client.phone)
        .bind(&client.marital_status)
        .bind(&client.education)
        .execute(self.get_pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Store a new password hash and drop every session the client holds
    pub async fn update_password(&self, client_id: i64, password_hash: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE clients SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE client_id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    // Service operations
    pub async fn get_services(&self) -> Result<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY id ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(services)
    }

    pub async fn create_service(&self, service: &NewService) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO services (name, description, price, lead_time_days) VALUES (?, ?, ?, ?)",
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.lead_time_days)
        .execute(self.get_pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    // Request operations
    pub async fn get_requests_by_client(&self, client_id: i64) -> Result<Vec<ServiceRequestView>> {
        let requests = sqlx::query_as::<_, ServiceRequestView>(
            r#"
            SELECT
                r.id,
                r.order_date,
                r.status,
                r.charged_price,
                r.expected_date,
                s.name AS service_name,
                s.id AS service_id
            FROM requests r
            JOIN services s ON r.service_id = s.id
            WHERE r.client_id = ?
            ORDER BY r.order_date ASC, r.id ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(requests)
    }

    /// Replace the client's whole request list in one transaction.
    ///
    /// Any failing insert aborts the transaction, leaving the previous list.
    pub async fn replace_requests(&self, client_id: i64, requests: &[NewServiceRequest]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM requests WHERE client_id = ?")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for request in requests {
            sqlx::query(
                r#"
                INSERT INTO requests (client_id, service_id, order_date, status, charged_price, expected_date)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(client_id)
            .bind(request.service_id)
            .bind(request.order_date)
            .bind(&request.status)
            .bind(request.charged_price)
            .bind(request.expected_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(client_id, removed, inserted = requests.len(), "replaced request list");

        Ok(())
    }

    // Session operations
    pub async fn create_session(&self, token_digest: &str, client_id: i64, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token_digest, client_id, expires_at) VALUES (?, ?, ?)")
            .bind(token_digest)
            .bind(client_id)
            .bind(expires_at)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    /// Client id owning a live session, purging it when expired
    pub async fn get_session_client(&self, token_digest: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
        let session: Option<(i64, DateTime<Utc>)> =
            sqlx::query_as("SELECT client_id, expires_at FROM sessions WHERE token_digest = ?")
                .bind(token_digest)
                .fetch_optional(self.get_pool())
                .await?;

        match session {
            Some((client_id, expires_at)) if expires_at > now => Ok(Some(client_id)),
            Some(_) => {
                self.delete_session(token_digest).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub async fn delete_session(&self, token_digest: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_digest = ?")
            .bind(token_digest)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected())
    }
}

/// Whether a database-layer error came from a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

/// Initialize the database connection pool and schema
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    db.migrate().await?;

    Ok(db)
}
