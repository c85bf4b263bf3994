//! SQLite storage implementation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::TransitionRecord;
use super::InstanceStore;
use crate::error::{Error, Result};
use crate::workflow::{InstanceSpec, ProvisionInstance, RuleRecord, Status, Transition};

/// Parse an RFC 3339 datetime string into a `chrono::DateTime<Utc>`.
///
/// Returns a `rusqlite::Error` on parse failure instead of panicking,
/// so it is safe to use inside `query_row` / `query_map` closures.
fn parse_datetime_utc(s: &str) -> rusqlite::Result<chrono::DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn parse_status(s: &str) -> rusqlite::Result<Status> {
    s.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
        )
    })
}

/// SQLite-backed instance store.
#[derive(Clone)]
pub struct SqliteInstanceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInstanceStore {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        // WAL mode must be set before any transaction begins.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS instances (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                element TEXT NOT NULL,
                filter_type TEXT NOT NULL,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS instance_rules (
                instance_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                field TEXT NOT NULL,
                key TEXT NOT NULL,
                operator TEXT NOT NULL,
                value TEXT NOT NULL,
                group_name TEXT NOT NULL,
                PRIMARY KEY (instance_id, position),
                FOREIGN KEY (instance_id) REFERENCES instances(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS transition_log (
                id TEXT PRIMARY KEY,
                instance_id TEXT NOT NULL,
                transition TEXT NOT NULL,
                from_status TEXT NOT NULL,
                to_status TEXT NOT NULL,
                applied_at TEXT NOT NULL,
                FOREIGN KEY (instance_id) REFERENCES instances(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_instances_name ON instances(name);
            CREATE INDEX IF NOT EXISTS idx_transition_log_instance
                ON transition_log(instance_id, applied_at);
            "#,
        )?;
        Ok(())
    }

    fn read_rules(conn: &Connection, instance_id: &str) -> Result<Vec<RuleRecord>> {
        let mut stmt = conn.prepare(
            "SELECT field, key, operator, value, group_name
             FROM instance_rules WHERE instance_id = ?1 ORDER BY position",
        )?;
        let rules = stmt
            .query_map([instance_id], |row| {
                Ok(RuleRecord {
                    field: row.get(0)?,
                    key: row.get(1)?,
                    operator: row.get(2)?,
                    value: row.get(3)?,
                    group: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rules)
    }

    fn row_to_instance(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProvisionInstance> {
        let status: String = row.get(7)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;
        Ok(ProvisionInstance {
            id: row.get(0)?,
            spec: InstanceSpec {
                name: row.get(1)?,
                element: row.get(2)?,
                filter_type: row.get(3)?,
                category: row.get(4)?,
                subcategory: row.get(5)?,
                enabled: row.get(6)?,
                rules: Vec::new(),
            },
            status: parse_status(&status)?,
            created_at: parse_datetime_utc(&created_at)?,
            updated_at: parse_datetime_utc(&updated_at)?,
        })
    }

    /// Transition audit entries for one instance, oldest first.
    pub async fn transitions(&self, instance_id: &str) -> Result<Vec<TransitionRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, instance_id, transition, from_status, to_status, applied_at
             FROM transition_log WHERE instance_id = ?1 ORDER BY rowid",
        )?;
        let records = stmt
            .query_map([instance_id], |row| {
                let transition: String = row.get(2)?;
                let from_status: String = row.get(3)?;
                let to_status: String = row.get(4)?;
                let applied_at: String = row.get(5)?;
                let transition = Transition::ALL
                    .into_iter()
                    .find(|t| t.id() == transition)
                    .ok_or_else(|| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            format!("unknown transition: {}", transition).into(),
                        )
                    })?;
                Ok(TransitionRecord {
                    id: row.get(0)?,
                    instance_id: row.get(1)?,
                    transition,
                    from_status: parse_status(&from_status)?,
                    to_status: parse_status(&to_status)?,
                    applied_at: parse_datetime_utc(&applied_at)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

#[async_trait]
impl InstanceStore for SqliteInstanceStore {
    async fn get(&self, id: &str) -> Result<Option<ProvisionInstance>> {
        let conn = self.conn.lock().await;
        let instance = conn
            .query_row(
                "SELECT id, name, element, filter_type, category, subcategory,
                        enabled, status, created_at, updated_at
                 FROM instances WHERE id = ?1",
                [id],
                Self::row_to_instance,
            )
            .optional()?;

        match instance {
            Some(mut instance) => {
                instance.spec.rules = Self::read_rules(&conn, id)?;
                Ok(Some(instance))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, instance: &ProvisionInstance) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO instances
                 (id, name, element, filter_type, category, subcategory,
                  enabled, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 element = excluded.element,
                 filter_type = excluded.filter_type,
                 category = excluded.category,
                 subcategory = excluded.subcategory,
                 enabled = excluded.enabled,
                 status = excluded.status,
                 updated_at = excluded.updated_at",
            params![
                instance.id,
                instance.spec.name,
                instance.spec.element,
                instance.spec.filter_type,
                instance.spec.category,
                instance.spec.subcategory,
                instance.spec.enabled,
                instance.status.id(),
                instance.created_at.to_rfc3339(),
                instance.updated_at.to_rfc3339(),
            ],
        )?;

        tx.execute(
            "DELETE FROM instance_rules WHERE instance_id = ?1",
            [instance.id.as_str()],
        )?;
        for (position, rule) in instance.spec.rules.iter().enumerate() {
            tx.execute(
                "INSERT INTO instance_rules
                     (instance_id, position, field, key, operator, value, group_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    instance.id,
                    position as i64,
                    rule.field,
                    rule.key,
                    rule.operator,
                    rule.value,
                    rule.group,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    async fn set_status(&self, id: &str, status: Status) -> Result<()> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE instances SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.id(), Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::InstanceNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn record_transition(&self, id: &str, transition: Transition) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO transition_log
                 (id, instance_id, transition, from_status, to_status, applied_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                id,
                transition.id(),
                transition.from().id(),
                transition.to().id(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProvisionInstance>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, element, filter_type, category, subcategory,
                    enabled, status, created_at, updated_at
             FROM instances ORDER BY created_at DESC",
        )?;
        let mut instances = stmt
            .query_map([], Self::row_to_instance)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for instance in &mut instances {
            instance.spec.rules = Self::read_rules(&conn, &instance.id)?;
        }
        Ok(instances)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM instances WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{InstanceSpec, ProvisionInstance, RuleRecord};

    fn instance_with_rules() -> ProvisionInstance {
        ProvisionInstance::new(InstanceSpec {
            name: "eventA-live".to_string(),
            element: "QoE Platform - Test".to_string(),
            filter_type: "create_filter".to_string(),
            category: "CONTENT".to_string(),
            subcategory: "Asset".to_string(),
            enabled: true,
            rules: vec![
                RuleRecord {
                    field: "Asset Name".to_string(),
                    key: String::new(),
                    operator: "contains".to_string(),
                    value: "Live-1234".to_string(),
                    group: "1".to_string(),
                },
                RuleRecord {
                    field: "Tags".to_string(),
                    key: "genre".to_string(),
                    operator: "equals".to_string(),
                    value: "sports".to_string(),
                    group: "2".to_string(),
                },
            ],
        })
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        let instance = instance_with_rules();

        store.save(&instance).await.unwrap();
        let loaded = store.get(&instance.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, instance.id);
        assert_eq!(loaded.status, Status::Draft);
        assert_eq!(loaded.spec.name, "eventA-live");
        assert_eq!(loaded.spec.rules.len(), 2);
        // Rule order is preserved by position.
        assert_eq!(loaded.spec.rules[0].value, "Live-1234");
        assert_eq!(loaded.spec.rules[1].key, "genre");
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_none() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        assert!(store.get("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        let instance = instance_with_rules();
        store.save(&instance).await.unwrap();

        store.set_status(&instance.id, Status::Ready).await.unwrap();

        let loaded = store.get(&instance.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, Status::Ready);
    }

    #[tokio::test]
    async fn test_set_status_on_unknown_id_errors() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        let err = store.set_status("ghost", Status::Ready).await.unwrap_err();
        assert_eq!(err.code(), "INSTANCE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_transition_log() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        let instance = instance_with_rules();
        store.save(&instance).await.unwrap();

        store
            .record_transition(&instance.id, Transition::DraftToReady)
            .await
            .unwrap();
        store
            .record_transition(&instance.id, Transition::ReadyToInProgress)
            .await
            .unwrap();

        let log = store.transitions(&instance.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].transition, Transition::DraftToReady);
        assert_eq!(log[1].from_status, Status::Ready);
        assert_eq!(log[1].to_status, Status::InProgress);
    }

    #[tokio::test]
    async fn test_delete_cascades_rules() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        let instance = instance_with_rules();
        store.save(&instance).await.unwrap();

        assert!(store.delete(&instance.id).await.unwrap());
        assert!(!store.delete(&instance.id).await.unwrap());
        assert!(store.get(&instance.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = SqliteInstanceStore::open_in_memory().unwrap();
        let mut instance = instance_with_rules();
        store.save(&instance).await.unwrap();

        instance.spec.rules.truncate(1);
        instance.status = Status::Ready;
        store.save(&instance).await.unwrap();

        let loaded = store.get(&instance.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, Status::Ready);
        assert_eq!(loaded.spec.rules.len(), 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qlens.db");
        let store = SqliteInstanceStore::open(&path).unwrap();

        let instance = instance_with_rules();
        store.save(&instance).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
