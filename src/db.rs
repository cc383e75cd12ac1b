use anyhow::Context;
use axum::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, IndexModel,
};
use thiserror::Error;
use tracing::info;

use crate::users::model::UserRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-index violation, the authoritative duplicate-email signal.
    #[error("duplicate key")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Access contract for the user document store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn insert(&self, record: UserRecord) -> Result<String, StoreError>;
    /// Partial replace of the named fields; everything else untouched.
    async fn update_fields(&self, id: &str, fields: Document) -> anyhow::Result<()>;
}

pub struct MongoStore {
    users: Collection<UserRecord>,
}

impl MongoStore {
    pub async fn connect(mongo_url: &str, db_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(mongo_url)
            .await
            .context("connect to mongodb")?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .context("mongodb ping")?;

        let users = db.collection::<UserRecord>("users");

        // The service-level duplicate check is racy; the unique index is
        // the actual safety net.
        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await
            .context("create unique email index")?;

        info!(db = db_name, "connected to mongodb");
        Ok(Self { users })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

#[async_trait]
impl UserStore for MongoStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let user = self
            .users
            .find_one(doc! { "email": email }, None)
            .await
            .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        let user = self
            .users
            .find_one(doc! { "_id": oid }, None)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    async fn insert(&self, record: UserRecord) -> Result<String, StoreError> {
        let result = self.users.insert_one(&record, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::Duplicate
            } else {
                StoreError::Other(anyhow::Error::new(e).context("insert user"))
            }
        })?;
        let id = result
            .inserted_id
            .as_object_id()
            .context("inserted_id is not an ObjectId")?;
        Ok(id.to_hex())
    }

    async fn update_fields(&self, id: &str, fields: Document) -> anyhow::Result<()> {
        let oid = ObjectId::parse_str(id).context("malformed user id")?;
        let result = self
            .users
            .update_one(doc! { "_id": oid }, doc! { "$set": fields }, None)
            .await
            .context("update user fields")?;
        if result.matched_count == 0 {
            anyhow::bail!("no user with id {id}");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory stand-in for the document store. Counts reads and
    /// writes so tests can assert that a path never touched the store.
    #[derive(Default)]
    pub struct MemoryUserStore {
        users: Mutex<Vec<UserRecord>>,
        pub reads: AtomicUsize,
        pub writes: AtomicUsize,
    }

    impl MemoryUserStore {
        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn snapshot(&self) -> Vec<UserRecord> {
            self.users.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|u| u.id.map(|oid| oid.to_hex()).as_deref() == Some(id))
                .cloned())
        }

        async fn insert(&self, mut record: UserRecord) -> Result<String, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == record.email) {
                return Err(StoreError::Duplicate);
            }
            let oid = ObjectId::new();
            record.id = Some(oid);
            users.push(record);
            Ok(oid.to_hex())
        }

        async fn update_fields(&self, id: &str, fields: Document) -> anyhow::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            let record = users
                .iter_mut()
                .find(|u| u.id.map(|oid| oid.to_hex()).as_deref() == Some(id))
                .with_context(|| format!("no user with id {id}"))?;
            // Same merge semantics as $set: replace named fields only.
            let mut doc = mongodb::bson::to_document(&record)?;
            doc.extend(fields);
            *record = mongodb::bson::from_document(doc)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryUserStore;
    use super::*;
    use crate::users::model::{sample_profile, AuthProvider};
    use mongodb::bson::DateTime;

    fn record(email: &str) -> UserRecord {
        UserRecord {
            id: None,
            email: email.into(),
            hashed_password: "hash".into(),
            auth_provider: AuthProvider::Local,
            created_at: DateTime::now(),
            profile: sample_profile(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = MemoryUserStore::default();
        store.insert(record("spicy@example.com")).await.expect("first insert");
        let err = store.insert(record("spicy@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[tokio::test]
    async fn update_fields_replaces_only_named_fields() {
        let store = MemoryUserStore::default();
        let id = store.insert(record("spicy@example.com")).await.expect("insert");

        store
            .update_fields(&id, doc! { "username": "Renamed" })
            .await
            .expect("update");

        let user = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(user.profile.username, "Renamed");
        assert_eq!(user.profile.age, 24);
        assert_eq!(user.email, "spicy@example.com");
    }

    #[tokio::test]
    async fn update_fields_unknown_id_is_an_error() {
        let store = MemoryUserStore::default();
        let err = store
            .update_fields(&ObjectId::new().to_hex(), doc! { "username": "Ghost" })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no user with id"));
    }
}
