use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::users::repo::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url, &config.pool).await?;
        let store = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }
}

#[cfg(test)]
pub mod fake {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::AppState;
    use crate::config::AppConfig;
    use crate::users::repo::{StoreError, UserStore};
    use crate::users::repo_types::User;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FailOn {
        List,
        ListDecode,
        Exists,
        Insert,
    }

    /// In-memory store with optional failure injection.
    #[derive(Default)]
    pub struct FakeStore {
        users: Mutex<Vec<User>>,
        fail_on: Option<FailOn>,
    }

    impl FakeStore {
        pub fn failing(fail_on: FailOn) -> Self {
            Self {
                users: Mutex::default(),
                fail_on: Some(fail_on),
            }
        }

        pub fn with_names(names: &[&str]) -> Self {
            let users = names
                .iter()
                .zip(1..)
                .map(|(name, id)| User {
                    id,
                    name: name.to_string(),
                })
                .collect();
            Self {
                users: Mutex::new(users),
                fail_on: None,
            }
        }

        pub fn names(&self) -> Vec<String> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .map(|u| u.name.clone())
                .collect()
        }

        fn fails(&self, op: FailOn) -> Result<(), StoreError> {
            match self.fail_on {
                Some(FailOn::ListDecode) if op == FailOn::List => Err(StoreError::Decode(
                    sqlx::Error::ColumnNotFound("name".into()),
                )),
                Some(f) if f == op => Err(StoreError::Query(sqlx::Error::PoolTimedOut)),
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl UserStore for FakeStore {
        async fn list(&self) -> Result<Vec<User>, StoreError> {
            self.fails(FailOn::List)?;
            Ok(self.users.lock().unwrap().clone())
        }

        async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
            self.fails(FailOn::Exists)?;
            Ok(self.users.lock().unwrap().iter().any(|u| u.name == name))
        }

        async fn insert(&self, name: &str) -> Result<(), StoreError> {
            self.fails(FailOn::Insert)?;
            let mut users = self.users.lock().unwrap();
            let id = users.len() as i64 + 1;
            users.push(User {
                id,
                name: name.to_string(),
            });
            Ok(())
        }

        async fn close(&self) {}
    }

    impl AppState {
        pub fn fake(store: Arc<FakeStore>) -> Self {
            let config = AppConfig::from_lookup(|_| None).expect("default config");
            AppState::from_parts(store, Arc::new(config))
        }
    }
}
