use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tokio::{sync::RwLock, time::timeout};
use tracing::debug;

use crate::{
    error::{RepoError, RepoResult},
    models::{Person, PersonMask},
};

const PERSON_SELECT_SQL: &str = "SELECT id, name, address, work, age FROM persons";

pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage gateway for persons.
///
/// Ids arrive as strings; implementations reject anything that is not a
/// valid storage key with [`RepoError::InvalidInput`] before touching
/// storage.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Inserts the four data fields and returns `person` with its new id.
    async fn create(&self, person: Person) -> RepoResult<Person>;
    async fn get_by_id(&self, id: &str) -> RepoResult<Person>;
    async fn get_all(&self) -> RepoResult<Vec<Person>>;
    /// Writes only the columns flagged in `mask` and returns `person` as
    /// given. Callers wanting the stored state must read it back.
    async fn update(&self, person: Person, mask: PersonMask) -> RepoResult<Person>;
    async fn delete(&self, id: &str) -> RepoResult<()>;
}

/// Parses a caller-facing id into the numeric key used by the `persons` table.
pub fn storage_key(id: &str) -> RepoResult<i64> {
    id.parse::<i64>()
        .map_err(|_| RepoError::invalid_input(format!("`{id}` is not a valid person id")))
}

#[derive(Debug, FromRow)]
struct PersonRow {
    id: i64,
    name: String,
    address: String,
    work: String,
    age: i32,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name,
            address: row.address,
            work: row.work,
            age: row.age,
        }
    }
}

#[derive(Clone)]
pub struct PgPersonRepository {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Set the deadline applied to every statement
    pub fn with_statement_timeout(mut self, statement_timeout: Duration) -> Self {
        self.statement_timeout = statement_timeout;
        self
    }
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn create(&self, person: Person) -> RepoResult<Person> {
        if !person.id.is_empty() {
            storage_key(&person.id)?;
        }

        let mut builder = insert_statement(&person);
        debug!(sql = builder.sql(), "create person");

        let id = timeout(
            self.statement_timeout,
            builder.build_query_scalar::<i64>().fetch_one(&self.pool),
        )
        .await??;

        Ok(Person {
            id: id.to_string(),
            ..person
        })
    }

    async fn get_by_id(&self, id: &str) -> RepoResult<Person> {
        let key = storage_key(id)?;

        let mut builder = select_by_id_statement(key);
        debug!(sql = builder.sql(), "get person");

        let row = timeout(
            self.statement_timeout,
            builder.build_query_as::<PersonRow>().fetch_one(&self.pool),
        )
        .await?;

        match row {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::RowNotFound) => Err(RepoError::not_found(id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_all(&self) -> RepoResult<Vec<Person>> {
        let mut builder = QueryBuilder::<Postgres>::new(PERSON_SELECT_SQL);
        debug!(sql = builder.sql(), "list persons");

        let rows = timeout(
            self.statement_timeout,
            builder.build_query_as::<PersonRow>().fetch_all(&self.pool),
        )
        .await??;

        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn update(&self, person: Person, mask: PersonMask) -> RepoResult<Person> {
        let key = storage_key(&person.id)?;
        if mask.is_empty() {
            return Err(RepoError::invalid_input(
                "at least one field must be provided for update",
            ));
        }

        let mut builder = update_statement(key, &person, mask);
        debug!(sql = builder.sql(), "update person");

        let result = timeout(self.statement_timeout, builder.build().execute(&self.pool)).await??;

        if result.rows_affected() == 0 {
            return Err(RepoError::no_content(person.id));
        }

        Ok(person)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let key = storage_key(id)?;

        let mut builder = delete_statement(key);
        debug!(sql = builder.sql(), "delete person");

        let result = timeout(self.statement_timeout, builder.build().execute(&self.pool)).await??;

        if result.rows_affected() == 0 {
            return Err(RepoError::no_content(id));
        }

        Ok(())
    }
}

fn insert_statement(person: &Person) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::<Postgres>::new("INSERT INTO persons (name, address, work, age) VALUES (");

    let mut values = builder.separated(", ");
    values.push_bind(person.name.clone());
    values.push_bind(person.address.clone());
    values.push_bind(person.work.clone());
    values.push_bind(person.age);

    builder.push(") RETURNING id");
    builder
}

fn select_by_id_statement(key: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(PERSON_SELECT_SQL);
    builder.push(" WHERE id = ").push_bind(key);
    builder
}

/// Builds `UPDATE persons SET ...` from the flagged columns only. Unflagged
/// columns do not appear in the statement at all.
fn update_statement(
    key: i64,
    person: &Person,
    mask: PersonMask,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE persons SET ");
    let mut first = true;

    if mask.name {
        push_set_prefix(&mut builder, &mut first);
        builder.push("name = ").push_bind(person.name.clone());
    }

    if mask.address {
        push_set_prefix(&mut builder, &mut first);
        builder.push("address = ").push_bind(person.address.clone());
    }

    if mask.work {
        push_set_prefix(&mut builder, &mut first);
        builder.push("work = ").push_bind(person.work.clone());
    }

    if mask.age {
        push_set_prefix(&mut builder, &mut first);
        builder.push("age = ").push_bind(person.age);
    }

    builder.push(" WHERE id = ").push_bind(key);
    builder
}

fn delete_statement(key: i64) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM persons WHERE id = ");
    builder.push_bind(key);
    builder
}

fn push_set_prefix(builder: &mut QueryBuilder<'_, Postgres>, first: &mut bool) {
    if *first {
        *first = false;
    } else {
        builder.push(", ");
    }
}

/// Process-local repository with the same observable behavior as
/// [`PgPersonRepository`]. Ids are assigned sequentially from 1.
#[derive(Default)]
pub struct InMemoryPersonRepository {
    state: RwLock<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Person>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn create(&self, person: Person) -> RepoResult<Person> {
        if !person.id.is_empty() {
            storage_key(&person.id)?;
        }

        let mut state = self.state.write().await;
        state.last_id += 1;
        let key = state.last_id;

        let created = Person {
            id: key.to_string(),
            ..person
        };
        state.rows.insert(key, created.clone());

        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> RepoResult<Person> {
        let key = storage_key(id)?;

        let state = self.state.read().await;
        state
            .rows
            .get(&key)
            .cloned()
            .ok_or_else(|| RepoError::not_found(id))
    }

    async fn get_all(&self) -> RepoResult<Vec<Person>> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn update(&self, person: Person, mask: PersonMask) -> RepoResult<Person> {
        let key = storage_key(&person.id)?;
        if mask.is_empty() {
            return Err(RepoError::invalid_input(
                "at least one field must be provided for update",
            ));
        }

        let mut state = self.state.write().await;
        let Some(stored) = state.rows.get_mut(&key) else {
            return Err(RepoError::no_content(person.id));
        };

        if mask.name {
            stored.name.clone_from(&person.name);
        }
        if mask.address {
            stored.address.clone_from(&person.address);
        }
        if mask.work {
            stored.work.clone_from(&person.work);
        }
        if mask.age {
            stored.age = person.age;
        }

        Ok(person)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let key = storage_key(id)?;

        let mut state = self.state.write().await;
        match state.rows.remove(&key) {
            Some(_) => Ok(()),
            None => Err(RepoError::no_content(id)),
        }
    }
}
