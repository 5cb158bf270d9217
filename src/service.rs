//! Use-case layer for persons
//!
//! Every method forwards to the repository and returns its outcome
//! unchanged, except `update`, which reads the row back after writing.

use std::sync::Arc;

use crate::error::RepoResult;
use crate::models::{Person, PersonMask};
use crate::repository::PersonRepository;

pub struct PersonService {
    repository: Arc<dyn PersonRepository>,
}

impl PersonService {
    pub fn new(repository: Arc<dyn PersonRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, person: Person) -> RepoResult<Person> {
        self.repository.create(person).await
    }

    pub async fn get_all(&self) -> RepoResult<Vec<Person>> {
        self.repository.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> RepoResult<Person> {
        self.repository.get_by_id(id).await
    }

    /// Applies the masked fields, then returns the stored row.
    ///
    /// The repository echoes its input, which lacks every unmasked field, so
    /// the response has to come from a fresh read.
    pub async fn update(&self, person: Person, mask: PersonMask) -> RepoResult<Person> {
        let updated = self.repository.update(person, mask).await?;
        self.repository.get_by_id(&updated.id).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        self.repository.delete(id).await
    }
}
