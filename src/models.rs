//! Person entity, update mask and the JSON shapes exchanged over HTTP.

use serde::{Deserialize, Serialize};

/// Identifier as seen by callers. The repository owns its numeric
/// interpretation.
pub type PersonId = String;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    /// Assigned by storage on create; empty until then.
    pub id: PersonId,
    pub name: String,
    pub address: String,
    pub work: String,
    pub age: i32,
}

/// Which columns of a [`Person`] an update writes.
///
/// A flagged field means the accompanying `Person` holds the new value. An
/// unflagged field is left out of the statement whatever the `Person` holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonMask {
    pub name: bool,
    pub address: bool,
    pub work: bool,
    pub age: bool,
}

impl PersonMask {
    pub fn all() -> Self {
        Self {
            name: true,
            address: true,
            work: true,
            age: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.name || self.address || self.work || self.age)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePersonRequest {
    pub name: String,
    pub address: String,
    pub work: String,
    pub age: i32,
}

impl CreatePersonRequest {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("address", &self.address),
            ("work", &self.work),
        ] {
            if value.is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        if self.age == 0 {
            return Err("age must not be zero".to_string());
        }
        Ok(())
    }
}

impl From<CreatePersonRequest> for Person {
    fn from(request: CreatePersonRequest) -> Self {
        Self {
            id: PersonId::new(),
            name: request.name,
            address: request.address,
            work: request.work,
            age: request.age,
        }
    }
}

/// PATCH body. Absent and `null` fields are both treated as "not supplied".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePersonRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub work: Option<String>,
    pub age: Option<i32>,
}

impl UpdatePersonRequest {
    /// Splits the body into the working entity and the mask naming the
    /// fields it actually carries.
    pub fn into_person_and_mask(self, id: PersonId) -> (Person, PersonMask) {
        let mut person = Person {
            id,
            ..Person::default()
        };
        let mut mask = PersonMask::default();

        if let Some(name) = self.name {
            person.name = name;
            mask.name = true;
        }
        if let Some(address) = self.address {
            person.address = address;
            mask.address = true;
        }
        if let Some(work) = self.work {
            person.work = work;
            mask.work = true;
        }
        if let Some(age) = self.age {
            person.age = age;
            mask.age = true;
        }

        (person, mask)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonResponse {
    pub id: PersonId,
    pub name: String,
    pub address: String,
    pub work: String,
    pub age: i32,
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
            address: person.address,
            work: person.work,
            age: person.age,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonsResponse {
    pub persons: Vec<PersonResponse>,
}

impl From<Vec<Person>> for PersonsResponse {
    fn from(persons: Vec<Person>) -> Self {
        Self {
            persons: persons.into_iter().map(PersonResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}
