use person_service::{
    error::RepoError,
    models::{Person, PersonMask},
    repository::{PersonRepository, PgPersonRepository},
    service::PersonService,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;

async fn maybe_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;

    PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .ok()
}

fn person(name: &str) -> Person {
    Person {
        id: String::new(),
        name: name.to_string(),
        address: "address".to_string(),
        work: "work".to_string(),
        age: 12,
    }
}

#[tokio::test]
async fn postgres_repository_crud_flow() {
    let Some(pool) = maybe_pool().await else {
        eprintln!(
            "Skipping postgres_repository_crud_flow: TEST_DATABASE_URL/DATABASE_URL is not set or database is unreachable."
        );
        return;
    };

    sqlx::raw_sql(include_str!("../sql/persons.sql"))
        .execute(&pool)
        .await
        .expect("schema should apply");

    sqlx::query("TRUNCATE TABLE persons RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("truncate should succeed");

    let repo = PgPersonRepository::new(pool.clone());

    assert!(repo.get_all().await.expect("list should succeed").is_empty());

    let created = repo
        .create(person("qwerty"))
        .await
        .expect("create should succeed");
    assert_eq!(created.id, "1");

    let fetched = repo
        .get_by_id(&created.id)
        .await
        .expect("get should succeed");
    assert_eq!(fetched, created);

    let changes = Person {
        id: created.id.clone(),
        work: "newwork".to_string(),
        ..Person::default()
    };
    let mask = PersonMask {
        work: true,
        ..PersonMask::default()
    };
    let echoed = repo
        .update(changes.clone(), mask)
        .await
        .expect("update should succeed");
    assert_eq!(echoed, changes);

    let stored = repo
        .get_by_id(&created.id)
        .await
        .expect("get should succeed");
    assert_eq!(
        stored,
        Person {
            work: "newwork".to_string(),
            ..created.clone()
        }
    );

    repo.create(person("second"))
        .await
        .expect("create should succeed");
    assert_eq!(repo.get_all().await.expect("list should succeed").len(), 2);

    repo.delete(&created.id)
        .await
        .expect("delete should succeed");
    assert!(matches!(
        repo.delete(&created.id).await,
        Err(RepoError::NoContent(_))
    ));
    assert!(matches!(
        repo.get_by_id(&created.id).await,
        Err(RepoError::NotFound(_))
    ));
    assert!(matches!(
        repo.update(person("ghost"), PersonMask::all()).await,
        Err(RepoError::InvalidInput(_))
    ));
    assert!(matches!(
        repo.get_by_id("not-a-number").await,
        Err(RepoError::InvalidInput(_))
    ));

    let service = PersonService::new(Arc::new(repo));
    let survivor = service
        .get_all()
        .await
        .expect("list should succeed")
        .pop()
        .expect("second person should remain");

    let updated = service
        .update(
            Person {
                id: survivor.id.clone(),
                age: 0,
                ..Person::default()
            },
            PersonMask {
                age: true,
                ..PersonMask::default()
            },
        )
        .await
        .expect("update should succeed");

    assert_eq!(
        updated,
        Person {
            age: 0,
            ..survivor
        }
    );
}
