use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use yatube_core::domain::{Group, Post};
use yatube_core::ports::{BaseRepository, GroupRepository, PostFilter, PostRepository};

use crate::database::entity::{group, post};
use crate::database::postgres_repo::{PostgresGroupRepository, PostgresPostRepository};

fn post_model(author_id: Uuid, group_id: Option<Uuid>, text: &str) -> post::Model {
    post::Model {
        id: Uuid::new_v4(),
        text: text.to_owned(),
        pub_date: chrono::Utc::now().into(),
        author_id,
        group_id,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let author_id = Uuid::new_v4();
    let model = post_model(author_id, None, "Test Post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.text, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
    assert_eq!(post.group_id, None);
}

#[tokio::test]
async fn test_find_group_by_slug() {
    let model = group::Model {
        id: Uuid::new_v4(),
        title: "Test group".to_owned(),
        slug: "test-slug".to_owned(),
        description: "Description".to_owned(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model.clone()], vec![]])
        .into_connection();

    let repo = PostgresGroupRepository::new(db);

    let found: Option<Group> = repo.find_by_slug("test-slug").await.unwrap();
    assert_eq!(found.map(|g| g.id), Some(model.id));

    let missing = repo.find_by_slug("other").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_fetch_group_page_maps_models() {
    let author_id = Uuid::new_v4();
    let group_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(author_id, Some(group_id), "second"),
            post_model(author_id, Some(group_id), "first"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let posts = repo
        .fetch_page(PostFilter::Group(group_id), 0, 10)
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.group_id == Some(group_id)));
}

#[tokio::test]
async fn test_fetch_page_limits_and_breaks_ties_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let posts = repo.fetch_page(PostFilter::All, 2, 10).await.unwrap();
    assert!(posts.is_empty());

    let log = format!("{:?}", repo.db.into_transaction_log());
    assert!(log.contains(r#"\"posts\".\"pub_date\" DESC"#), "{log}");
    assert!(log.contains(r#"\"posts\".\"id\" DESC"#), "{log}");
    assert!(log.contains("LIMIT"), "{log}");
    assert!(log.contains("OFFSET"), "{log}");
}
