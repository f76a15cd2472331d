//! In-memory repositories - used when no database is configured and by tests.
//!
//! Data is lost on process restart. Uniqueness of usernames and group slugs is
//! enforced; references between posts, users and groups are not.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, GroupRepository, PostFilter, PostRepository, UserRepository,
};

/// In-memory user store keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&user.id) || store.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if store
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

/// In-memory group store keyed by id.
#[derive(Default)]
pub struct InMemoryGroupRepository {
    store: RwLock<HashMap<Uuid, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, group: Group) -> Result<Group, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&group.id) || store.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&group.id) {
            return Err(RepoError::NotFound);
        }
        if store
            .values()
            .any(|g| g.id != group.id && g.slug == group.slug)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(group.id, group.clone());
        Ok(group)
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups: Vec<Group> = self.store.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

/// In-memory post store.
///
/// Posts are kept in insertion order so that posts sharing a publication
/// timestamp still list the most recently created first.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, filter: PostFilter) -> Vec<Post> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .iter()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        posts.sort_by_key(|p| Reverse(p.pub_date));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let slot = store
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn fetch_page(
        &self,
        filter: PostFilter,
        page_index: u64,
        per_page: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let per_page = per_page.max(1) as usize;
        let offset = (page_index as usize).saturating_mul(per_page);

        Ok(self
            .select(filter)
            .await
            .into_iter()
            .skip(offset)
            .take(per_page)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[tokio::test]
    async fn test_username_is_unique() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::new("leo".to_string(), "hash".to_string()))
            .await
            .unwrap();

        let result = repo
            .create(User::new("leo".to_string(), "other".to_string()))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
        assert!(repo.find_by_username("leo").await.unwrap().is_some());
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_group_slug_is_unique_and_searchable() {
        let repo = InMemoryGroupRepository::new();
        let group = repo
            .create(Group::new("Cats", "cats", "About cats"))
            .await
            .unwrap();

        let duplicate = repo.create(Group::new("Other cats", "cats", "")).await;

        assert!(matches!(duplicate, Err(RepoError::Constraint(_))));
        assert_eq!(repo.find_by_slug("cats").await.unwrap(), Some(group));
        assert_eq!(repo.find_by_slug("dogs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_groups_list_by_title() {
        let repo = InMemoryGroupRepository::new();
        repo.create(Group::new("Zebras", "zebras", "")).await.unwrap();
        repo.create(Group::new("Ants", "ants", "")).await.unwrap();

        let titles: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();

        assert_eq!(titles, vec!["Ants", "Zebras"]);
    }

    #[tokio::test]
    async fn test_posts_list_newest_first() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let mut old = Post::new(author, "old".to_string(), None);
        old.pub_date = Utc::now() - Duration::hours(1);
        repo.create(old).await.unwrap();
        repo.create(Post::new(author, "new".to_string(), None))
            .await
            .unwrap();

        let texts: Vec<String> = repo
            .fetch_page(PostFilter::All, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();

        assert_eq!(texts, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_same_timestamp_lists_latest_insert_first() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let first = Post::new(author, "first".to_string(), None);
        let mut second = Post::new(author, "second".to_string(), None);
        second.pub_date = first.pub_date;
        repo.create(first).await.unwrap();
        repo.create(second).await.unwrap();

        let posts = repo.fetch_page(PostFilter::All, 0, 10).await.unwrap();

        assert_eq!(posts[0].text, "second");
    }

    #[tokio::test]
    async fn test_filters_by_group_and_author() {
        let repo = InMemoryPostRepository::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let (cats, dogs) = (Uuid::new_v4(), Uuid::new_v4());
        repo.create(Post::new(alice, "a-cats".to_string(), Some(cats)))
            .await
            .unwrap();
        repo.create(Post::new(bob, "b-dogs".to_string(), Some(dogs)))
            .await
            .unwrap();
        repo.create(Post::new(alice, "a-none".to_string(), None))
            .await
            .unwrap();

        let in_cats = repo.fetch_page(PostFilter::Group(cats), 0, 10).await.unwrap();
        assert_eq!(in_cats.len(), 1);
        assert_eq!(in_cats[0].text, "a-cats");
        assert_eq!(repo.count(PostFilter::Group(cats)).await.unwrap(), 1);

        let by_alice = repo.fetch_page(PostFilter::Author(alice), 0, 10).await.unwrap();
        assert_eq!(by_alice.len(), 2);
        assert_eq!(repo.count(PostFilter::Author(alice)).await.unwrap(), 2);
        assert_eq!(repo.count(PostFilter::Author(Uuid::new_v4())).await.unwrap(), 0);
        assert_eq!(repo.count(PostFilter::All).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_pages_do_not_overlap() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        let first = Post::new(author, "0".to_string(), None);
        let pub_date = first.pub_date;
        repo.create(first).await.unwrap();
        for i in 1..13 {
            let mut post = Post::new(author, i.to_string(), None);
            post.pub_date = pub_date;
            repo.create(post).await.unwrap();
        }

        let page_1 = repo.fetch_page(PostFilter::All, 0, 10).await.unwrap();
        let page_2 = repo.fetch_page(PostFilter::All, 1, 10).await.unwrap();
        let page_3 = repo.fetch_page(PostFilter::All, 2, 10).await.unwrap();

        assert_eq!(page_1.len(), 10);
        assert_eq!(page_2.len(), 3);
        assert!(page_3.is_empty());
        assert!(page_2.iter().all(|p| !page_1.iter().any(|q| q.id == p.id)));
        assert_eq!(page_1[0].text, "12");
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let repo = InMemoryPostRepository::new();
        let mut post = repo
            .create(Post::new(Uuid::new_v4(), "draft".to_string(), None))
            .await
            .unwrap();

        post.apply_edit("final".to_string(), None);
        repo.update(post.clone()).await.unwrap();

        let all = repo.fetch_page(PostFilter::All, 0, 10).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "final");
        assert_eq!(all[0].id, post.id);
    }

    #[tokio::test]
    async fn test_update_unknown_post_is_not_found() {
        let repo = InMemoryPostRepository::new();

        let result = repo
            .update(Post::new(Uuid::new_v4(), "ghost".to_string(), None))
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
