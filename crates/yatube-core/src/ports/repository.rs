use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Group, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining the persistence operations shared by all entities.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity, keyed by its ID.
    ///
    /// Returns [`RepoError::NotFound`] when no row has that ID.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title, used as the choices of the post form.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(*group_id),
            PostFilter::Author(author_id) => post.author_id == *author_id,
        }
    }
}

/// Post repository.
///
/// Pages are ordered newest first; posts sharing a publication date keep a
/// stable order so consecutive pages never overlap.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Number of posts matching `filter`.
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    /// One page of the posts matching `filter`. `page_index` is 0-based.
    async fn fetch_page(
        &self,
        filter: PostFilter,
        page_index: u64,
        per_page: u64,
    ) -> Result<Vec<Post>, RepoError>;
}
