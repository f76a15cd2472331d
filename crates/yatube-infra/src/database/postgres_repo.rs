//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select};
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{GroupRepository, PostFilter, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn select_posts(filter: PostFilter) -> Select<PostEntity> {
    let query = PostEntity::find();
    match filter {
        PostFilter::All => query,
        PostFilter::Group(group_id) => query.filter(post::Column::GroupId.eq(group_id)),
        PostFilter::Author(author_id) => query.filter(post::Column::AuthorId.eq(author_id)),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        select_posts(filter)
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn fetch_page(
        &self,
        filter: PostFilter,
        page_index: u64,
        per_page: u64,
    ) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(?filter, page_index, per_page, "Fetching page of posts");

        // Id breaks ties between equal publication dates.
        let result = select_posts(filter)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, per_page.max(1))
            .fetch_page(page_index)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
