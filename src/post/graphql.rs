use std::sync::Arc;

use async_graphql::{Context, FieldResult, Object};

use crate::error::internal;

use super::model::{Post, PostRepository};

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    async fn get_posts(&self, ctx: &Context<'_>) -> FieldResult<Vec<Post>> {
        let posts = ctx.data::<Arc<dyn PostRepository>>()?;
        let all = posts.find_posts().await.map_err(internal)?;
        Ok(all)
    }

    async fn get_post(&self, ctx: &Context<'_>, id: i32) -> FieldResult<Option<Post>> {
        let posts = ctx.data::<Arc<dyn PostRepository>>()?;
        let post = posts.find_post(id).await.map_err(internal)?;
        Ok(post)
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(&self, ctx: &Context<'_>, title: String) -> FieldResult<Post> {
        let posts = ctx.data::<Arc<dyn PostRepository>>()?;
        let post = posts.create_post(&title).await.map_err(internal)?;
        log::debug!("created post {}", post.id);
        Ok(post)
    }

    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: i32,
        title: String,
    ) -> FieldResult<Option<Post>> {
        let posts = ctx.data::<Arc<dyn PostRepository>>()?;
        let Some(mut post) = posts.find_post(id).await.map_err(internal)? else {
            return Ok(None);
        };

        post.title = title;
        let updated = posts.persist_post(&post).await.map_err(internal)?;
        if updated.is_some() {
            log::debug!("updated post {id}");
        }
        Ok(updated)
    }

    /// `false` both when nothing was deleted and when the store failed; the
    /// failure is logged rather than returned.
    async fn delete_post(&self, ctx: &Context<'_>, id: i32) -> FieldResult<bool> {
        let posts = ctx.data::<Arc<dyn PostRepository>>()?;
        match posts.delete_post(id).await {
            Ok(0) => Ok(false),
            Ok(_) => {
                log::debug!("deleted post {id}");
                Ok(true)
            }
            Err(e) => {
                log::error!("deleting post {id} failed: {e:#}");
                Ok(false)
            }
        }
    }
}
