use std::sync::Arc;

use crate::{
    config::Config,
    post::{
        graphql::{PostMutation, PostQuery},
        model::PostRepository,
    },
    user::{graphql::UserMutation, model::UserRepository},
};

use async_graphql::{EmptySubscription, MergedObject, Schema};

#[derive(MergedObject, Default)]
pub struct Query(PostQuery);

#[derive(MergedObject, Default)]
pub struct Mutation(PostMutation, UserMutation);

pub type LiredditSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn get_schema<S>(store: Arc<S>, config: Config) -> LiredditSchema
where
    S: PostRepository + UserRepository + 'static,
{
    let posts: Arc<dyn PostRepository> = store.clone();
    let users: Arc<dyn UserRepository> = store;
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(posts)
        .data(users)
        .data(config)
        .finish()
}
