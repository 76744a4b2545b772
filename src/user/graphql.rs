use std::sync::Arc;

use async_graphql::{Context, FieldResult, Object};

use crate::{
    config::Config,
    context::{RequestContext, SESSION_USER_KEY},
    error::{internal, FieldError},
    password,
};

use super::model::{UserRepository, UserResponse, UsernamePasswordInput, UsernameTaken};

fn username_taken() -> UserResponse {
    UserResponse::from_error(FieldError::new(
        "username",
        "That username is already taken",
    ))
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn register(
        &self,
        ctx: &Context<'_>,
        options: UsernamePasswordInput,
    ) -> FieldResult<UserResponse> {
        if let Some(error) = options.validate() {
            return Ok(UserResponse::from_error(error));
        }

        let users = ctx.data::<Arc<dyn UserRepository>>()?;
        let existing = users
            .find_user_by_username(&options.username)
            .await
            .map_err(internal)?;
        if existing.is_some() {
            return Ok(username_taken());
        }

        let password_hash = password::hash_blocking(options.password)
            .await
            .map_err(internal)?;
        // Another registration can claim the name between the check above and the insert.
        let user = match users.create_user(&options.username, &password_hash).await {
            Ok(user) => user,
            Err(e) if e.is::<UsernameTaken>() => return Ok(username_taken()),
            Err(e) => return Err(internal(e)),
        };
        log::debug!("registered user {} ({})", user.id, user.username);

        Ok(UserResponse::from_user(user))
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        options: UsernamePasswordInput,
    ) -> FieldResult<UserResponse> {
        let users = ctx.data::<Arc<dyn UserRepository>>()?;
        let Some(user) = users
            .find_user_by_username(&options.username)
            .await
            .map_err(internal)?
        else {
            log::debug!("login for unknown user {}", options.username);
            return Ok(UserResponse::from_error(FieldError::new(
                "username",
                "That user does not exist",
            )));
        };

        let valid = password::verify_blocking(user.password_hash.clone(), options.password)
            .await
            .map_err(internal)?;
        if !valid {
            log::debug!("wrong password for user {}", user.id);
            return Ok(UserResponse::from_error(FieldError::new(
                "password",
                "Incorrect password",
            )));
        }

        let config = ctx.data::<Config>()?;
        if config.persist_login_session {
            match ctx.data_opt::<RequestContext>() {
                Some(request) => request
                    .session()
                    .set(SESSION_USER_KEY, user.id.to_string()),
                None => log::warn!("login session enabled but request carries no session"),
            }
        }

        Ok(UserResponse::from_user(user))
    }
}
