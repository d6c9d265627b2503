//! Signin mutation. Delegates credential checks to [`AuthService`].

use super::prelude::*;

const SIGNIN: AuthGate = AuthGate::open();

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Exchange email and password for an access token
    async fn signin(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<PayloadAuth> {
        SIGNIN
            .run(ctx.identity(), || signin(ctx, email, password))
            .await
            .into_gql()
    }
}

async fn signin(ctx: &Context<'_>, email: String, password: String) -> ApiResult<PayloadAuth> {
    let auth = ctx.data_unchecked::<Arc<AuthService>>();
    let result = auth.signin(&email, &password).await?;
    Ok(PayloadAuth {
        token: result.token,
        user: User::unloaded(result.user),
    })
}
