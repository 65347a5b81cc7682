//! Back-office accounts.

use anyhow::{bail, Result};
use duka_auth::{AuthError, Registration, Role};

use super::CreateAdminArgs;
use crate::context::Context;

pub async fn run(args: CreateAdminArgs, ctx: &Context) -> Result<()> {
    let state = ctx.state().await?;
    let form = Registration {
        email: args.email,
        password: args.password,
        name: args.name,
        phone: None,
    };

    let user = match state.auth.create_user(form, Role::Admin).await {
        Ok(user) => user,
        Err(AuthError::Validation(fields)) => {
            for (field, message) in fields.iter() {
                ctx.output.error(&format!("{field}: {message}"));
            }
            bail!("Invalid admin account details");
        }
        Err(AuthError::EmailTaken(email)) => bail!("An account for {email} already exists"),
        Err(e) => return Err(e.into()),
    };

    if ctx.output.is_json() {
        ctx.output.json(&user.profile());
    } else {
        ctx.output.success(&format!("Created admin {}", user.email));
        ctx.output.kv("id", &user.id.to_string());
    }
    Ok(())
}
