//! `login` and `logout`

use tracing::{debug, info};

use crate::authn::token::{delete_token, load_token, save_token, Token};
use crate::commands::CommandContext;
use crate::errors::CliError;
use crate::http::client::HttpClient;
use crate::output;

/// Lifetime of the mock token, in seconds
const MOCK_TOKEN_TTL: u64 = 3600;

/// Log in, keeping a stored token the API still accepts.
///
/// Without an OAuth flow the new token is a mock bearer token that the mock API
/// accepts as-is.
pub async fn login(ctx: &CommandContext) -> Result<(), CliError> {
    if let Ok(existing) = load_token(&ctx.layout).await {
        let client = ctx.client()?.with_token(existing);
        match client.verify_auth().await {
            Ok(verified) if verified.valid => {
                output::success("Already logged in");
                output::field("User", format!("{} ({})", verified.user_id, verified.email));
                return Ok(());
            }
            Ok(_) => debug!("Stored token was rejected"),
            Err(e) => debug!("Stored token could not be verified: {}", e),
        }
        output::warning("stored token is no longer valid, logging in again");
    }

    output::step("Logging in to Backend.im (mock authentication)");
    let token = Token::bearer(format!("mock_token_{}", std::process::id()), MOCK_TOKEN_TTL);
    save_token(&ctx.layout, &token).await?;
    info!("Saved token to {}", ctx.layout.token_file().path().display());

    output::success("Login successful");
    output::field("Token", ctx.layout.token_file().path().display().to_string());

    report_user(&ctx.client()?.with_token(token)).await;
    Ok(())
}

async fn report_user(client: &HttpClient) {
    match client.verify_auth().await {
        Ok(verified) if verified.valid => {
            output::field("User", format!("{} ({})", verified.user_id, verified.email));
        }
        Ok(_) => output::warning("the API did not accept the new token"),
        Err(e) => output::warning(format!("could not verify the new token: {}", e)),
    }
}

/// Forget the stored token
pub async fn logout(ctx: &CommandContext) -> Result<(), CliError> {
    delete_token(&ctx.layout).await?;
    output::success("Logged out");
    Ok(())
}
