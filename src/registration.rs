use dialoguer::console::Style;
use log::info;
use reqwest::Client;
use std::io::{self, BufRead};
use std::path::Path;

use crate::config::{AccessCredential, AppConfig, save_access_credential};
use crate::error::RebloggrError;
use crate::tumblr::{OAUTH_ENDPOINT, authorize_url, fetch_access_token, fetch_request_token};

/// Runs the three-legged OAuth handshake against Tumblr and stores the
/// resulting access token in `token_file`.
///
/// Blocks on stdin until the user pastes the verification code, there is no
/// timeout. OAuth codes are single use, so nothing here is retried.
pub async fn tumblr_register(
    config: &AppConfig,
    token_file: &Path,
) -> Result<AccessCredential, RebloggrError> {
    let http = Client::new();
    let request_token =
        fetch_request_token(&http, OAUTH_ENDPOINT, &config.consumer, &config.callback_url).await?;
    let url = authorize_url(OAUTH_ENDPOINT, &request_token)?;
    info!("Received request token, waiting for authorization");

    println!("(1) Go to: {}", Style::new().red().apply_to(url));
    println!(
        "(2) Grant access, you should be redirected to a page with a \"oauth_verifier\" \
         value in the URL."
    );
    println!("(3) Enter that verification code here: ");
    let verifier = read_verifier(io::stdin().lock())?;

    let credential = fetch_access_token(
        &http,
        OAUTH_ENDPOINT,
        &config.consumer,
        &request_token,
        &verifier,
    )
    .await?;

    let green = Style::new().green();
    println!();
    println!("Token: {}", green.apply_to(&credential.token));
    println!("Secret: {}", green.apply_to(&credential.secret));
    println!();

    save_access_credential(token_file, &credential).await?;
    println!(
        "{}",
        Style::new()
            .cyan()
            .apply_to(format!("Token written to {}", token_file.display()))
    );
    Ok(credential)
}

// An empty answer (or a closed stdin) would burn the single use request token
// on an exchange that cannot succeed, stop before that.
fn read_verifier(mut input: impl BufRead) -> Result<String, RebloggrError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let verifier = line.trim();
    if verifier.is_empty() {
        return Err(RebloggrError::Protocol(
            "no verification code entered".to_string(),
        ));
    }
    Ok(verifier.to_string())
}
