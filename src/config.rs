use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::args::{Args, ReblogArgs};
use crate::error::RebloggrError;

/// Where the `token` command stores the access credential.
pub const TOKEN_FILE: &str = ".token";

/// Settings shared by both commands, built once from the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub consumer: ConsumerCredentials,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

/// Long-lived OAuth token pair. Earlier versions of the tool wrote the field
/// names capitalised, accept those too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
    #[serde(alias = "Token")]
    pub token: String,
    #[serde(alias = "Secret")]
    pub secret: String,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<AppConfig, RebloggrError> {
        if args.consumer_key.is_empty() {
            return Err(RebloggrError::Config("consumer key is required".to_string()));
        }
        if args.consumer_secret.is_empty() {
            return Err(RebloggrError::Config("consumer secret is required".to_string()));
        }
        if args.callback_url.is_empty() {
            return Err(RebloggrError::Config("callback url is required".to_string()));
        }
        Ok(AppConfig {
            consumer: ConsumerCredentials {
                key: args.consumer_key.clone(),
                secret: args.consumer_secret.clone(),
            },
            callback_url: args.callback_url.clone(),
        })
    }
}

// A token pair given on the command line wins, otherwise fall back to the
// token file.
pub async fn resolve_access_credential(
    args: &ReblogArgs,
    token_file: &Path,
) -> Result<AccessCredential, RebloggrError> {
    if !args.token_key.is_empty() && !args.token_secret.is_empty() {
        return Ok(AccessCredential {
            token: args.token_key.clone(),
            secret: args.token_secret.clone(),
        });
    }
    match load_access_credential(token_file).await {
        Err(RebloggrError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            Err(RebloggrError::Config(
                "token must be provided, run the `token` command first".to_string(),
            ))
        }
        result => result,
    }
}

pub async fn load_access_credential(token_file: &Path) -> Result<AccessCredential, RebloggrError> {
    let json = fs::read_to_string(token_file).await?;
    serde_json::from_str(&json).map_err(RebloggrError::CredentialFormat)
}

pub async fn save_access_credential(
    token_file: &Path,
    credential: &AccessCredential,
) -> Result<(), RebloggrError> {
    let json = serde_json::to_string(credential).map_err(RebloggrError::CredentialFormat)?;
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o660);
    let mut file = options.open(token_file).await?;
    file.write_all(json.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::args::{Command, LogLevel};
    use tempfile::tempdir;

    fn args(consumer_key: &str, consumer_secret: &str, callback_url: &str) -> Args {
        Args {
            log_level: LogLevel::Info,
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            callback_url: callback_url.to_string(),
            command: Command::Token,
        }
    }

    fn reblog_args(token_key: &str, token_secret: &str) -> ReblogArgs {
        ReblogArgs {
            token_key: token_key.to_string(),
            token_secret: token_secret.to_string(),
        }
    }

    #[test]
    fn test_config_requires_all_consumer_settings() {
        let error = AppConfig::from_args(&args("", "secret", "https://example.com")).unwrap_err();
        assert_eq!(error.to_string(), "Configuration error: consumer key is required");

        let error = AppConfig::from_args(&args("key", "", "https://example.com")).unwrap_err();
        assert_eq!(error.to_string(), "Configuration error: consumer secret is required");

        let error = AppConfig::from_args(&args("key", "secret", "")).unwrap_err();
        assert!(matches!(error, RebloggrError::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: callback url is required");

        let config = AppConfig::from_args(&args("key", "secret", "https://example.com")).unwrap();
        assert_eq!(config.consumer.key, "key");
        assert_eq!(config.callback_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_saved_credential_is_loaded_back() {
        let dir = tempdir().unwrap();
        let token_file = dir.path().join(TOKEN_FILE);
        let credential = AccessCredential {
            token: "token".to_string(),
            secret: "secret".to_string(),
        };
        save_access_credential(&token_file, &credential).await.unwrap();

        let json = std::fs::read_to_string(&token_file).unwrap();
        assert_eq!(json, r#"{"token":"token","secret":"secret"}"#);
        assert_eq!(load_access_credential(&token_file).await.unwrap(), credential);
    }

    #[tokio::test]
    async fn test_legacy_token_file_is_accepted() {
        let dir = tempdir().unwrap();
        let token_file = dir.path().join(TOKEN_FILE);
        std::fs::write(
            &token_file,
            r#"{"Token":"old-token","Secret":"old-secret","AdditionalData":null}"#,
        )
        .unwrap();

        let credential = resolve_access_credential(&reblog_args("", ""), &token_file)
            .await
            .unwrap();
        assert_eq!(credential.token, "old-token");
        assert_eq!(credential.secret, "old-secret");
    }

    #[tokio::test]
    async fn test_explicit_credential_wins_over_token_file() {
        let dir = tempdir().unwrap();
        let token_file = dir.path().join(TOKEN_FILE);
        std::fs::write(&token_file, r#"{"token":"file","secret":"file"}"#).unwrap();

        let credential =
            resolve_access_credential(&reblog_args("flag", "flag-secret"), &token_file)
                .await
                .unwrap();
        assert_eq!(credential.token, "flag");
        assert_eq!(credential.secret, "flag-secret");

        // Half a pair is not enough, the file is used.
        let credential = resolve_access_credential(&reblog_args("flag", ""), &token_file)
            .await
            .unwrap();
        assert_eq!(credential.token, "file");
    }

    #[tokio::test]
    async fn test_missing_token_file_asks_for_token_command() {
        let dir = tempdir().unwrap();
        let token_file = dir.path().join(TOKEN_FILE);

        let error = resolve_access_credential(&reblog_args("", ""), &token_file)
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Configuration error: token must be provided, run the `token` command first"
        );
    }

    #[tokio::test]
    async fn test_corrupt_token_file_is_an_error() {
        let dir = tempdir().unwrap();
        let token_file = dir.path().join(TOKEN_FILE);
        std::fs::write(&token_file, "not json").unwrap();

        let result = load_access_credential(&token_file).await;
        assert!(matches!(result, Err(RebloggrError::CredentialFormat(_))));
    }
}
