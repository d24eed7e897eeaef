use log::debug;
use oauth1_request as oauth;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{BlogApi, BlogIdentifier, UserInfo};
use crate::config::{AccessCredential, ConsumerCredentials};
use crate::error::RebloggrError;

pub const API_ENDPOINT: &str = "https://api.tumblr.com/v2";
/// Base of the `request_token`, `authorize` and `access_token` endpoints.
pub const OAUTH_ENDPOINT: &str = "https://www.tumblr.com/oauth";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(oauth::Request)]
struct PostsRequest {
    offset: u64,
}

#[derive(oauth::Request)]
struct ReblogRequest<'a> {
    id: u64,
    reblog_key: &'a str,
}

#[derive(oauth::Request)]
struct DeleteRequest {
    id: u64,
}

/// Every API response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    meta: Meta,
    #[serde(default)]
    response: Value,
}

#[derive(Debug, Deserialize)]
struct Meta {
    status: u16,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<Value>,
}

/// Token pair from the request token and access token endpoints, which
/// answer form encoded.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

/// Signs every call with the consumer and access credentials.
pub struct TumblrClient {
    http: Client,
    endpoint: String,
    consumer: ConsumerCredentials,
    access: AccessCredential,
}

impl TumblrClient {
    pub fn new(consumer: ConsumerCredentials, access: AccessCredential) -> Self {
        TumblrClient::with_endpoint(API_ENDPOINT, consumer, access)
    }

    pub fn with_endpoint(
        endpoint: &str,
        consumer: ConsumerCredentials,
        access: AccessCredential,
    ) -> Self {
        TumblrClient {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            consumer,
            access,
        }
    }

    fn token(&self) -> oauth::Token<&str> {
        oauth::Token::from_parts(
            self.consumer.key.as_str(),
            self.consumer.secret.as_str(),
            self.access.token.as_str(),
            self.access.secret.as_str(),
        )
    }

    async fn get<R, T>(&self, url: &str, request: &R) -> Result<T, RebloggrError>
    where
        R: oauth::Request,
        T: DeserializeOwned,
    {
        let authorization = oauth::get(url, request, &self.token(), oauth::HmacSha1::new());
        let url = oauth::to_query(url.to_owned(), request);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_envelope(status, &body)
    }

    async fn post<R, T>(&self, url: &str, request: &R) -> Result<T, RebloggrError>
    where
        R: oauth::Request,
        T: DeserializeOwned,
    {
        let authorization = oauth::post(url, request, &self.token(), oauth::HmacSha1::new());
        let form = oauth::to_form(request);
        debug!("POST {url} {form}");
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_envelope(status, &body)
    }
}

impl BlogApi for TumblrClient {
    async fn user_info(&self) -> Result<UserInfo, RebloggrError> {
        let url = format!("{}/user/info", self.endpoint);
        let response: UserInfoResponse = self.get(&url, &()).await?;
        Ok(response.user)
    }

    async fn list_posts(
        &self,
        blog: &BlogIdentifier,
        offset: u64,
    ) -> Result<Vec<Value>, RebloggrError> {
        let url = format!("{}/blog/{blog}/posts", self.endpoint);
        let response: PostsResponse = self.get(&url, &PostsRequest { offset }).await?;
        Ok(response.posts)
    }

    async fn reblog(
        &self,
        blog: &BlogIdentifier,
        post_id: u64,
        reblog_key: &str,
    ) -> Result<(), RebloggrError> {
        let url = format!("{}/blog/{blog}/post/reblog", self.endpoint);
        let request = ReblogRequest {
            id: post_id,
            reblog_key,
        };
        match self.post::<_, Value>(&url, &request).await {
            Ok(_) => Ok(()),
            Err(error) => Err(classify_reblog_error(error)),
        }
    }

    async fn delete_post(&self, blog: &BlogIdentifier, post_id: u64) -> Result<(), RebloggrError> {
        let url = format!("{}/blog/{blog}/post/delete", self.endpoint);
        self.post::<_, Value>(&url, &DeleteRequest { id: post_id }).await?;
        Ok(())
    }
}

// Unwrap the response envelope, turning non-success statuses into API errors.
fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, RebloggrError> {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(RebloggrError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }
        Err(e) => return Err(RebloggrError::Decode(e)),
    };
    if !status.is_success() || !(200..300).contains(&envelope.meta.status) {
        return Err(RebloggrError::Api {
            status: envelope.meta.status,
            message: envelope.meta.msg,
        });
    }
    serde_json::from_value(envelope.response).map_err(RebloggrError::Decode)
}

/// Tumblr answers a reblog over the daily limit of 250 posts with a plain
/// 400 "Bad Request".
///
/// Tumblr uses that same message for every 400, so a reblog rejected for
/// another reason (a stale reblog key, say) also ends the run as if the limit
/// was hit. Hourly rate limiting (429) stays fatal.
pub fn classify_reblog_error(error: RebloggrError) -> RebloggrError {
    match error {
        RebloggrError::Api {
            status: 400,
            ref message,
        } if message == "Bad Request" => RebloggrError::QuotaExceeded,
        other => other,
    }
}

/// First leg of the OAuth handshake. Returns the temporary token pair.
pub async fn fetch_request_token(
    http: &Client,
    oauth_endpoint: &str,
    consumer: &ConsumerCredentials,
    callback_url: &str,
) -> Result<TokenResponse, RebloggrError> {
    let url = format!("{oauth_endpoint}/request_token");
    let client = oauth::Credentials::new(consumer.key.as_str(), consumer.secret.as_str());
    let authorization = oauth::Builder::<_, _>::new(client, oauth::HmacSha1::new())
        .callback(callback_url)
        .post(&url, &());
    token_exchange(http, &url, authorization).await
}

pub fn authorize_url(
    oauth_endpoint: &str,
    request_token: &TokenResponse,
) -> Result<url::Url, RebloggrError> {
    url::Url::parse_with_params(
        &format!("{oauth_endpoint}/authorize"),
        &[("oauth_token", request_token.oauth_token.as_str())],
    )
    .map_err(|e| RebloggrError::Protocol(e.to_string()))
}

/// Last leg of the OAuth handshake: trade the request token and the verifier
/// the user copied from the callback for the permanent access token.
pub async fn fetch_access_token(
    http: &Client,
    oauth_endpoint: &str,
    consumer: &ConsumerCredentials,
    request_token: &TokenResponse,
    verifier: &str,
) -> Result<AccessCredential, RebloggrError> {
    let url = format!("{oauth_endpoint}/access_token");
    let client = oauth::Credentials::new(consumer.key.as_str(), consumer.secret.as_str());
    let temporary = oauth::Credentials::new(
        request_token.oauth_token.as_str(),
        request_token.oauth_token_secret.as_str(),
    );
    let authorization = oauth::Builder::<_, _>::new(client, oauth::HmacSha1::new())
        .token(temporary)
        .verifier(verifier)
        .post(&url, &());
    let token = token_exchange(http, &url, authorization).await?;
    Ok(AccessCredential {
        token: token.oauth_token,
        secret: token.oauth_token_secret,
    })
}

async fn token_exchange(
    http: &Client,
    url: &str,
    authorization: String,
) -> Result<TokenResponse, RebloggrError> {
    debug!("POST {url}");
    let response = http
        .post(url)
        .header(AUTHORIZATION, authorization)
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .send()
        .await
        .map_err(|e| RebloggrError::Protocol(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RebloggrError::Protocol(e.to_string()))?;
    if !status.is_success() {
        return Err(RebloggrError::Protocol(format!(
            "{url} returned {status}: {}",
            body.trim()
        )));
    }
    parse_token_response(&body)
}

pub fn parse_token_response(body: &str) -> Result<TokenResponse, RebloggrError> {
    serde_html_form::from_str(body.trim()).map_err(|e| {
        RebloggrError::Protocol(format!("Unexpected token response {body:?}: {e}"))
    })
}
