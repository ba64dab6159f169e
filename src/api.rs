use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;

use crate::config::ApiSettings;
use crate::error::ApiError;
use crate::model::{Book, BookId, SubscribeResponse, Tweet};

/// The remote classic-books service, as consumed by the shelf.
pub trait RemoteService: Send + Sync {
    fn list_catalog(&self) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send;

    fn list_subscribed(&self, user_id: &str) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send;

    fn list_subscribed_tweets(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Tweet>, ApiError>> + Send;

    fn subscribe(
        &self,
        book_id: BookId,
        user_id: &str,
    ) -> impl Future<Output = Result<SubscribeResponse, ApiError>> + Send;

    fn unsubscribe(&self, book_id: BookId, user_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

pub fn catalog_path() -> String {
    "/classic_books".to_string()
}

pub fn subscribed_path(user_id: &str) -> String {
    format!("/classic_books/{}/subscribed", urlencoding::encode(user_id))
}

pub fn subscribed_tweets_path(user_id: &str) -> String {
    format!("/classic_books/{}/subscribed_tweets", urlencoding::encode(user_id))
}

pub fn subscribe_path(book_id: BookId, user_id: &str) -> String {
    format!("/classic_books/{}/subscribe/{}", book_id, urlencoding::encode(user_id))
}

pub fn unsubscribe_path(book_id: BookId, user_id: &str) -> String {
    format!("/classic_books/{}/unsubscribe/{}", book_id, urlencoding::encode(user_id))
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(ApiError::Setup)?;

        Ok(HttpApi {
            client,
            base_url: settings.get_base_url().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response, ApiError> {
        let verb = method_name(&method);
        tracing::debug!(method = verb, path = %path, "calling book service");

        let response = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                method: verb,
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method: verb,
                path: path.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, method: Method, path: String) -> Result<T, ApiError> {
        let verb = method_name(&method);
        let body = self
            .send(method, &path)
            .await?
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                method: verb,
                path: path.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            method: verb,
            path,
            source,
        })
    }
}

fn method_name(method: &Method) -> &'static str {
    if *method == Method::GET {
        "GET"
    } else if *method == Method::POST {
        "POST"
    } else if *method == Method::DELETE {
        "DELETE"
    } else {
        "OTHER"
    }
}

impl RemoteService for HttpApi {
    fn list_catalog(&self) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send {
        self.fetch(Method::GET, catalog_path())
    }

    fn list_subscribed(&self, user_id: &str) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send {
        self.fetch(Method::GET, subscribed_path(user_id))
    }

    fn list_subscribed_tweets(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Tweet>, ApiError>> + Send {
        self.fetch(Method::GET, subscribed_tweets_path(user_id))
    }

    fn subscribe(
        &self,
        book_id: BookId,
        user_id: &str,
    ) -> impl Future<Output = Result<SubscribeResponse, ApiError>> + Send {
        self.fetch(Method::POST, subscribe_path(book_id, user_id))
    }

    fn unsubscribe(&self, book_id: BookId, user_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        let path = unsubscribe_path(book_id, user_id);
        async move {
            // the body, if any, is not part of the contract
            self.send(Method::DELETE, &path).await?;
            Ok(())
        }
    }
}
