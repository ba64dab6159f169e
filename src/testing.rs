//! Scripted in-memory book service for unit tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::api::{
    RemoteService, catalog_path, subscribe_path, subscribed_path, subscribed_tweets_path, unsubscribe_path,
};
use crate::error::ApiError;
use crate::model::{Book, BookId, SubscribeResponse, Tweet};

/// Holds the tweet request open until the test releases it.
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Debug)]
pub struct FakeService {
    catalog: Option<Vec<Book>>,
    subscribed: Option<Vec<Book>>,
    tweets: Option<Vec<Tweet>>,
    subscribe_record: Option<Book>,
    subscribe_fails: bool,
    unsubscribe_fails: bool,
    tweet_gate: Option<Arc<Gate>>,
    calls: Mutex<Vec<String>>,
}

fn unavailable(method: &'static str, path: String) -> ApiError {
    ApiError::Status {
        method,
        path,
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl FakeService {
    /// Every request succeeds with empty data; subscribe echoes the requested id.
    pub fn new() -> Self {
        FakeService {
            catalog: Some(Vec::new()),
            subscribed: Some(Vec::new()),
            tweets: Some(Vec::new()),
            subscribe_record: None,
            subscribe_fails: false,
            unsubscribe_fails: false,
            tweet_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_catalog(mut self, books: Vec<Book>) -> Self {
        self.catalog = Some(books);
        self
    }

    pub fn failing_catalog(mut self) -> Self {
        self.catalog = None;
        self
    }

    pub fn with_subscribed(mut self, books: Vec<Book>) -> Self {
        self.subscribed = Some(books);
        self
    }

    pub fn failing_subscribed(mut self) -> Self {
        self.subscribed = None;
        self
    }

    pub fn with_tweets(mut self, tweets: Vec<Tweet>) -> Self {
        self.tweets = Some(tweets);
        self
    }

    pub fn failing_tweets(mut self) -> Self {
        self.tweets = None;
        self
    }

    pub fn with_subscribe_record(mut self, book: Book) -> Self {
        self.subscribe_record = Some(book);
        self
    }

    pub fn failing_subscribe(mut self) -> Self {
        self.subscribe_fails = true;
        self
    }

    pub fn failing_unsubscribe(mut self) -> Self {
        self.unsubscribe_fails = true;
        self
    }

    pub fn gated_tweets(mut self) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        self.tweet_gate = Some(gate.clone());
        (self, gate)
    }

    /// Requests seen so far, as `"METHOD /path"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &str, path: &str) {
        self.calls.lock().unwrap().push(format!("{} {}", method, path));
    }
}

impl RemoteService for FakeService {
    fn list_catalog(&self) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send {
        async move {
            let path = catalog_path();
            self.record("GET", &path);
            self.catalog.clone().ok_or_else(|| unavailable("GET", path))
        }
    }

    fn list_subscribed(&self, user_id: &str) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send {
        let path = subscribed_path(user_id);
        async move {
            self.record("GET", &path);
            self.subscribed.clone().ok_or_else(|| unavailable("GET", path))
        }
    }

    fn list_subscribed_tweets(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Tweet>, ApiError>> + Send {
        let path = subscribed_tweets_path(user_id);
        async move {
            self.record("GET", &path);
            if let Some(gate) = &self.tweet_gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            self.tweets.clone().ok_or_else(|| unavailable("GET", path))
        }
    }

    fn subscribe(
        &self,
        book_id: BookId,
        user_id: &str,
    ) -> impl Future<Output = Result<SubscribeResponse, ApiError>> + Send {
        let path = subscribe_path(book_id, user_id);
        async move {
            self.record("POST", &path);
            if self.subscribe_fails {
                return Err(unavailable("POST", path));
            }
            let book = self
                .subscribe_record
                .clone()
                .unwrap_or_else(|| Book::with_id(book_id));
            Ok(SubscribeResponse { book })
        }
    }

    fn unsubscribe(&self, book_id: BookId, user_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        let path = unsubscribe_path(book_id, user_id);
        async move {
            self.record("DELETE", &path);
            if self.unsubscribe_fails {
                return Err(unavailable("DELETE", path));
            }
            Ok(())
        }
    }
}
