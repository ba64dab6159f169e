//! Client-side view of the classic-books catalog and a user's subscriptions.
//!
//! [`BookShelf`] keeps two lists that partition every known book: the catalog
//! (books the user does not follow) and the subscribed list. Lists are only
//! changed after the request that justifies the change has succeeded, so a
//! failed subscribe or unsubscribe never needs to be rolled back.
//!
//! Failures are never raised. Fetches degrade to an empty list, membership
//! changes leave both lists untouched, and every settled operation is
//! published as a [`SyncEvent`] for observers that want to surface errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, broadcast};

use crate::api::RemoteService;
use crate::error::ApiError;
use crate::model::{Book, BookId, Tweet};
use crate::store::{Flag, Store};
use crate::unpack_error;

const EVENT_CAPACITY: usize = 64;

/// How concurrent operations on one shelf interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Operations run independently; whichever settles last overwrites the lists.
    #[default]
    LastWriteWins,
    /// One operation at a time. The feed refresh chained to a subscribe runs inside that subscribe's turn.
    Serialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchAllBooks,
    FetchSubscribedBooks,
    FetchSubscribedTweets,
    Subscribe,
    Unsubscribe,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FetchAllBooks => "fetch_all_books",
            Operation::FetchSubscribedBooks => "fetch_subscribed_books",
            Operation::FetchSubscribedTweets => "fetch_subscribed_tweets",
            Operation::Subscribe => "subscribe",
            Operation::Unsubscribe => "unsubscribe",
        }
    }
}

/// Stages of a subscribe/unsubscribe pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Request,
    Reconcile,
    RefreshFeed,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// No user was given; nothing was requested or changed.
    Skipped,
    Applied,
    Failed(Arc<ApiError>),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Outcome::Failed(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub operation: Operation,
    pub user_id: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelfSnapshot {
    pub all_books: Vec<Book>,
    pub subscribed_books: Vec<Book>,
    pub subscribed_tweets: Vec<Tweet>,
    pub is_loading_subscribed: bool,
    pub is_loading_tweets: bool,
    pub is_subscribing: bool,
}

#[derive(Debug, Clone)]
pub struct SessionLoad {
    pub catalog: Outcome,
    pub subscribed: Outcome,
    pub tweets: Outcome,
}

enum Membership<'a> {
    Subscribe(&'a Book),
    Unsubscribe(&'a Book),
}

enum Reconcile {
    Subscribed { requested: BookId, record: Book },
    Unsubscribed(Book),
}

#[derive(Debug)]
pub struct BookShelf<S> {
    service: S,
    all_books: Store<Vec<Book>>,
    subscribed_books: Store<Vec<Book>>,
    subscribed_tweets: Store<Vec<Tweet>>,
    is_loading_subscribed: Flag,
    is_loading_tweets: Flag,
    is_subscribing: Flag,
    events: broadcast::Sender<SyncEvent>,
    writer: Option<Mutex<()>>,
}

/// Empty ids count as absent.
fn present(user_id: Option<&str>) -> Option<&str> {
    user_id.filter(|id| !id.is_empty())
}

impl<S: RemoteService> BookShelf<S> {
    pub fn new(service: S, policy: WritePolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let writer = match policy {
            WritePolicy::LastWriteWins => None,
            WritePolicy::Serialized => Some(Mutex::new(())),
        };

        BookShelf {
            service,
            all_books: Store::default(),
            subscribed_books: Store::default(),
            subscribed_tweets: Store::default(),
            is_loading_subscribed: Flag::new(),
            is_loading_tweets: Flag::new(),
            is_subscribing: Flag::new(),
            events,
            writer,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn write_policy(&self) -> WritePolicy {
        match self.writer {
            Some(_) => WritePolicy::Serialized,
            None => WritePolicy::LastWriteWins,
        }
    }

    pub fn all_books(&self) -> &Store<Vec<Book>> {
        &self.all_books
    }

    pub fn subscribed_books(&self) -> &Store<Vec<Book>> {
        &self.subscribed_books
    }

    pub fn subscribed_tweets(&self) -> &Store<Vec<Tweet>> {
        &self.subscribed_tweets
    }

    pub fn is_loading_subscribed(&self) -> &Flag {
        &self.is_loading_subscribed
    }

    pub fn is_loading_tweets(&self) -> &Flag {
        &self.is_loading_tweets
    }

    pub fn is_subscribing(&self) -> &Flag {
        &self.is_subscribing
    }

    /// Receives one event per settled operation. Skipped operations publish nothing.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> ShelfSnapshot {
        ShelfSnapshot {
            all_books: self.all_books.get(),
            subscribed_books: self.subscribed_books.get(),
            subscribed_tweets: self.subscribed_tweets.get(),
            is_loading_subscribed: self.is_loading_subscribed.get(),
            is_loading_tweets: self.is_loading_tweets.get(),
            is_subscribing: self.is_subscribing.get(),
        }
    }

    pub async fn fetch_all_books(&self) -> Outcome {
        let _turn = self.turn().await;
        let result = match self.service.list_catalog().await {
            Ok(books) => {
                tracing::info!(count = books.len(), "fetched all books");
                self.all_books.set(books);
                Ok(())
            }
            Err(e) => {
                self.all_books.set(Vec::new());
                Err(e)
            }
        };
        self.report(Operation::FetchAllBooks, None, result)
    }

    pub async fn fetch_subscribed_books(&self, user_id: Option<&str>) -> Outcome {
        let Some(user_id) = present(user_id) else {
            return Outcome::Skipped;
        };

        let result = {
            let _loading = self.is_loading_subscribed.raise();
            let _turn = self.turn().await;
            match self.service.list_subscribed(user_id).await {
                Ok(books) => {
                    tracing::info!(user_id, count = books.len(), "fetched subscribed books");
                    self.subscribed_books.set(books);
                    Ok(())
                }
                Err(e) => {
                    self.subscribed_books.set(Vec::new());
                    Err(e)
                }
            }
        };
        self.report(Operation::FetchSubscribedBooks, Some(user_id), result)
    }

    pub async fn fetch_subscribed_tweets(&self, user_id: Option<&str>) -> Outcome {
        let Some(user_id) = present(user_id) else {
            return Outcome::Skipped;
        };

        let _turn = self.turn().await;
        self.refresh_tweets(user_id).await
    }

    pub async fn subscribe(&self, book: &Book, user_id: Option<&str>) -> Outcome {
        let Some(user_id) = present(user_id) else {
            return Outcome::Skipped;
        };

        let result = self.run_membership(Membership::Subscribe(book), user_id).await;
        self.report(Operation::Subscribe, Some(user_id), result)
    }

    pub async fn unsubscribe(&self, book: &Book, user_id: Option<&str>) -> Outcome {
        let Some(user_id) = present(user_id) else {
            return Outcome::Skipped;
        };

        let result = self.run_membership(Membership::Unsubscribe(book), user_id).await;
        self.report(Operation::Unsubscribe, Some(user_id), result)
    }

    /// Loads the catalog, the user's subscriptions and their feed concurrently.
    pub async fn load_session(&self, user_id: Option<&str>) -> SessionLoad {
        let (catalog, subscribed, tweets) = tokio::join!(
            self.fetch_all_books(),
            self.fetch_subscribed_books(user_id),
            self.fetch_subscribed_tweets(user_id),
        );
        SessionLoad {
            catalog,
            subscribed,
            tweets,
        }
    }

    async fn turn(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.writer {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    /// Refreshes the feed without taking a turn; callers hold one if the policy needs it.
    async fn refresh_tweets(&self, user_id: &str) -> Outcome {
        let result = {
            let _loading = self.is_loading_tweets.raise();
            match self.service.list_subscribed_tweets(user_id).await {
                Ok(tweets) => {
                    tracing::info!(user_id, count = tweets.len(), "fetched subscribed tweets");
                    self.subscribed_tweets.set(tweets);
                    Ok(())
                }
                Err(e) => {
                    self.subscribed_tweets.set(Vec::new());
                    Err(e)
                }
            }
        };
        self.report(Operation::FetchSubscribedTweets, Some(user_id), result)
    }

    /// Request, reconcile, refresh. `is_subscribing` covers all three stages.
    async fn run_membership(&self, change: Membership<'_>, user_id: &str) -> Result<(), ApiError> {
        let _in_flight = self.is_subscribing.raise();
        let _turn = self.turn().await;

        tracing::debug!(stage = ?Stage::Request, user_id, "membership change");
        let reconcile = match change {
            Membership::Subscribe(book) => {
                let response = self.service.subscribe(book.id, user_id).await?;
                Reconcile::Subscribed {
                    requested: book.id,
                    record: response.book,
                }
            }
            Membership::Unsubscribe(book) => {
                self.service.unsubscribe(book.id, user_id).await?;
                Reconcile::Unsubscribed(book.clone())
            }
        };

        tracing::debug!(stage = ?Stage::Reconcile, user_id, "membership change");
        self.reconcile(reconcile);

        tracing::debug!(stage = ?Stage::RefreshFeed, user_id, "membership change");
        self.refresh_tweets(user_id).await;

        Ok(())
    }

    // A book leaves its old list before it joins the new one, so no observer
    // ever sees it in both.
    fn reconcile(&self, change: Reconcile) {
        match change {
            Reconcile::Subscribed { requested, record } => {
                let record_id = record.id;
                self.all_books
                    .update(|books| books.retain(|b| b.id != requested && b.id != record_id));
                self.subscribed_books.update(|books| {
                    books.retain(|b| b.id != record_id);
                    books.push(record);
                });
            }
            Reconcile::Unsubscribed(book) => {
                let id = book.id;
                self.subscribed_books.update(|books| books.retain(|b| b.id != id));
                self.all_books.update(|books| {
                    books.retain(|b| b.id != id);
                    books.push(book);
                });
            }
        }
    }

    fn report(&self, operation: Operation, user_id: Option<&str>, result: Result<(), ApiError>) -> Outcome {
        let outcome = match result {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                tracing::error!(
                    operation = operation.as_str(),
                    user_id,
                    error = %unpack_error(&e),
                    "book service request failed"
                );
                Outcome::Failed(Arc::new(e))
            }
        };

        // nobody listening is fine
        let _ = self.events.send(SyncEvent {
            operation,
            user_id: user_id.map(str::to_string),
            outcome: outcome.clone(),
        });
        outcome
    }
}
