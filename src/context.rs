use std::sync::Arc;

use crate::api::{HttpApi, RemoteService};
use crate::books::{BookShelf, Outcome, SessionLoad, WritePolicy};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::{Book, BookId};
use crate::view::{HeaderStore, ModalStore, Navigation};

/// Every store the client owns, built once at startup and shared by handle.
#[derive(Debug)]
pub struct AppContext<S = HttpApi> {
    pub books: Arc<BookShelf<S>>,
    pub modal: ModalStore,
    pub header: HeaderStore,
    pub navigation: Navigation,
    user_id: Option<String>,
}

impl AppContext<HttpApi> {
    pub fn from_config(cfg: &Config) -> Result<Arc<Self>, ApiError> {
        let api = HttpApi::new(&cfg.api)?;
        tracing::info!(base_url = api.base_url(), policy = ?cfg.sync.write_policy, "book service configured");
        Ok(Arc::new(AppContext::new(
            api,
            cfg.sync.write_policy,
            cfg.session.user_id.clone(),
        )))
    }
}

impl<S: RemoteService> AppContext<S> {
    pub fn new(service: S, policy: WritePolicy, user_id: Option<String>) -> Self {
        AppContext {
            books: Arc::new(BookShelf::new(service, policy)),
            modal: ModalStore::new(),
            header: HeaderStore::new(),
            navigation: Navigation::new(),
            user_id,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Loads the shelf for the session user, or just the catalog if there is none.
    pub async fn load(&self) -> SessionLoad {
        self.books.load_session(self.user_id()).await
    }

    /// Subscribes to a book known only by id. The catalog is fetched first so
    /// the full record moves between lists. Returns the lookup and subscribe outcomes.
    pub async fn subscribe_by_id(&self, book_id: BookId, user_id: Option<&str>) -> Vec<Outcome> {
        if user_id.is_none_or(str::is_empty) {
            return vec![Outcome::Skipped];
        }
        let lookup = self.books.fetch_all_books().await;
        let book = find_book(&self.books.all_books().get(), book_id);
        vec![lookup, self.books.subscribe(&book, user_id).await]
    }

    /// Mirror of [`AppContext::subscribe_by_id`], looking the book up in the subscribed list.
    pub async fn unsubscribe_by_id(&self, book_id: BookId, user_id: Option<&str>) -> Vec<Outcome> {
        if user_id.is_none_or(str::is_empty) {
            return vec![Outcome::Skipped];
        }
        let lookup = self.books.fetch_subscribed_books(user_id).await;
        let book = find_book(&self.books.subscribed_books().get(), book_id);
        vec![lookup, self.books.unsubscribe(&book, user_id).await]
    }
}

/// Uses the full record when the book is known locally, otherwise just its id.
fn find_book(books: &[Book], id: BookId) -> Book {
    books
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .unwrap_or_else(|| Book::with_id(id))
}
