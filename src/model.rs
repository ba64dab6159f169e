use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type BookId = i64;

/// A subscribable classic book. Only `id` is interpreted; everything else the
/// server sends is carried through untouched.
///
/// Ids are integers on the `/classic_books` API. A list containing any other
/// id shape fails to decode as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Book {
    pub fn with_id(id: BookId) -> Self {
        Book {
            id,
            attributes: Map::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }
}

/// One item of a user's subscribed tweet feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tweet(pub Value);

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub book: Book,
}
