use serde::Serialize;
use serde_json::Value;

use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FullscreenModal {
    pub is_open: bool,
    pub card_set: Option<Value>,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct ModalStore {
    state: Store<FullscreenModal>,
}

impl ModalStore {
    pub fn new() -> Self {
        ModalStore::default()
    }

    pub fn state(&self) -> &Store<FullscreenModal> {
        &self.state
    }

    /// Opens the modal on `card_set`. A missing title shows as empty.
    pub fn open(&self, card_set: Value, title: Option<&str>) {
        let title = title.unwrap_or_default().to_string();
        tracing::debug!(title = %title, "opening fullscreen modal");
        self.state.set(FullscreenModal {
            is_open: true,
            card_set: Some(card_set),
            title,
        });
    }

    pub fn close(&self) {
        tracing::debug!("closing fullscreen modal");
        self.state.set(FullscreenModal::default());
    }
}
