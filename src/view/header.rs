use serde::{Deserialize, Serialize};

use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveButton {
    Filter,
    Explore,
}

/// The header's toggle buttons. Kept in one value so the three fields always agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeaderState {
    pub active: Option<ActiveButton>,
    pub show_filter: bool,
    pub show_explore: bool,
}

#[derive(Debug, Default)]
pub struct HeaderStore {
    state: Store<HeaderState>,
}

impl HeaderStore {
    pub fn new() -> Self {
        HeaderStore::default()
    }

    pub fn state(&self) -> &Store<HeaderState> {
        &self.state
    }

    pub fn set_active_button(&self, button: Option<ActiveButton>) {
        self.state.set(HeaderState {
            active: button,
            show_filter: button == Some(ActiveButton::Filter),
            show_explore: button == Some(ActiveButton::Explore),
        });
    }
}
