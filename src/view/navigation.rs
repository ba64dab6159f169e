use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Store;

/// A chapter as delivered by the server. Only `feel` is read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub feel: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wonder(pub Value);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Default)]
pub struct Navigation {
    pub chapters: Store<Vec<Chapter>>,
    pub chapters_map: Store<Vec<Value>>,
    pub wonders: Store<Vec<Wonder>>,
    pub wonders_map: Store<Vec<Value>>,
    pub popular_wonders: Store<Vec<Wonder>>,
    pub map_shown: Store<bool>,
    pub selected_chapter: Store<Option<Chapter>>,
    pub selected_wonder: Store<Option<Wonder>>,
    pub selected_feel: Store<Option<Value>>,
    pub theme: Store<Theme>,
}

impl Navigation {
    pub fn new() -> Self {
        Navigation::default()
    }

    /// Selecting a chapter adopts its feel and drops any selected wonder.
    pub fn select_chapter(&self, chapter: Chapter) {
        self.selected_feel.set(chapter.feel.clone());
        self.selected_chapter.set(Some(chapter));
        self.selected_wonder.set(None);
    }

    pub fn select_wonder(&self, wonder: Wonder) {
        self.selected_wonder.set(Some(wonder));
        self.selected_chapter.set(None);
    }

    pub fn go_home(&self) {
        self.clear_selection();
    }

    pub fn sign_in(&self) {
        self.clear_selection();
    }

    fn clear_selection(&self) {
        self.selected_wonder.set(None);
        self.selected_chapter.set(None);
    }
}
