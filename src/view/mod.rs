//! View State
//!
//! Small stores backing the page chrome: the fullscreen card modal, the
//! header's filter/explore toggle, and chapter/wonder navigation. None of them
//! talk to the book service; every write simply replaces the previous value.

mod header;
mod modal;
mod navigation;

pub use header::{ActiveButton, HeaderState, HeaderStore};
pub use modal::{FullscreenModal, ModalStore};
pub use navigation::{Chapter, Navigation, Theme, Wonder};
