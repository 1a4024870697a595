//! Shared application state passed to every handler.

use crate::{config::Configuration, store::PicshareStore};

#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    pub store: PicshareStore,
}

impl AppState {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            store: PicshareStore::new(),
        }
    }
}
