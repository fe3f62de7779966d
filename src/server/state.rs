//! Application state shared across HTTP handlers

use crate::Warden;
use std::ops::Deref;
use std::sync::Arc;

/// Handler state; derefs to the wired application
#[derive(Clone)]
pub struct AppState {
    warden: Arc<Warden>,
}

impl AppState {
    pub fn new(warden: Arc<Warden>) -> Self {
        Self { warden }
    }
}

impl Deref for AppState {
    type Target = Warden;

    fn deref(&self) -> &Warden {
        &self.warden
    }
}
