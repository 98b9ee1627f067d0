use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Identifies one request issued for a slot. Tokens only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// State of one logical request stream. Only the most recently issued token may
/// write a result; older completions are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSlot<T> {
    state: FetchState,
    value: Option<T>,
    error: Option<String>,
    #[serde(skip)]
    issued: u64,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            state: FetchState::Idle,
            value: None,
            error: None,
            issued: 0,
        }
    }
}

impl<T> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request: clears the previous value and error.
    pub fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        self.state = FetchState::Loading;
        self.value = None;
        self.error = None;
        RequestToken(self.issued)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Applies `result` if `token` is still the latest. Returns whether it was
    /// applied.
    pub fn complete<E: Display>(&mut self, token: RequestToken, result: Result<T, E>) -> bool {
        if !self.is_latest(token) {
            return false;
        }
        match result {
            Ok(value) => {
                self.state = FetchState::Success;
                self.value = Some(value);
                self.error = None;
            }
            Err(err) => {
                self.state = FetchState::Error;
                self.value = None;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Returns the slot to `Idle` and invalidates any outstanding token.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.state = FetchState::Idle;
        self.value = None;
        self.error = None;
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == FetchState::Loading
    }
}
