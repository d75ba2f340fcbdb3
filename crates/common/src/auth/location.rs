//! Page URL helpers and the in-memory [`Location`]

use parking_lot::Mutex;
use url::Url;

use super::traits::Location;

/// Copy of `url` with every `name` query parameter removed
///
/// Other parameters keep their order. An emptied query string is dropped
/// entirely rather than left as a bare `?`.
#[must_use]
pub fn without_query_param(url: &Url, name: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

/// First value of query parameter `name`, if present
#[must_use]
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
}

#[derive(Debug)]
struct LocationState {
    current: Url,
    navigations: Vec<Url>,
}

/// [`Location`] for hosts without a real address bar, and for tests
///
/// `assign` records the navigation and makes it the current URL.
#[derive(Debug)]
pub struct InMemoryLocation {
    state: Mutex<LocationState>,
}

impl InMemoryLocation {
    /// Start at `url` with no navigations recorded
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { state: Mutex::new(LocationState { current: url, navigations: Vec::new() }) }
    }

    /// Parse `url` and start there
    ///
    /// # Errors
    /// Returns the parse error for a malformed URL.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Every URL passed to `assign`, oldest first
    #[must_use]
    pub fn navigations(&self) -> Vec<Url> {
        self.state.lock().navigations.clone()
    }

    /// Most recent `assign` target
    #[must_use]
    pub fn last_navigation(&self) -> Option<Url> {
        self.state.lock().navigations.last().cloned()
    }
}

impl Location for InMemoryLocation {
    fn current_url(&self) -> Url {
        self.state.lock().current.clone()
    }

    fn replace_url(&self, url: Url) {
        self.state.lock().current = url;
    }

    fn assign(&self, url: Url) {
        let mut state = self.state.lock();
        state.current = url.clone();
        state.navigations.push(url);
    }
}
