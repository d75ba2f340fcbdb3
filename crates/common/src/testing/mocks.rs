//! Mock implementations of the auth traits
//!
//! Provides mock objects for testing purposes.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::fixtures::token_response;
use crate::auth::{ExchangeError, GrantType, TokenExchanger, TokenResponse};

type Probe = Arc<dyn Fn() + Send + Sync>;

/// One captured call to [`TokenExchanger::exchange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExchange {
    /// Grant requested
    pub grant: GrantType,
    /// Grant-specific form fields, in call order
    pub params: Vec<(String, String)>,
}

impl RecordedExchange {
    /// Value of a grant-specific parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<TokenResponse, ExchangeError>>,
    calls: Vec<RecordedExchange>,
    probe: Option<Probe>,
}

/// Token exchanger that replays scripted results in order
///
/// Clones share state, so a test can keep a handle after moving one into a
/// coordinator. An unscripted call fails with `ExchangeError::Network`.
///
/// # Examples
///
/// ```
/// use pca_common::auth::ExchangeError;
/// use pca_common::testing::MockTokenExchanger;
///
/// let exchanger = MockTokenExchanger::new();
/// exchanger.push_tokens("I1", "A1", Some("R1"));
/// exchanger.push_error(ExchangeError::BadResponse { status: 400 });
/// assert_eq!(exchanger.pending(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockTokenExchanger {
    state: Arc<Mutex<MockState>>,
}

impl MockTokenExchanger {
    /// Exchanger with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn push_response(&self, response: TokenResponse) {
        self.state.lock().responses.push_back(Ok(response));
    }

    /// Queue a successful response from plain token strings
    pub fn push_tokens(&self, id: &str, access: &str, refresh: Option<&str>) {
        self.push_response(token_response(id, access, refresh));
    }

    /// Queue a failure
    pub fn push_error(&self, error: ExchangeError) {
        self.state.lock().responses.push_back(Err(error));
    }

    /// Run `probe` at the start of every exchange, before the result is
    /// returned. Useful for inspecting store state mid-flight.
    pub fn set_probe(&self, probe: impl Fn() + Send + Sync + 'static) {
        self.state.lock().probe = Some(Arc::new(probe));
    }

    /// All calls so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedExchange> {
        self.state.lock().calls.clone()
    }

    /// Number of exchanges made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of calls made with `grant`
    #[must_use]
    pub fn calls_for(&self, grant: GrantType) -> usize {
        self.state.lock().calls.iter().filter(|call| call.grant == grant).count()
    }

    /// Scripted results not yet consumed
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.lock().responses.len()
    }
}

#[async_trait]
impl TokenExchanger for MockTokenExchanger {
    async fn exchange(
        &self,
        grant: GrantType,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, ExchangeError> {
        let probe = {
            let mut state = self.state.lock();
            state.calls.push(RecordedExchange {
                grant,
                params: params.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
            });
            state.probe.clone()
        };

        // Called without the lock held so the probe may read anything.
        if let Some(probe) = probe {
            probe();
        }

        self.state
            .lock()
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::Network("no scripted response".to_string())))
    }
}
