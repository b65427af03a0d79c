use std::fs;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::chain::{Address, ChainBackend, ChainError};
use crate::selector::Selector;

/// One facet in a recorded diamond snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureFacet {
    pub address: Address,
    pub selectors: Vec<Selector>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FixtureFile {
    facets: Vec<FixtureFacet>,
    #[serde(default)]
    send_limit: Option<usize>,
}

/// Chain backend that answers loupe queries from a static snapshot instead of
/// an endpoint, and records submissions instead of broadcasting them.
///
/// Responses mimic `cast`'s decoded textual output so the same parsing code
/// runs against both backends. Used by tests and by offline dry-runs.
pub struct FixtureBackend {
    facets: Vec<FixtureFacet>,
    calls: Mutex<Vec<String>>,
    sends: Mutex<Vec<String>>,
    send_limit: Option<usize>,
}

impl FixtureBackend {
    pub fn new(facets: Vec<FixtureFacet>) -> Self {
        Self {
            facets,
            calls: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
            send_limit: None,
        }
    }

    /// Load a snapshot from a JSON file of the form
    /// `{"facets": [{"address": "0x...", "selectors": ["0x12345678", ...]}]}`.
    /// An optional top-level `send_limit` caps how many submissions succeed.
    pub fn from_path(path: &Path) -> Result<Self, ChainError> {
        let body = fs::read_to_string(path).map_err(|e| {
            ChainError::Response(format!("failed to read fixture {}: {e}", path.display()))
        })?;
        let parsed: FixtureFile = serde_json::from_str(&body).map_err(|e| {
            ChainError::Response(format!("failed to parse fixture {}: {e}", path.display()))
        })?;
        let mut backend = Self::new(parsed.facets);
        backend.send_limit = parsed.send_limit;
        Ok(backend)
    }

    /// Fail every `send` after the first `limit` submissions. Lets tests
    /// exercise the partial-execution reporting path.
    pub fn with_send_limit(mut self, limit: usize) -> Self {
        self.send_limit = Some(limit);
        self
    }

    /// Queries answered so far (loupe signatures, in order).
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Submissions recorded so far, formatted `sig args...`.
    pub fn sends(&self) -> Vec<String> {
        self.sends.lock().expect("sends lock").clone()
    }

    fn facet_for(&self, address: &Address) -> Option<&FixtureFacet> {
        self.facets.iter().find(|f| f.address == *address)
    }
}

fn bracket_list<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let rendered: Vec<String> = items.map(|i| i.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

impl ChainBackend for FixtureBackend {
    fn call(&self, _to: &Address, sig: &str, args: &[String]) -> Result<String, ChainError> {
        self.calls.lock().expect("calls lock").push(sig.to_string());

        if sig.starts_with("facetAddresses(") {
            return Ok(bracket_list(self.facets.iter().map(|f| f.address)));
        }
        if sig.starts_with("facetFunctionSelectors(") {
            let arg = args.first().ok_or_else(|| {
                ChainError::Response("facetFunctionSelectors needs an address argument".into())
            })?;
            let address = Address::parse(arg).map_err(|e| ChainError::Response(e.to_string()))?;
            let selectors = self
                .facet_for(&address)
                .map(|f| f.selectors.clone())
                .unwrap_or_default();
            return Ok(bracket_list(selectors.into_iter()));
        }
        if sig.starts_with("facetAddress(") {
            let arg = args.first().ok_or_else(|| {
                ChainError::Response("facetAddress needs a selector argument".into())
            })?;
            let wanted = Selector::parse(arg).map_err(|e| ChainError::Response(e.to_string()))?;
            let owner = self
                .facets
                .iter()
                .find(|f| f.selectors.contains(&wanted))
                .map(|f| f.address)
                .unwrap_or(Address::ZERO);
            return Ok(owner.to_string());
        }

        Err(ChainError::Response(format!("fixture backend has no answer for '{sig}'")))
    }

    fn send(&self, _to: &Address, sig: &str, args: &[String]) -> Result<String, ChainError> {
        let mut sends = self.sends.lock().expect("sends lock");
        if let Some(limit) = self.send_limit {
            if sends.len() >= limit {
                return Err(ChainError::Command {
                    tool: "fixture".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "send limit reached".to_string(),
                });
            }
        }
        sends.push(format!("{sig} {}", args.join(" ")));
        Ok(format!("transactionHash 0x{:064x}", sends.len()))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
