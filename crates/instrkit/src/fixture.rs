use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use instrkit_object::{wire::selector, Object};
use instrkit_transport::ReplayTransport;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// Captured device replies, replayed by the CLI in place of a live device.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    /// Reply per service and selector.
    pub replies: BTreeMap<String, BTreeMap<String, Value>>,
    /// Push messages delivered once a service's stream is started.
    pub streams: BTreeMap<String, Vec<Value>>,
    /// Services whose channels are refused.
    pub refuse: Vec<String>,
    /// Selectors that fail as a dropped connection, per service.
    pub fail: BTreeMap<String, Vec<String>>,
}

impl Fixture {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        Self::parse(&text).map_err(|err| {
            CliError::new(
                DATA_INVALID,
                format!("invalid fixture {}: {}", path.display(), err.message),
            )
        })
    }

    pub fn parse(text: &str) -> CliResult<Self> {
        serde_json::from_str(text).map_err(|err| CliError::new(DATA_INVALID, err.to_string()))
    }

    /// Build a replay transport answering from this fixture.
    ///
    /// Stream services without a scripted `setConfig:` reply acknowledge it
    /// with null.
    pub fn into_transport(self) -> ReplayTransport {
        let mut transport = ReplayTransport::new();

        for (service, selectors) in self.replies {
            for (name, reply) in selectors {
                transport = transport.with_reply(&service, &name, Object::from(reply));
            }
        }
        for (service, messages) in self.streams {
            if !transport.has_reply(&service, selector::SET_CONFIG) {
                transport = transport.with_reply(&service, selector::SET_CONFIG, Object::Null);
            }
            transport =
                transport.with_stream(&service, messages.into_iter().map(Object::from).collect());
        }
        for service in self.refuse {
            transport = transport.with_refused_channel(&service, "refused by fixture");
        }
        for (service, selectors) in self.fail {
            for name in selectors {
                transport = transport.with_failing_selector(&service, &name, "failed by fixture");
            }
        }

        debug!(streams = ?transport.stream_services(), "fixture loaded");
        transport
    }
}
