//! Tool router: resolves, validates and executes one invocation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;
use whisper_audio::{AudioCodec, AudioTranscoder, FfmpegCodec, FileInspector};
use whisper_core::Tool;
use whisper_settings::{SettingsError, WhisperSettings};
use whisper_speech::SpeechClient;

use crate::envelope::{InvocationState, ToolEnvelope};
use crate::errors::ToolError;
use crate::handlers::{self, Services};
use crate::operation::OperationParams;
use crate::registry::ToolRegistry;

/// Tracks one invocation's state and logs each transition.
struct Lifecycle {
    state: InvocationState,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            state: InvocationState::Received,
        }
    }

    fn advance(&mut self, next: InvocationState) {
        debug_assert!(self.state.can_transition_to(next), "{:?} -> {next:?}", self.state);
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }
}

/// Single entry point for every operation.
///
/// Unknown names, bad parameters and a missing credential end in
/// `rejected` before any component runs. Component failures end in `failed`.
#[derive(Clone)]
pub struct ToolRouter {
    registry: ToolRegistry,
    services: Services,
    credential_configured: bool,
}

impl ToolRouter {
    /// Create a router over prebuilt components.
    pub fn new(registry: ToolRegistry, services: Services, credential_configured: bool) -> Self {
        Self {
            registry,
            services,
            credential_configured,
        }
    }

    /// Build the production component graph from settings.
    pub fn from_settings(settings: &WhisperSettings) -> Result<Self, ToolError> {
        let codec: Arc<dyn AudioCodec> = Arc::new(FfmpegCodec::new(&settings.codec));
        let output_dir = settings.files.effective_output_dir();

        let services = Services {
            inspector: FileInspector::new(settings.files.base_dir.clone(), codec.clone()),
            transcoder: AudioTranscoder::new(codec.clone(), settings.compression.ladder.clone(), output_dir),
            speech: SpeechClient::from_settings(settings, codec).map_err(|e| ToolError::Configuration {
                message: format!("cannot build speech client: {e}"),
            })?,
        };
        let credential = match settings.require_api_key() {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "remote operations will be refused");
                false
            }
        };
        Ok(Self::new(ToolRegistry::with_all_operations(), services, credential))
    }

    /// The operation registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Definitions for every registered operation.
    pub fn definitions(&self) -> Vec<Tool> {
        self.registry.definitions()
    }

    /// Run one invocation to a terminal state.
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolEnvelope {
        let call_id = Uuid::now_v7();
        let span = info_span!("tool_call", %call_id, operation = name);
        self.dispatch(name, arguments).instrument(span).await
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> ToolEnvelope {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(InvocationState::Validating);

        let params = match self.validate(name, &arguments) {
            Ok(params) => params,
            Err(err) => {
                lifecycle.advance(InvocationState::Rejected);
                info!(kind = err.kind().as_str(), error = %err, "invocation rejected");
                return ToolEnvelope::errored(name, InvocationState::Rejected, &err);
            }
        };

        lifecycle.advance(InvocationState::Executing);
        match handlers::execute(&self.services, params).await {
            Ok(result) => {
                lifecycle.advance(InvocationState::Completed);
                info!("invocation completed");
                ToolEnvelope::completed(name, result)
            }
            Err(err) => {
                lifecycle.advance(InvocationState::Failed);
                warn!(kind = err.kind().as_str(), error = %err, "invocation failed");
                ToolEnvelope::errored(name, InvocationState::Failed, &err)
            }
        }
    }

    /// Resolve the operation, check the credential, and parse parameters.
    /// Side-effect free.
    fn validate(&self, name: &str, arguments: &Value) -> Result<OperationParams, ToolError> {
        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::validation(format!("unknown operation '{name}'")))?;
        if entry.operation.needs_api() && !self.credential_configured {
            return Err(SettingsError::MissingApiKey.into());
        }
        entry.operation.parse(arguments)
    }
}
