//! C10 — remote-learning liaison: a background thread that drives a
//! [`DataAwareAsRtm`] from messages arriving over an injected,
//! transport-agnostic channel.
//!
//! The liaison owns no socket: [`RemoteChannel`] abstracts whatever carries
//! the bytes (MQTT, a test queue, anything blocking-`recv`-shaped). This
//! module only knows the five topics and what each one does to the engine —
//! see [`message`] for the wire grammars themselves.
//!
//! Concurrency model: one thread per liaison, parked in `RemoteChannel::recv`
//! between messages; the engine itself is reached through the same
//! `Arc<Mutex<DataAwareAsRtm>>` the owning application holds, so liaison
//! activity and application control-cycle calls serialize through that one
//! lock rather than needing a second one here.

pub mod message;

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub use message::{LiaisonMessage, Topic};

use crate::asrtm::DataAwareAsRtm;
use message::{parse_explore, parse_model, parse_observation, TokenDecoder};

/// Blocking transport for [`LiaisonMessage`]s. Implementations decide how
/// `recv` blocks (MQTT client loop, a condvar-guarded queue, ...); returning
/// `None` ends the liaison's thread and triggers its last-will publish.
pub trait RemoteChannel: Send + Sync {
    fn recv(&self) -> Option<LiaisonMessage>;
    fn send(&self, message: LiaisonMessage);
}

/// A running liaison. Dropping this without calling [`Liaison::join`] detaches
/// the background thread — it keeps running until its channel closes.
pub struct Liaison {
    client_id: String,
    handle: Option<JoinHandle<()>>,
}

impl Liaison {
    /// Start the liaison's thread: loop on `channel.recv()`, applying each
    /// message to `daw`, until the channel closes, then publish `last_will`.
    ///
    /// `info` is the caller-supplied description string `/info` requests
    /// return. `decoder` controls how `/explore` and `/model` configuration
    /// and metrics tokens are decoded into [`crate::knowledge_base::KnobValue`]s.
    pub fn spawn(
        channel: Arc<dyn RemoteChannel>,
        daw: Arc<Mutex<DataAwareAsRtm>>,
        client_id: impl Into<String>,
        info: impl Into<String>,
        decoder: Arc<dyn TokenDecoder + Send + Sync>,
    ) -> Self {
        let client_id = client_id.into();
        let info = info.into();
        let thread_client_id = client_id.clone();
        let thread_channel = Arc::clone(&channel);

        let handle = std::thread::spawn(move || {
            while let Some(message) = thread_channel.recv() {
                handle_message(
                    thread_channel.as_ref(),
                    &daw,
                    &thread_client_id,
                    &info,
                    decoder.as_ref(),
                    message,
                );
            }
            thread_channel.send(LiaisonMessage::new(
                Topic::Kia,
                format!("{thread_client_id} disconnected"),
            ));
        });

        Self {
            client_id,
            handle: Some(handle),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Block until the liaison's thread exits (its channel closed).
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_message(
    channel: &dyn RemoteChannel,
    daw: &Arc<Mutex<DataAwareAsRtm>>,
    client_id: &str,
    info: &str,
    decoder: &dyn TokenDecoder,
    message: LiaisonMessage,
) {
    match message.topic {
        Topic::Welcome => {
            channel.send(LiaisonMessage::new(Topic::Welcome, client_id.to_string()));
        }
        Topic::Info => {
            channel.send(LiaisonMessage::new(Topic::Info, info.to_string()));
        }
        Topic::Explore => match parse_explore(&message.payload, decoder) {
            Ok(op) => {
                let guard = daw.lock().expect("data-aware asrtm mutex poisoned");
                guard.clear_ops();
                guard.add_ops(vec![op]);
                if let Some(engine) = guard.active_engine() {
                    engine.begin_dse();
                    engine.clear_proposed_best();
                }
                tracing::info!(client_id, "installed exploration point and entered dse");
            }
            Err(e) => tracing::warn!(client_id, error = %e, "malformed /explore payload"),
        },
        Topic::Model => match parse_model(&message.payload, decoder) {
            Ok(clusters) => {
                let mut guard = daw.lock().expect("data-aware asrtm mutex poisoned");
                guard.install_model(clusters);
                tracing::info!(client_id, "installed new model");
            }
            Err(e) => tracing::warn!(client_id, error = %e, "malformed /model payload"),
        },
        Topic::Observation => {
            tracing::warn!(client_id, "observation topic is outbound-only, ignoring");
        }
        Topic::Kia => {
            tracing::warn!(client_id, "kia topic is outbound-only, ignoring");
        }
    }
}

/// Report a measurement to the remote learning service, formatted per the
/// `/observation` wire grammar. A thin convenience over
/// [`message::format_observation`] + [`RemoteChannel::send`] for callers
/// that hold the channel directly (as opposed to only a `Liaison`, which
/// owns its channel and doesn't expose it back out).
pub fn report_observation(
    channel: &dyn RemoteChannel,
    client_id: &str,
    seconds: u64,
    nanoseconds: u32,
    knobs: &[f64],
    features: &[f64],
    metrics: &[f64],
) {
    let payload =
        message::format_observation(client_id, seconds, nanoseconds, knobs, features, metrics);
    channel.send(LiaisonMessage::new(Topic::Observation, payload));
}

/// Confirm a parsed observation round-trips for tests exercising
/// `RemoteChannel` implementations without pulling in the full liaison loop.
pub fn parse_observation_payload(
    payload: &str,
    knob_count: usize,
    metric_count: usize,
) -> Result<message::Observation, crate::error::AsrtmError> {
    parse_observation(payload, knob_count, metric_count)
}
