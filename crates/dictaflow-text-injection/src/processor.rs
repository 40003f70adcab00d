//! # Injection Processor
//!
//! High-level pump the surrounding dictation app drives: it receives
//! finalized transcription chunks over a channel and injects them strictly
//! sequentially, honoring the engine's single-caller contract. The host
//! GUI's message loop stays responsive because every pacing delay inside
//! the engine is a cooperative suspension point.

use crate::error::InjectionResult;
use crate::orchestrator::InjectionOrchestrator;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// A finalized chunk of dictated text ready for injection.
#[derive(Debug, Clone)]
pub struct DictatedChunk {
    pub text: String,
}

/// Serializes dictated text chunks into the orchestrator.
pub struct AsyncInjectionProcessor {
    orchestrator: Arc<InjectionOrchestrator>,
    chunk_rx: mpsc::Receiver<DictatedChunk>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl AsyncInjectionProcessor {
    pub fn new(
        orchestrator: Arc<InjectionOrchestrator>,
        chunk_rx: mpsc::Receiver<DictatedChunk>,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            orchestrator,
            chunk_rx,
            shutdown_rx,
        }
    }

    /// Main loop: inject each chunk in arrival order until shutdown.
    /// Injection failures are logged and do not stop the pump; a dictation
    /// tool that dies on one app quirk would take the host down with it.
    pub async fn run(mut self) {
        info!("injection processor started");
        loop {
            tokio::select! {
                Some(chunk) = self.chunk_rx.recv() => {
                    if chunk.text.is_empty() {
                        continue;
                    }
                    if let Err(e) = self.inject(&chunk.text).await {
                        error!("injection failed: {e}");
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("shutdown signal received, stopping injection processor");
                    break;
                }
                else => break,
            }
        }
    }

    async fn inject(&self, text: &str) -> InjectionResult<()> {
        debug!("processing dictated chunk ({} chars)", text.len());
        self.orchestrator.inject_text(text, None).await
    }
}
