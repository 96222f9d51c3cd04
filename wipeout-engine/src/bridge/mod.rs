//! Editor bridge: drive the engine over newline-delimited JSON
//!
//! An editor plugin writes [`HostMessage`] frames to our stdin and reads
//! [`EngineMessage`] frames from our stdout. Documents are files on disk;
//! view replacements and all session UI are forwarded to the editor.

mod ui;

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};
use wipeout_protocol::{EngineCodec, EngineMessage, HostMessage, Notice};
use wipeout_utils::Result;

use crate::config::AppConfig;
use crate::guard::InputGuard;
use crate::host::{EditorHost, FsHost, HostRegistry};
use crate::session::{EditSignal, FixedDuration, Minutes, SessionController};
use crate::state::EngineState;
use crate::ui::SessionUi;

pub use ui::BridgeUi;

/// Dispatches host messages to the controller, the guard, and the host registry
pub struct Bridge<H, U> {
    controller: Arc<SessionController<H, U>>,
    guard: &'static InputGuard,
    outbound: mpsc::UnboundedSender<EngineMessage>,
}

impl<H, U> Bridge<H, U>
where
    H: EditorHost + HostRegistry,
    U: SessionUi,
{
    pub fn new(
        controller: Arc<SessionController<H, U>>,
        guard: &'static InputGuard,
        outbound: mpsc::UnboundedSender<EngineMessage>,
    ) -> Self {
        Self {
            controller,
            guard,
            outbound,
        }
    }

    pub fn controller(&self) -> &Arc<SessionController<H, U>> {
        &self.controller
    }

    /// Handle one message; returns false once the host has unloaded
    pub async fn handle(&self, message: HostMessage) -> bool {
        match message {
            HostMessage::Focus {
                document,
                length,
                kind,
            } => {
                debug!(document = %document, length, ?kind, "Focus changed");
                self.controller.host().focus(document, length, kind);
            }
            HostMessage::Start { minutes } => self.start(minutes).await,
            HostMessage::Transaction { document, inserted } => {
                let signal = EditSignal::Transaction { document, inserted };
                self.controller.handle_edit(&signal, Instant::now());
            }
            HostMessage::ContentChanged { document, length } => {
                let signal = EditSignal::ContentChanged { document, length };
                self.controller.handle_edit(&signal, Instant::now());
            }
            HostMessage::Input { id, document, kind } => {
                let verdict = self.guard.intercept(&document, kind);
                self.send(EngineMessage::Verdict { id, verdict });
            }
            HostMessage::ViewOpened { view, document } => {
                self.controller.host().open_view(view, document);
            }
            HostMessage::ViewClosed { view } => {
                self.controller.host().close_view(&view);
            }
            HostMessage::Stop => {
                if !self.controller.stop() {
                    self.notify(Notice::info("No writing session is running."));
                }
            }
            HostMessage::Unload => {
                self.controller.teardown();
                return false;
            }
        }
        true
    }

    async fn start(&self, minutes: Option<f64>) {
        let prompt = match minutes.map(Minutes::new).transpose() {
            Ok(minutes) => FixedDuration::new(minutes),
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                return;
            }
        };

        match self.controller.start_session_flow(&prompt).await {
            Ok(_) => {}
            Err(e) if e.is_user_facing() => self.notify(Notice::warning(e.to_string())),
            Err(e) => {
                error!(error = %e, "Failed to start session");
                self.notify(Notice::error(e.to_string()));
            }
        }
    }

    /// Process frames from `reader` until end of input or unload
    pub async fn serve<R: AsyncRead + Unpin>(&self, reader: R) {
        let mut frames = FramedRead::new(reader, EngineCodec::new());
        let mut after_error = false;

        loop {
            match frames.next().await {
                Some(Ok(message)) => {
                    after_error = false;
                    if !self.handle(message).await {
                        info!("Host unloaded");
                        return;
                    }
                }
                Some(Err(e)) if e.is_recoverable() => {
                    warn!(error = %e, "Skipping malformed frame");
                    after_error = true;
                }
                Some(Err(e)) => {
                    error!(error = %e, "Bridge input failed");
                    break;
                }
                // FramedRead ends the stream once after a decode error
                None if after_error => after_error = false,
                None => break,
            }
        }

        info!("Bridge input closed");
        self.controller.teardown();
    }

    fn notify(&self, notice: Notice) {
        self.controller.ui().notify(notice);
    }

    fn send(&self, message: EngineMessage) {
        if self.outbound.send(message).is_err() {
            debug!("Bridge output closed, dropping message");
        }
    }
}

/// Encode outbound messages until shutdown, then flush what is queued
async fn write_frames<W: AsyncWrite + Unpin>(
    writer: W,
    mut rx: mpsc::UnboundedReceiver<EngineMessage>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut sink = FramedWrite::new(writer, EngineCodec::new());

    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else { break };
                if let Err(e) = sink.send(message).await {
                    error!(error = %e, "Failed to write bridge frame");
                    return;
                }
            }
            _ = &mut shutdown => {
                while let Ok(message) = rx.try_recv() {
                    if let Err(e) = sink.send(message).await {
                        error!(error = %e, "Failed to write bridge frame");
                        return;
                    }
                }
                break;
            }
        }
    }
}

/// Run the bridge on stdin/stdout
pub async fn run_bridge(config: AppConfig) -> Result<i32> {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = EngineState::init();
    let guard = InputGuard::install(&state);

    let host = Arc::new(FsHost::with_views(
        config.document.text_extensions.clone(),
        tx.clone(),
    ));
    let ui = Arc::new(BridgeUi::new(tx.clone()));
    let controller = Arc::new(SessionController::new(
        host,
        ui,
        state,
        config.session_config(),
    ));
    let bridge = Bridge::new(controller, guard, tx);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let writer = tokio::spawn(write_frames(tokio::io::stdout(), rx, shutdown_rx));

    info!("Bridge started");
    bridge.serve(tokio::io::stdin()).await;

    let _ = shutdown_tx.send(());
    if let Err(e) = writer.await {
        error!(error = %e, "Bridge writer task failed");
    }
    Ok(0)
}
