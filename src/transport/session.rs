use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::SinkExt;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::sync::Mutex;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::parse_frame;
use crate::FrameSink;
use crate::OutboundFrame;
use crate::Outbox;
use crate::ReconnectTimer;
use crate::Registry;
use crate::Result;
use crate::TransportConfig;
use crate::TransportError;

/// Connection lifecycle against the bridge
///
/// The session feeds every parsed inbound frame into the [`Registry`] and
/// exposes the open socket to entries through the shared [`Outbox`].
pub struct TransportSession {
    registry: Arc<Registry>,
    outbox: Arc<Outbox>,
    config: TransportConfig,
    timer: ReconnectTimer,
    reconnect_rx: Mutex<mpsc::UnboundedReceiver<()>>,
    connect_attempts: AtomicU64,
}

impl TransportSession {
    pub fn new(
        registry: Arc<Registry>,
        outbox: Arc<Outbox>,
        config: TransportConfig,
    ) -> Self {
        let (timer, reconnect_rx) = ReconnectTimer::new(config.reconnect_delay());
        Self {
            registry,
            outbox,
            config,
            timer,
            reconnect_rx: Mutex::new(reconnect_rx),
            connect_attempts: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn is_open(&self) -> bool {
        self.outbox.is_open()
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn reconnect_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Sends a write request over the open socket, if any.
    pub fn send(
        &self,
        frame: &OutboundFrame,
    ) -> bool {
        self.outbox.send(frame)
    }

    pub(crate) fn on_open(
        &self,
        tx: mpsc::UnboundedSender<Message>,
    ) {
        self.outbox.attach(tx);
        info!(url = %self.config.url, "connected to bridge");
    }

    /// Parses and applies one text frame. Anything unparseable is dropped.
    pub(crate) fn on_message(
        &self,
        text: &str,
    ) {
        match parse_frame(text) {
            Ok(frame) => self.registry.handle_frame(frame),
            Err(e) => debug!(error = %e, "dropping unrecognized frame"),
        }
    }

    pub(crate) fn on_error(
        &self,
        err: &TransportError,
    ) {
        match err {
            TransportError::Connect { .. } => warn!(error = %err, "connect failed"),
            _ => error!(error = %err, "socket error"),
        }
    }

    /// Forgets the socket and arms a reconnect.
    pub(crate) fn on_close(&self) {
        self.outbox.detach();
        if self.timer.schedule() {
            info!(delay_ms = self.timer.delay().as_millis() as u64, "connection closed, reconnect scheduled");
        }
    }

    /// One connection lifetime: connect, pump frames both ways, close.
    ///
    /// Always ends in [`on_close`](Self::on_close), so a failed connect and a
    /// dropped socket are handled the same way.
    pub(crate) async fn connect(&self) -> Result<()> {
        let attempt = self.connect_attempts.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(url = %self.config.url, attempt, "connecting");

        let (stream, _) = match connect_async(self.config.url.as_str()).await {
            Ok(connected) => connected,
            Err(e) => {
                let err = TransportError::Connect {
                    url: self.config.url.clone(),
                    source: Box::new(e),
                };
                self.on_error(&err);
                self.on_close();
                return Err(err.into());
            }
        };

        let (mut write, mut read) = stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.on_open(tx);

        let outcome: std::result::Result<(), TransportError> = loop {
            tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(message) => {
                        if let Err(e) = write.send(message).await {
                            break Err(TransportError::Socket(Box::new(e)));
                        }
                    }
                    None => break Ok(()),
                },
                inbound = read.next() => match inbound {
                    Some(Ok(Message::Text(text))) => self.on_message(&text),
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "bridge closed the socket");
                        break Ok(());
                    }
                    Some(Ok(_)) => trace!("ignoring non-text frame"),
                    Some(Err(e)) => break Err(TransportError::Socket(Box::new(e))),
                    None => break Ok(()),
                },
            }
        };

        if let Err(e) = &outcome {
            self.on_error(e);
        }
        self.on_close();
        outcome.map_err(Into::into)
    }

    /// Connects, then reconnects after every close, until `shutdown` fires.
    pub async fn run(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<()> {
        let Ok(mut reconnect_rx) = self.reconnect_rx.try_lock() else {
            return Err(TransportError::AlreadyRunning.into());
        };
        self.timer.cancel();
        let stale = Self::discard_stale_reconnects(&mut reconnect_rx);
        if stale > 0 {
            debug!(stale, "discarded reconnect triggers from before run");
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = self.connect() => {
                    if let Err(e) = result {
                        trace!(error = %e, "connection ended with error");
                    }
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                trigger = reconnect_rx.recv() => {
                    if trigger.is_none() {
                        break;
                    }
                }
            }
        }

        info!("transport shutting down");
        self.timer.cancel();
        self.outbox.detach();
        Ok(())
    }

    /// Empties `reconnect_rx` without waiting. Returns how many triggers were dropped.
    pub(crate) fn discard_stale_reconnects(reconnect_rx: &mut mpsc::UnboundedReceiver<()>) -> usize {
        let mut discarded = 0;
        while reconnect_rx.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }
}

impl std::fmt::Debug for TransportSession {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("url", &self.config.url)
            .field("open", &self.is_open())
            .field("connect_attempts", &self.connect_attempts())
            .finish()
    }
}
