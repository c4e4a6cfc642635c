//! Blocking-style connection reads serviced through the event loop.

use tracing::{debug, info, warn};

use crate::core::event::{ConnHandle, ConnOp, ConnectionEvent, Event};
use crate::core::host::Host;
use crate::error::ConnectionError;
use crate::runtime::bridge::Bridge;

enum Phase {
    Connecting,
    Reading,
    Finished,
    Failed(ConnectionError),
}

impl<H: Host> Bridge<H> {
    /// Read everything available at `url`.
    ///
    /// The bridge is Modal for the duration; other events keep flowing through the dispatcher.
    /// Returns `None` on any failure or when nothing was received. The host handle is closed on
    /// every path, including teardown mid-read.
    pub fn read_all(&mut self, url: &str) -> Option<Vec<u8>> {
        match self.read_connection(url) {
            Ok(data) if data.is_empty() => {
                debug!(%url, "connection returned no data");
                None
            }
            Ok(data) => Some(data),
            Err(err) => {
                warn!(error = %err, "connection read failed");
                None
            }
        }
    }

    fn read_connection(&mut self, url: &str) -> Result<Vec<u8>, ConnectionError> {
        if self.is_closing() {
            return Err(ConnectionError::Abandoned {
                url: url.to_string(),
            });
        }
        let handle = self
            .host
            .connect(url)
            .ok_or_else(|| ConnectionError::Refused {
                url: url.to_string(),
            })?;
        info!(%url, handle = handle.0, "connection opened");

        let prior = self.shared.state.enter_modal();
        self.modal_cancelled = false;
        let result = self.drive_connection(url, handle);
        self.host.close_connection(handle);
        if let Some(prior) = prior {
            self.shared.state.leave_modal(prior);
        }
        self.modal_cancelled = false;

        if let Ok(data) = &result {
            info!(%url, bytes = data.len(), "connection finished");
        }
        result
    }

    fn drive_connection(
        &mut self,
        url: &str,
        handle: ConnHandle,
    ) -> Result<Vec<u8>, ConnectionError> {
        let mut data = Vec::new();
        let mut phase = Phase::Connecting;
        while matches!(phase, Phase::Connecting | Phase::Reading) {
            let Some(Event::Connection(event)) =
                self.wait_for(|event| event.is_connection_for(handle))
            else {
                phase = Phase::Failed(ConnectionError::Abandoned {
                    url: url.to_string(),
                });
                continue;
            };
            phase = self.step(url, phase, event, &mut data);
        }
        match phase {
            Phase::Failed(err) => Err(err),
            _ => Ok(data),
        }
    }

    fn step(
        &mut self,
        url: &str,
        phase: Phase,
        event: ConnectionEvent,
        data: &mut Vec<u8>,
    ) -> Phase {
        let chunk = self.config.read_chunk;
        match (phase, event.op) {
            (Phase::Connecting, ConnOp::Connect) if event.result > 0 => {
                self.host.request_read(event.handle, chunk);
                Phase::Reading
            }
            (Phase::Connecting, ConnOp::Connect) => Phase::Failed(ConnectionError::ConnectFailed {
                url: url.to_string(),
                result: event.result,
            }),
            (Phase::Reading, ConnOp::Read) if event.result > 0 => {
                if data.try_reserve(event.data.len()).is_err() {
                    return Phase::Failed(ConnectionError::Allocation {
                        url: url.to_string(),
                        len: data.len(),
                    });
                }
                data.extend_from_slice(&event.data);
                debug!(%url, chunk = event.data.len(), total = data.len(), "chunk received");
                self.host.request_read(event.handle, chunk);
                Phase::Reading
            }
            (Phase::Reading, ConnOp::Read) => {
                if event.result < 0 {
                    let err = ConnectionError::ReadFailed {
                        url: url.to_string(),
                        result: event.result,
                    };
                    warn!(error = %err, received = data.len(), "read ended early");
                }
                Phase::Finished
            }
            (phase, op) => {
                debug!(%url, ?op, "ignored out-of-order connection event");
                phase
            }
        }
    }
}
