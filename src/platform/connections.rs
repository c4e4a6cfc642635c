//! Worker-thread connections for the process host.
//!
//! Each open handle owns one worker thread. The worker connects, then services read requests
//! one at a time; every completion is reported to the listener as a `Connection` input.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::net::TcpStream;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};
use url::Url;

use crate::core::event::{ConnHandle, ConnectionEvent};
use crate::core::host::{HostListener, NativeInput};

/// Where a connection reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    File(std::path::PathBuf),
}

impl Endpoint {
    /// `tcp://host:port` or `file:///path`. Anything else is rejected.
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        match parsed.scheme() {
            "tcp" | "socket" => Some(Endpoint::Tcp {
                host: parsed.host_str()?.to_string(),
                port: parsed.port()?,
            }),
            "file" => parsed.to_file_path().ok().map(Endpoint::File),
            _ => None,
        }
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        match self {
            Endpoint::Tcp { host, port } => {
                Ok(Box::new(TcpStream::connect((host.as_str(), *port))?))
            }
            Endpoint::File(path) => Ok(Box::new(File::open(path)?)),
        }
    }
}

enum Request {
    Read(usize),
}

struct Worker {
    requests: Sender<Request>,
}

pub struct ConnectionPool {
    listener: Arc<dyn HostListener>,
    workers: HashMap<ConnHandle, Worker>,
    next_handle: u32,
}

impl ConnectionPool {
    pub fn new(listener: Arc<dyn HostListener>) -> Self {
        Self {
            listener,
            workers: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn open(&mut self, url: &str) -> Option<ConnHandle> {
        let Some(endpoint) = Endpoint::parse(url) else {
            warn!(%url, "unsupported connection url");
            return None;
        };
        let handle = ConnHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1).max(1);

        let (requests, inbox) = mpsc::channel();
        let listener = Arc::clone(&self.listener);
        let spawned = thread::Builder::new()
            .name(format!("connection-{}", handle.0))
            .spawn(move || {
                let mut stream = match endpoint.open() {
                    Ok(stream) => {
                        listener.on_input(NativeInput::Connection(ConnectionEvent::connected(
                            handle, true,
                        )));
                        stream
                    }
                    Err(err) => {
                        debug!(handle = handle.0, error = %err, "connect failed");
                        listener.on_input(NativeInput::Connection(ConnectionEvent::connected(
                            handle, false,
                        )));
                        return;
                    }
                };
                for request in inbox {
                    let Request::Read(max_len) = request;
                    let event = read_chunk(&mut stream, handle, max_len);
                    listener.on_input(NativeInput::Connection(event));
                }
            });
        match spawned {
            Ok(_) => {
                self.workers.insert(handle, Worker { requests });
                Some(handle)
            }
            Err(err) => {
                warn!(%url, error = %err, "failed to spawn connection worker");
                None
            }
        }
    }

    pub fn request_read(&mut self, handle: ConnHandle, max_len: usize) {
        match self.workers.get(&handle) {
            Some(worker) => {
                if worker.requests.send(Request::Read(max_len)).is_err() {
                    debug!(handle = handle.0, "connection worker already gone");
                }
            }
            None => debug!(handle = handle.0, "read on unknown connection"),
        }
    }

    /// Dropping the request channel ends the worker after its current read.
    pub fn close(&mut self, handle: ConnHandle) {
        if self.workers.remove(&handle).is_some() {
            debug!(handle = handle.0, "connection closed");
        }
    }

    pub fn close_all(&mut self) {
        self.workers.clear();
    }

    pub fn open_count(&self) -> usize {
        self.workers.len()
    }
}

fn read_chunk(stream: &mut dyn Read, handle: ConnHandle, max_len: usize) -> ConnectionEvent {
    let mut buffer = vec![0u8; max_len.max(1)];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) => return ConnectionEvent::end_of_stream(handle),
            Ok(len) => {
                buffer.truncate(len);
                return ConnectionEvent::chunk(handle, buffer);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(handle = handle.0, error = %err, "read failed");
                return ConnectionEvent::read_error(handle, -1);
            }
        }
    }
}
