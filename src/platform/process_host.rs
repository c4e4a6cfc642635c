//! Process-backed host for desktop runs: raw terminal input, POSIX signals, worker connections.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use libc::{self, c_int};
use signal_hook::iterator::Signals;
use tracing::{debug, info, warn};

use crate::core::event::ConnHandle;
use crate::core::gateway::{HostArg, HostCall, HostGateway, HostValue};
use crate::core::host::{Host, HostListener, LifecycleCommand, NativeInput};
use crate::core::keys::resolve_us_layout;
use crate::core::sensor::SensorKind;
use crate::error::HostCallError;
use crate::platform::connections::ConnectionPool;
use crate::platform::input_decoder::{decode_input, Decoded};

/// Pixels per terminal cell used to report a surface size.
pub const CELL_WIDTH: u32 = 8;
pub const CELL_HEIGHT: u32 = 16;
/// Surface size when stdout is not a terminal.
pub const FALLBACK_SURFACE: (u32, u32) = (640, 480);

fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

fn surface_size_of(fd: c_int) -> (u32, u32) {
    read_winsize(fd).map_or(FALLBACK_SURFACE, |(columns, rows)| {
        (u32::from(columns) * CELL_WIDTH, u32::from(rows) * CELL_HEIGHT)
    })
}

fn poll_readable(fd: c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & libc::POLLIN) != 0
}

fn get_termios(fd: c_int) -> std::io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(termios)
}

fn set_termios(fd: c_int, termios: &libc::termios) -> std::io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

pub struct ProcessHost {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    listener: Option<Arc<dyn HostListener>>,
    connections: Option<ConnectionPool>,
    stop_flag: Arc<AtomicBool>,
    options_pending: Arc<AtomicBool>,
    input_thread: Option<JoinHandle<()>>,
    signal_handle: Option<signal_hook::iterator::Handle>,
    signal_thread: Option<JoinHandle<()>>,
}

impl ProcessHost {
    pub fn new() -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            listener: None,
            connections: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            options_pending: Arc::new(AtomicBool::new(false)),
            input_thread: None,
            signal_handle: None,
            signal_thread: None,
        }
    }

    fn enable_raw_mode(&mut self) -> std::io::Result<()> {
        if unsafe { libc::isatty(self.stdin_fd) } != 1 {
            debug!("stdin is not a terminal; leaving line discipline alone");
            return Ok(());
        }
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> std::io::Result<()> {
        if let Some(original) = self.original_termios.take() {
            let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };
            set_termios(self.stdin_fd, &original)?;
        }
        Ok(())
    }

    fn start_input_thread(&mut self, listener: Arc<dyn HostListener>) {
        let stdin_fd = self.stdin_fd;
        let stop_flag = Arc::clone(&self.stop_flag);
        let options_pending = Arc::clone(&self.options_pending);

        self.input_thread = Some(thread::spawn(move || {
            let mut buffer = [0u8; 1024];
            while !stop_flag.load(Ordering::SeqCst) {
                if !poll_readable(stdin_fd, 50) {
                    continue;
                }
                let read_len =
                    unsafe { libc::read(stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
                if read_len <= 0 {
                    // EOF on a pipe: stop polling a dead descriptor.
                    break;
                }
                for decoded in decode_input(&buffer[..read_len as usize]) {
                    match decoded {
                        Decoded::Interrupt => {
                            listener.on_lifecycle(LifecycleCommand::DestroyRequested);
                        }
                        Decoded::Input(NativeInput::UnicodeChar(ch))
                            if options_pending.load(Ordering::SeqCst)
                                && (u32::from('1')..=u32::from('9')).contains(&ch) =>
                        {
                            options_pending.store(false, Ordering::SeqCst);
                            let index = (ch - u32::from('1')) as i32;
                            listener.on_input(NativeInput::OptionSelected(index));
                        }
                        Decoded::Input(input) => {
                            listener.on_input(input);
                        }
                    }
                }
            }
        }));
    }

    fn stop_input_thread(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }

    fn start_signal_thread(&mut self, listener: Arc<dyn HostListener>) -> std::io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH, libc::SIGINT, libc::SIGTERM])?;
        let handle = signals.handle();
        let stdout_fd = self.stdout_fd;

        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                match signal {
                    libc::SIGWINCH => {
                        let (width, height) = surface_size_of(stdout_fd);
                        listener.on_lifecycle(LifecycleCommand::Resized { width, height });
                    }
                    _ => listener.on_lifecycle(LifecycleCommand::DestroyRequested),
                }
            }
        });

        self.signal_handle = Some(handle);
        self.signal_thread = Some(thread);
        Ok(())
    }

    fn stop_signal_thread(&mut self) {
        if let Some(handle) = self.signal_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.signal_thread.take() {
            let _ = thread.join();
        }
    }

    fn print_options(&self, items: &[String]) {
        let mut stderr = std::io::stderr().lock();
        for (index, item) in items.iter().enumerate().take(9) {
            let _ = write!(stderr, "{}) {}\r\n", index + 1, item);
        }
        let _ = stderr.flush();
        self.options_pending.store(true, Ordering::SeqCst);
    }
}

impl Default for ProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostGateway for ProcessHost {
    fn attach(&self) -> Result<(), HostCallError> {
        Ok(())
    }

    fn detach(&self) {}

    fn invoke(&self, call: &HostCall) -> Result<HostValue, HostCallError> {
        match (call.method.as_str(), call.args.as_slice()) {
            ("getUnicodeChar", [HostArg::Int(code), HostArg::Int(meta)]) => {
                Ok(HostValue::Int(resolve_us_layout(*code, *meta)))
            }
            ("optionsBox", [HostArg::StrList(items)]) => {
                self.print_options(items);
                Ok(HostValue::Void)
            }
            ("showAlert", [HostArg::Str(title), HostArg::Str(message)]) => {
                info!(%title, %message, "alert");
                Ok(HostValue::Void)
            }
            ("showKeypad", [HostArg::Bool(_)]) => Ok(HostValue::Void),
            ("speak", [HostArg::Bytes(text)]) => {
                info!(text = %String::from_utf8_lossy(text), "speak");
                Ok(HostValue::Void)
            }
            ("setTtsPitch" | "setTtsRate", [HostArg::Float(value)]) => {
                debug!(method = %call.method, value, "tts setting ignored");
                Ok(HostValue::Void)
            }
            ("setTtsLocale", [HostArg::Str(_)]) => Ok(HostValue::Void),
            ("getLocation", []) => Ok(HostValue::Str(String::new())),
            ("requestLocationUpdates" | "removeLocationUpdates", []) => Ok(HostValue::Bool(false)),
            ("setTtsQuiet" | "closeLibHandlers", []) => Ok(HostValue::Bool(true)),
            (method, _) => Err(HostCallError::unknown(method)),
        }
    }
}

impl Host for ProcessHost {
    fn start(&mut self, listener: Arc<dyn HostListener>) -> std::io::Result<()> {
        self.stop_flag.store(false, Ordering::SeqCst);
        self.enable_raw_mode()?;
        if let Err(err) = self.start_signal_thread(Arc::clone(&listener)) {
            let _ = self.restore_raw_mode();
            return Err(err);
        }
        self.start_input_thread(Arc::clone(&listener));
        self.connections = Some(ConnectionPool::new(Arc::clone(&listener)));

        listener.on_lifecycle(LifecycleCommand::WindowReady);
        listener.on_lifecycle(LifecycleCommand::GainedFocus);
        self.listener = Some(listener);
        info!("process host started");
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.stop_input_thread();
        self.stop_signal_thread();
        if let Some(mut connections) = self.connections.take() {
            connections.close_all();
        }
        self.listener = None;
        self.restore_raw_mode()
    }

    fn surface_size(&self) -> (u32, u32) {
        surface_size_of(self.stdout_fd)
    }

    fn connect(&mut self, url: &str) -> Option<ConnHandle> {
        match self.connections.as_mut() {
            Some(connections) => connections.open(url),
            None => {
                warn!(%url, "connect before host start");
                None
            }
        }
    }

    fn request_read(&mut self, handle: ConnHandle, max_len: usize) {
        if let Some(connections) = self.connections.as_mut() {
            connections.request_read(handle, max_len);
        }
    }

    fn close_connection(&mut self, handle: ConnHandle) {
        if let Some(connections) = self.connections.as_mut() {
            connections.close(handle);
        }
    }

    fn enable_sensor(&mut self, kind: SensorKind) -> Option<String> {
        debug!(?kind, "no sensors on the process host");
        None
    }

    fn disable_sensor(&mut self) {}
}

impl Drop for ProcessHost {
    fn drop(&mut self) {
        if self.listener.is_some() {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProcessHost, FALLBACK_SURFACE};
    use crate::core::gateway::{HostCaller, HostGateway};
    use crate::core::host::Host;
    use crate::core::keys::native;
    use crate::core::sensor::SensorKind;

    #[test]
    fn gateway_answers_local_methods() {
        let host = ProcessHost::new();
        let caller = HostCaller::new(&host);
        assert_eq!(caller.get_unicode_char(native::A, 0), 'a' as i32);
        assert!(caller.get_boolean("closeLibHandlers"));
        assert_eq!(caller.get_string("getLocation"), "");
        assert!(caller.set_float("setTtsRate", 1.0));
    }

    #[test]
    fn unknown_methods_degrade() {
        let host = ProcessHost::new();
        assert!(host.attach().is_ok());
        let caller = HostCaller::new(&host);
        assert_eq!(caller.get_integer("getStartupFontSize"), 0);
        assert_eq!(caller.get_string_bytes("getClipboardText"), "");
    }

    #[test]
    fn no_connections_or_sensors_before_start() {
        let mut host = ProcessHost::new();
        assert_eq!(host.connect("tcp://localhost:1"), None);
        assert_eq!(host.enable_sensor(SensorKind::Light), None);
        let (width, height) = host.surface_size();
        assert!(width > 0 && height > 0);
        assert!(FALLBACK_SURFACE.0 > 0);
    }
}
