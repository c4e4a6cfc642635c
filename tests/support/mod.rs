#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use basic_bridge::core::keys::resolve_us_layout;
use basic_bridge::{
    Bridge, BridgeConfig, ConnHandle, ConnectionEvent, Event, Host, HostArg, HostCall,
    HostCallError, HostGateway, HostListener, HostValue, LifecycleCommand, NativeInput, Screen,
    SensorKind,
};

pub const SURFACE: (u32, u32) = (320, 240);

/// Delay before the harness answers an asynchronous request from its own thread.
const REPLY_DELAY: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStep {
    Chunk(usize),
    End,
    Error(i32),
    /// Never answer the request.
    Stall,
}

#[derive(Debug, Clone)]
pub struct ConnectPlan {
    pub connected: bool,
    pub reads: VecDeque<ReadStep>,
}

impl ConnectPlan {
    pub fn reading(reads: &[ReadStep]) -> Self {
        Self {
            connected: true,
            reads: reads.iter().copied().collect(),
        }
    }

    pub fn failing() -> Self {
        Self {
            connected: false,
            reads: VecDeque::new(),
        }
    }
}

#[derive(Default)]
pub struct HostState {
    pub listener: Option<Arc<dyn HostListener>>,
    pub started: bool,
    pub stopped: bool,
    pub attached: i32,
    pub calls: Vec<HostCall>,
    pub surface: (u32, u32),
    pub refuse_connect: bool,
    pub plan: Option<ConnectPlan>,
    pub next_handle: u32,
    pub connects: Vec<String>,
    pub reads: Vec<(ConnHandle, usize)>,
    pub closed: Vec<ConnHandle>,
    pub option_reply: Option<i32>,
    pub location: String,
    pub sensor: Option<SensorKind>,
    /// Deliver the connect completion and then a destroy request before `connect` returns.
    pub destroy_on_connect: bool,
}

/// Scripted host. Clones share state so tests keep a probe after the bridge takes the host.
#[derive(Clone)]
pub struct HarnessHost {
    state: Arc<Mutex<HostState>>,
}

impl HarnessHost {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState {
                surface: SURFACE,
                next_handle: 1,
                ..HostState::default()
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().expect("lock harness host state")
    }

    fn listener(&self) -> Arc<dyn HostListener> {
        self.state()
            .listener
            .clone()
            .expect("harness host has a listener")
    }

    pub fn lifecycle(&self, command: LifecycleCommand) {
        self.listener().on_lifecycle(command);
    }

    pub fn input(&self, input: NativeInput) -> bool {
        self.listener().on_input(input)
    }

    /// Deliver `input` from a separate thread after `delay`.
    pub fn input_later(&self, delay: Duration, input: NativeInput) -> thread::JoinHandle<()> {
        let listener = self.listener();
        thread::spawn(move || {
            thread::sleep(delay);
            listener.on_input(input);
        })
    }

    pub fn lifecycle_later(
        &self,
        delay: Duration,
        command: LifecycleCommand,
    ) -> thread::JoinHandle<()> {
        let listener = self.listener();
        thread::spawn(move || {
            thread::sleep(delay);
            listener.on_lifecycle(command);
        })
    }

    pub fn called(&self, method: &str) -> Vec<HostCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    fn reply(&self, input: NativeInput) {
        let listener = self.listener();
        thread::spawn(move || {
            thread::sleep(REPLY_DELAY);
            listener.on_input(input);
        });
    }
}

impl HostGateway for HarnessHost {
    fn attach(&self) -> Result<(), HostCallError> {
        self.state().attached += 1;
        Ok(())
    }

    fn detach(&self) {
        self.state().attached -= 1;
    }

    fn invoke(&self, call: &HostCall) -> Result<HostValue, HostCallError> {
        let reply = {
            let mut state = self.state();
            state.calls.push(call.clone());
            match call.method.as_str() {
                "getUnicodeChar" => match call.args.as_slice() {
                    [HostArg::Int(code), HostArg::Int(meta)] => {
                        return Ok(HostValue::Int(resolve_us_layout(*code, *meta)));
                    }
                    _ => return Err(HostCallError::failed(&call.method, "bad arguments")),
                },
                "optionsBox" => state.option_reply,
                "getLocation" => return Ok(HostValue::Str(state.location.clone())),
                "requestLocationUpdates"
                | "removeLocationUpdates"
                | "setTtsQuiet"
                | "closeLibHandlers" => return Ok(HostValue::Bool(true)),
                "showKeypad" | "showAlert" | "setTtsPitch" | "setTtsRate" | "setTtsLocale"
                | "speak" => return Ok(HostValue::Void),
                _ => return Err(HostCallError::unknown(&call.method)),
            }
        };
        if let Some(index) = reply {
            self.reply(NativeInput::OptionSelected(index));
        }
        Ok(HostValue::Void)
    }
}

impl Host for HarnessHost {
    fn start(&mut self, listener: Arc<dyn HostListener>) -> std::io::Result<()> {
        let mut state = self.state();
        state.listener = Some(listener);
        state.started = true;
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.state().stopped = true;
        Ok(())
    }

    fn surface_size(&self) -> (u32, u32) {
        self.state().surface
    }

    fn connect(&mut self, url: &str) -> Option<ConnHandle> {
        let (handle, connected) = {
            let mut state = self.state();
            state.connects.push(url.to_string());
            if state.refuse_connect {
                return None;
            }
            let handle = ConnHandle(state.next_handle);
            state.next_handle += 1;
            let connected = state.plan.as_ref().map_or(false, |plan| plan.connected);
            (handle, connected)
        };
        let completion = NativeInput::Connection(ConnectionEvent::connected(handle, connected));
        if self.state().destroy_on_connect {
            self.input(completion);
            self.lifecycle(LifecycleCommand::DestroyRequested);
        } else {
            self.reply(completion);
        }
        Some(handle)
    }

    fn request_read(&mut self, handle: ConnHandle, max_len: usize) {
        let step = {
            let mut state = self.state();
            state.reads.push((handle, max_len));
            state
                .plan
                .as_mut()
                .and_then(|plan| plan.reads.pop_front())
                .unwrap_or(ReadStep::Stall)
        };
        let event = match step {
            ReadStep::Chunk(len) => {
                let data = (0..len.min(max_len)).map(|index| index as u8).collect();
                ConnectionEvent::chunk(handle, data)
            }
            ReadStep::End => ConnectionEvent::end_of_stream(handle),
            ReadStep::Error(code) => ConnectionEvent::read_error(handle, code),
            ReadStep::Stall => return,
        };
        self.reply(NativeInput::Connection(event));
    }

    fn close_connection(&mut self, handle: ConnHandle) {
        self.state().closed.push(handle);
    }

    fn enable_sensor(&mut self, kind: SensorKind) -> Option<String> {
        self.state().sensor = Some(kind);
        Some(format!("harness {kind:?}"))
    }

    fn disable_sensor(&mut self) {
        self.state().sensor = None;
    }
}

#[derive(Default)]
pub struct ScreenLog {
    pub resizes: Vec<(u32, u32)>,
    pub redraws: usize,
    pub flushes: Vec<bool>,
    pub events: Vec<Event>,
    pub keys: Vec<i32>,
    pub menus: usize,
    pub font_scales: Vec<i32>,
}

#[derive(Clone, Default)]
pub struct RecordingScreen {
    log: Arc<Mutex<ScreenLog>>,
}

impl RecordingScreen {
    pub fn log(&self) -> MutexGuard<'_, ScreenLog> {
        self.log.lock().expect("lock screen log")
    }
}

impl Screen for RecordingScreen {
    fn resize(&mut self, width: u32, height: u32) {
        self.log().resizes.push((width, height));
    }

    fn redraw(&mut self) {
        self.log().redraws += 1;
    }

    fn flush(&mut self, force: bool) {
        self.log().flushes.push(force);
    }

    fn handle_event(&mut self, event: &Event) {
        self.log().events.push(event.clone());
    }

    fn handle_key(&mut self, key: i32) {
        self.log().keys.push(key);
    }

    fn show_menu(&mut self) {
        self.log().menus += 1;
    }

    fn set_font_scale(&mut self, percent: i32) {
        self.log().font_scales.push(percent);
    }
}

pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        wait_quantum: Duration::from_millis(10),
        modal_poll: Duration::from_millis(20),
        ..BridgeConfig::default()
    }
}

/// Started but not yet constructed.
pub fn new_bridge() -> (Bridge<HarnessHost>, HarnessHost, RecordingScreen) {
    let host = HarnessHost::new();
    let screen = RecordingScreen::default();
    let mut bridge = Bridge::new(host.clone(), Box::new(screen.clone()), test_config());
    bridge.start().expect("start bridge");
    (bridge, host, screen)
}

/// Constructed (Active) and focused.
pub fn active_bridge() -> (Bridge<HarnessHost>, HarnessHost, RecordingScreen) {
    let (mut bridge, host, screen) = new_bridge();
    host.lifecycle(LifecycleCommand::WindowReady);
    host.lifecycle(LifecycleCommand::GainedFocus);
    bridge.poll_events(false);
    (bridge, host, screen)
}

/// Constructed, focused and running a program.
pub fn running_bridge() -> (Bridge<HarnessHost>, HarnessHost, RecordingScreen) {
    let (mut bridge, host, screen) = active_bridge();
    assert!(bridge.begin_program(), "begin program");
    (bridge, host, screen)
}

/// Pump until the buffer is empty, returning what was handled.
pub fn drain(bridge: &mut Bridge<HarnessHost>) -> Vec<Event> {
    let mut handled = Vec::new();
    while let Some(event) = bridge.process_events(basic_bridge::WaitFlag::Pump) {
        handled.push(event);
    }
    handled
}
