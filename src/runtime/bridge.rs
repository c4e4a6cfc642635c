//! The bridge context: owns the host, the screen collaborator and the consumer-side state.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use settings_store::{Settings, SettingsError, SettingsStore};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::core::event::{Event, Touch};
use crate::core::gateway::HostCaller;
use crate::core::host::{Host, HostListener};
use crate::core::screen::Screen;
use crate::core::sensor::SensorKind;
use crate::runtime::listener::{BridgeListener, BridgeShared};
use crate::runtime::state::RunState;

/// Keys held for the interpreter before new ones are dropped.
pub const KEY_QUEUE_CAPACITY: usize = 256;

/// Last known pointer position. Coordinates are -1 while the pointer is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    pub down: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            x: -1,
            y: -1,
            down: false,
        }
    }
}

impl PointerState {
    pub(crate) fn press(&mut self, touch: Touch) {
        self.x = touch.point.x;
        self.y = touch.point.y;
        self.down = true;
    }

    pub(crate) fn drag(&mut self, touch: Touch) {
        if self.down {
            self.x = touch.point.x;
            self.y = touch.point.y;
        }
    }

    pub(crate) fn release(&mut self) {
        *self = Self::default();
    }
}

/// What [`Bridge::pen`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenQuery {
    /// 1 while the pointer is down, else 0.
    Down,
    X,
    Y,
}

/// Thread-safe handle for code that runs off the interpreter thread.
#[derive(Clone)]
pub struct BridgeHandle {
    shared: Arc<BridgeShared>,
}

impl BridgeHandle {
    /// Stop the running program at its next wait or poll.
    pub fn request_break(&self) {
        self.shared.request_break();
    }

    /// Move to Closing and unpark the consumer.
    pub fn request_close(&self) {
        self.shared.state.close();
        self.shared.buffer.wake();
    }

    pub fn state(&self) -> RunState {
        self.shared.state.current()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.shared.viewport()
    }
}

pub struct Bridge<H: Host> {
    pub(crate) host: H,
    pub(crate) screen: Box<dyn Screen>,
    pub(crate) shared: Arc<BridgeShared>,
    listener: Arc<BridgeListener>,
    pub(crate) config: BridgeConfig,
    pub(crate) keys: VecDeque<i32>,
    pub(crate) pointer: PointerState,
    pub(crate) keypad_active: bool,
    pub(crate) back_pressed: bool,
    pub(crate) modal_cancelled: bool,
    sensor_name: Option<String>,
    settings: Settings,
    started: bool,
    finished: bool,
}

impl<H: Host> Bridge<H> {
    pub fn new(host: H, screen: Box<dyn Screen>, config: BridgeConfig) -> Self {
        let shared = Arc::new(BridgeShared::default());
        let listener = Arc::new(BridgeListener::new(Arc::clone(&shared)));
        Self {
            host,
            screen,
            shared,
            listener,
            config,
            keys: VecDeque::new(),
            pointer: PointerState::default(),
            keypad_active: false,
            back_pressed: false,
            modal_cancelled: false,
            sensor_name: None,
            settings: Settings::default(),
            started: false,
            finished: false,
        }
    }

    /// Register the listener with the host. Callbacks may arrive from here on.
    pub fn start(&mut self) -> std::io::Result<()> {
        if self.started {
            return Ok(());
        }
        let listener: Arc<dyn HostListener> = self.listener.clone();
        self.host.start(listener)?;
        self.started = true;
        info!("bridge started");
        Ok(())
    }

    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The callback interface the host was (or will be) started with.
    pub fn listener(&self) -> Arc<dyn HostListener> {
        self.listener.clone()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.shared.state.current()
    }

    pub fn is_closing(&self) -> bool {
        self.shared.state.is_closing()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.shared.viewport()
    }

    pub fn has_focus(&self) -> bool {
        self.shared.has_focus()
    }

    pub fn pending_events(&self) -> usize {
        self.shared.buffer.len()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn keypad_active(&self) -> bool {
        self.keypad_active
    }

    /// Program start: Active -> Running with an empty key queue and no pending break.
    pub fn begin_program(&mut self) -> bool {
        if !self.shared.state.start_program() {
            return false;
        }
        self.keys.clear();
        self.back_pressed = false;
        self.shared.clear_break();
        true
    }

    /// Program end (normal, error or break): Running -> Active.
    pub fn end_program(&mut self) -> bool {
        self.keys.clear();
        self.shared.state.halt_program()
    }

    pub fn enter_editor(&mut self) -> bool {
        self.shared.state.enter_edit()
    }

    pub fn leave_editor(&mut self) -> bool {
        self.shared.state.leave_edit()
    }

    /// Next key for the interpreter, oldest first.
    pub fn next_key(&mut self) -> Option<i32> {
        self.keys.pop_front()
    }

    pub fn request_break(&self) {
        self.shared.request_break();
    }

    pub fn is_break(&self) -> bool {
        self.shared.is_break()
    }

    /// Back was pressed while the program ran.
    pub fn is_back(&self) -> bool {
        self.back_pressed
    }

    /// Program path requested by the host, if any.
    pub fn take_load_path(&mut self) -> Option<String> {
        self.shared.take_pending_path()
    }

    pub fn close(&mut self) {
        if self.shared.state.close() {
            info!("bridge closing");
        }
        self.shared.buffer.wake();
    }

    pub fn show_keypad(&mut self, show: bool) {
        HostCaller::new(&self.host).show_keypad(show);
        self.keypad_active = show;
    }

    /// Show `items` in a host options list and wait for the choice.
    ///
    /// Returns `None` when the list is cancelled with back, the host refuses the call, or the
    /// bridge starts closing.
    pub fn options_box(&mut self, items: &[String]) -> Option<usize> {
        let prior = self.shared.state.enter_modal()?;
        self.modal_cancelled = false;

        let selected = if HostCaller::new(&self.host).options_box(items) {
            self.wait_for(|event| matches!(event, Event::OptionsBoxButtonClicked(_)))
        } else {
            None
        };
        self.shared.state.leave_modal(prior);
        self.modal_cancelled = false;

        match selected {
            Some(Event::OptionsBoxButtonClicked(index)) => {
                usize::try_from(index).ok().filter(|index| *index < items.len())
            }
            _ => None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load shell settings from the configured file and apply the working directory and font
    /// scale.
    pub fn restore_settings(&mut self) -> Result<(), SettingsError> {
        let Some(path) = self.config.settings_file.clone() else {
            return Ok(());
        };
        let Some(settings) = SettingsStore::new(path).load()? else {
            debug!("no saved settings");
            return Ok(());
        };
        if let Some(dir) = settings.path.as_deref() {
            if let Err(err) = std::env::set_current_dir(Path::new(dir)) {
                warn!(%dir, error = %err, "failed to restore working directory");
            }
        }
        if let Some(scale) = settings.effective_font_scale() {
            debug!(scale, "restoring font scale");
            self.screen.set_font_scale(scale);
        }
        self.settings = settings;
        Ok(())
    }

    /// Record the working directory and save shell settings to the configured file.
    pub fn persist_settings(&mut self) -> Result<(), SettingsError> {
        let Some(path) = self.config.settings_file.clone() else {
            return Ok(());
        };
        match std::env::current_dir() {
            Ok(dir) => self.settings.path = Some(dir.display().to_string()),
            Err(err) => warn!(error = %err, "failed to read working directory"),
        }
        SettingsStore::new(path).save(&self.settings)
    }

    pub(crate) fn enable_sensor(&mut self, kind: SensorKind) -> Option<String> {
        self.disable_sensor();
        let name = self.host.enable_sensor(kind)?;
        info!(?kind, %name, "sensor enabled");
        self.sensor_name = Some(name.clone());
        Some(name)
    }

    pub(crate) fn disable_sensor(&mut self) {
        if self.sensor_name.take().is_some() {
            self.host.disable_sensor();
            debug!("sensor disabled");
        }
        self.shared.sensor.clear();
    }

    pub(crate) fn sensor_name(&self) -> Option<&str> {
        self.sensor_name.as_deref()
    }

    /// Closing, flush, release host resources, Done. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.finished {
            return;
        }
        self.close();
        self.screen.flush(true);
        self.disable_sensor();
        HostCaller::new(&self.host).get_boolean("closeLibHandlers");
        if self.started {
            if let Err(err) = self.host.stop() {
                warn!(error = %err, "host stop failed");
            }
            self.started = false;
        }
        self.shared.buffer.clear();
        self.keys.clear();
        self.shared.state.finish();
        self.finished = true;
        info!("bridge shut down");
    }
}

impl<H: Host> Drop for Bridge<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
