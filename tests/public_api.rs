#![allow(unused_imports)]

use basic_bridge::core::keys::{canonical, native, resolve_us_layout, PRINTABLE_THRESHOLD};
use basic_bridge::platform::connections::{ConnectionPool, Endpoint};
use basic_bridge::platform::input_decoder::{decode_input, Decoded};
#[cfg(unix)]
use basic_bridge::platform::ProcessHost;
use basic_bridge::script::{
    close, exec_func, exec_proc, DeviceServices, LibProc, ScriptValue, FUNCS, MODULE_NAME, PROCS,
};
use basic_bridge::{
    init_logging, translate, Bridge, BridgeConfig, BridgeHandle, BridgeListener, ConnHandle,
    ConnOp, ConnectionError, ConnectionEvent, EnvConfig, Event, EventBuffer, EventKind, Host,
    HostArg, HostCall, HostCallError, HostCaller, HostGateway, HostListener, HostValue, KeyAction,
    KeyInput, KeyState, LifecycleCommand, LoggingError, MotionAction, NativeInput, PenQuery, Point,
    PointerState, ReturnKind, RunState, RunStateMachine, Screen, SensorKind, SensorReading,
    SensorSnapshot, Settings, SettingsError, SettingsStore, Touch, WaitExit, WaitFlag, WaitMode,
    WaitOutcome, KEY_QUEUE_CAPACITY,
};

#[test]
fn public_api_exports_compile() {}
