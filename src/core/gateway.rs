//! Synchronous foreign-call gateway into the host runtime.
//!
//! A [`HostGateway`] answers named method calls. Every call made through [`HostCaller`] runs
//! inside an attach scope that is released on all exit paths, and failures are degraded to
//! sentinel values with a `warn!` so nothing escapes the bridge as a hard error.

use tracing::warn;

use crate::error::HostCallError;

#[derive(Debug, Clone, PartialEq)]
pub enum HostArg {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
    Bytes(Vec<u8>),
    StrList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Void,
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
    Bytes(Vec<u8>),
}

impl HostValue {
    pub fn kind(&self) -> ReturnKind {
        match self {
            HostValue::Void => ReturnKind::Void,
            HostValue::Bool(_) => ReturnKind::Bool,
            HostValue::Int(_) => ReturnKind::Int,
            HostValue::Float(_) => ReturnKind::Float,
            HostValue::Str(_) => ReturnKind::Str,
            HostValue::Bytes(_) => ReturnKind::Bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Void,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
}

/// One named method call with its arguments and the return kind the caller expects.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCall {
    pub method: String,
    pub args: Vec<HostArg>,
    pub returns: ReturnKind,
}

impl HostCall {
    pub fn new(method: impl Into<String>, returns: ReturnKind) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
            returns,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: HostArg) -> Self {
        self.args.push(arg);
        self
    }
}

/// Transport to the host runtime.
///
/// `attach` binds the calling thread to the host and must be balanced by `detach`; callers
/// normally go through [`HostCaller`] which does that for them.
pub trait HostGateway {
    fn attach(&self) -> Result<(), HostCallError>;

    fn detach(&self);

    fn invoke(&self, call: &HostCall) -> Result<HostValue, HostCallError>;
}

/// Detaches on drop.
struct AttachScope<'a, G: HostGateway + ?Sized> {
    gateway: &'a G,
}

impl<'a, G: HostGateway + ?Sized> AttachScope<'a, G> {
    fn enter(gateway: &'a G) -> Result<Self, HostCallError> {
        gateway.attach()?;
        Ok(Self { gateway })
    }
}

impl<G: HostGateway + ?Sized> Drop for AttachScope<'_, G> {
    fn drop(&mut self) {
        self.gateway.detach();
    }
}

/// Typed, scoped calls over a [`HostGateway`].
pub struct HostCaller<'a, G: HostGateway + ?Sized> {
    gateway: &'a G,
}

impl<'a, G: HostGateway + ?Sized> HostCaller<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Perform `call` inside an attach scope and check the returned kind.
    pub fn call(&self, call: &HostCall) -> Result<HostValue, HostCallError> {
        let _scope = AttachScope::enter(self.gateway)?;
        let value = self.gateway.invoke(call)?;
        if value.kind() != call.returns {
            return Err(HostCallError::ReturnMismatch {
                method: call.method.clone(),
                expected: call.returns,
                found: value.kind(),
            });
        }
        Ok(value)
    }

    fn call_or_warn(&self, call: &HostCall) -> Option<HostValue> {
        match self.call(call) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(method = %call.method, error = %err, "host call degraded");
                None
            }
        }
    }

    /// No-argument boolean method; `false` on failure.
    pub fn get_boolean(&self, method: &str) -> bool {
        match self.call_or_warn(&HostCall::new(method, ReturnKind::Bool)) {
            Some(HostValue::Bool(value)) => value,
            _ => false,
        }
    }

    /// No-argument integer method; 0 on failure.
    pub fn get_integer(&self, method: &str) -> i32 {
        match self.call_or_warn(&HostCall::new(method, ReturnKind::Int)) {
            Some(HostValue::Int(value)) => value,
            _ => 0,
        }
    }

    /// No-argument string method; empty on failure.
    pub fn get_string(&self, method: &str) -> String {
        match self.call_or_warn(&HostCall::new(method, ReturnKind::Str)) {
            Some(HostValue::Str(value)) => value,
            _ => String::new(),
        }
    }

    /// No-argument byte-array method decoded lossily as UTF-8; empty on failure.
    pub fn get_string_bytes(&self, method: &str) -> String {
        match self.call_or_warn(&HostCall::new(method, ReturnKind::Bytes)) {
            Some(HostValue::Bytes(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            _ => String::new(),
        }
    }

    pub fn set_float(&self, method: &str, value: f32) -> bool {
        let call = HostCall::new(method, ReturnKind::Void).arg(HostArg::Float(value));
        self.call_or_warn(&call).is_some()
    }

    pub fn set_string(&self, method: &str, value: &str) -> bool {
        let call = HostCall::new(method, ReturnKind::Void).arg(HostArg::Str(value.to_string()));
        self.call_or_warn(&call).is_some()
    }

    pub fn set_string_bytes(&self, method: &str, value: &[u8]) -> bool {
        let call = HostCall::new(method, ReturnKind::Void).arg(HostArg::Bytes(value.to_vec()));
        self.call_or_warn(&call).is_some()
    }

    /// Host keyboard-map lookup; 0 when the host has no character for the key.
    pub fn get_unicode_char(&self, key_code: i32, meta_state: i32) -> i32 {
        let call = HostCall::new("getUnicodeChar", ReturnKind::Int)
            .arg(HostArg::Int(key_code))
            .arg(HostArg::Int(meta_state));
        match self.call_or_warn(&call) {
            Some(HostValue::Int(value)) => value,
            _ => 0,
        }
    }

    pub fn show_keypad(&self, show: bool) -> bool {
        let call = HostCall::new("showKeypad", ReturnKind::Void).arg(HostArg::Bool(show));
        self.call_or_warn(&call).is_some()
    }

    /// Ask the host to display an options list. The selection arrives later as an
    /// `OptionsBoxButtonClicked` event.
    pub fn options_box(&self, items: &[String]) -> bool {
        let call =
            HostCall::new("optionsBox", ReturnKind::Void).arg(HostArg::StrList(items.to_vec()));
        self.call_or_warn(&call).is_some()
    }

    pub fn show_alert(&self, title: &str, message: &str) -> bool {
        let call = HostCall::new("showAlert", ReturnKind::Void)
            .arg(HostArg::Str(title.to_string()))
            .arg(HostArg::Str(message.to_string()));
        self.call_or_warn(&call).is_some()
    }
}
