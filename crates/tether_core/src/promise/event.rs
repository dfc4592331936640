use crate::value::ScriptValue;
use std::fmt;

/// Promise lifecycle transition reported by the runtime.
///
/// Codes are stable and appear verbatim in log output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromiseRejectEvent {
    PromiseRejectWithNoHandler = 0,
    PromiseHandlerAddedAfterReject = 1,
    PromiseRejectAfterResolved = 2,
    PromiseResolveAfterResolved = 3,
}

impl PromiseRejectEvent {
    pub const ALL: [PromiseRejectEvent; 4] = [
        PromiseRejectEvent::PromiseRejectWithNoHandler,
        PromiseRejectEvent::PromiseHandlerAddedAfterReject,
        PromiseRejectEvent::PromiseRejectAfterResolved,
        PromiseRejectEvent::PromiseResolveAfterResolved,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PromiseRejectEvent::PromiseRejectWithNoHandler => "PromiseRejectWithNoHandler",
            PromiseRejectEvent::PromiseHandlerAddedAfterReject => "PromiseHandlerAddedAfterReject",
            PromiseRejectEvent::PromiseRejectAfterResolved => "PromiseRejectAfterResolved",
            PromiseRejectEvent::PromiseResolveAfterResolved => "PromiseResolveAfterResolved",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

impl fmt::Display for PromiseRejectEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One rejection notification. Consumed once by a callback.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionEvent {
    kind: PromiseRejectEvent,
    promise: ScriptValue,
    reason: ScriptValue,
}

impl RejectionEvent {
    pub fn new(kind: PromiseRejectEvent, promise: ScriptValue, reason: ScriptValue) -> Self {
        Self {
            kind,
            promise,
            reason,
        }
    }

    pub fn kind(&self) -> PromiseRejectEvent {
        self.kind
    }

    pub fn promise(&self) -> &ScriptValue {
        &self.promise
    }

    pub fn reason(&self) -> &ScriptValue {
        &self.reason
    }
}
