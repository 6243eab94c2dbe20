//! Line-oriented JSON console for operating a running authority.
//!
//! Each input line is one [`Request`]; each output line is one response:
//!
//! ```text
//! {"op":"has_role","role":5,"account":"0xa11ce"}
//! {"ok":true,"result":{"is_member":true,"execution_delay":0}}
//! ```
//!
//! Failed requests answer `{"ok":false,"code":...,"error":...}`. Nothing a
//! request does can stop the console.

use crate::authority::AccessManager;
use crate::clock::ManualClock;
use crate::error::CallError;
use crate::host::Host;
use crate::state::RecordingObserver;
use crate::telemetry::spans;
use gatehouse_abi::{from_hex, to_hex, AbiError, Address, OperationId, RoleId, Selector};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Call data or return data, as a `0x`-prefixed hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex(&s).map(HexBytes).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Send raw call data; `to` defaults to the authority.
    Call {
        from: Address,
        to: Option<Address>,
        data: HexBytes,
    },
    CanCall {
        caller: Address,
        target: Address,
        selector: Selector,
    },
    HasRole {
        role: RoleId,
        account: Address,
    },
    GetAccess {
        role: RoleId,
        account: Address,
    },
    GetSchedule {
        id: OperationId,
    },
    HashOperation {
        caller: Address,
        target: Address,
        data: HexBytes,
    },
    /// Move the manual clock forward.
    Advance {
        seconds: u64,
    },
    /// Drain events committed since the last `events` request.
    Events,
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Self::Call { .. } => "call",
            Self::CanCall { .. } => "can_call",
            Self::HasRole { .. } => "has_role",
            Self::GetAccess { .. } => "get_access",
            Self::GetSchedule { .. } => "get_schedule",
            Self::HashOperation { .. } => "hash_operation",
            Self::Advance { .. } => "advance",
            Self::Events => "events",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("bad request: {0}")]
    BadRequest(#[from] serde_json::Error),
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error("the clock is not manual")]
    ClockNotManual,
    #[error("advancing by {0}s would overflow the clock")]
    ClockOverflow(u64),
}

impl ConsoleError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Call(e) => e.error_code(),
            Self::Abi(_) => "abi",
            Self::ClockNotManual => "clock_not_manual",
            Self::ClockOverflow(_) => "clock_overflow",
        }
    }
}

pub struct Console {
    host: Arc<Host>,
    authority: Arc<AccessManager>,
    manual_clock: Option<Arc<ManualClock>>,
    recorder: Arc<RecordingObserver>,
    seq: u64,
}

impl Console {
    /// `manual_clock` must be the clock `host` reads, when it is a manual one.
    pub fn new(
        host: Arc<Host>,
        authority: Arc<AccessManager>,
        manual_clock: Option<Arc<ManualClock>>,
        recorder: Arc<RecordingObserver>,
    ) -> Self {
        Self {
            host,
            authority,
            manual_clock,
            recorder,
            seq: 0,
        }
    }

    /// Serve requests from `reader` until it closes.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let mut response = self.handle_line(&line).to_string();
            response.push('\n');
            writer.write_all(response.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Answer one request line.
    pub fn handle_line(&mut self, line: &str) -> Value {
        self.seq += 1;
        let result = serde_json::from_str::<Request>(line)
            .map_err(ConsoleError::from)
            .and_then(|request| {
                let _span = spans::request(request.name(), self.seq).entered();
                self.handle(request)
            });
        match result {
            Ok(result) => json!({ "ok": true, "result": result }),
            Err(e) => {
                warn!(seq = self.seq, error = %e, "Request failed");
                json!({ "ok": false, "code": e.error_code(), "error": e.to_string() })
            }
        }
    }

    pub fn handle(&self, request: Request) -> Result<Value, ConsoleError> {
        let authority = &self.authority;
        let value = match request {
            Request::Call { from, to, data } => {
                let to = to.unwrap_or_else(|| authority.address());
                let ret = self.host.call(from, to, &data.0)?;
                debug!(from = %from, to = %to, bytes = ret.len(), "Call succeeded");
                json!({ "return": to_hex(&ret) })
            }
            Request::CanCall {
                caller,
                target,
                selector,
            } => {
                let (immediate, delay) = authority.can_call(caller, target, selector);
                json!({ "immediate": immediate, "delay": delay })
            }
            Request::HasRole { role, account } => {
                let (is_member, delay) = authority.has_role(role, account);
                json!({ "is_member": is_member, "execution_delay": delay })
            }
            Request::GetAccess { role, account } => {
                let (since, current, pending, effect) = authority.get_access(role, account);
                json!({
                    "since": since,
                    "current_delay": current,
                    "pending_delay": pending,
                    "effect": effect,
                })
            }
            Request::GetSchedule { id } => json!({
                "timepoint": authority.get_schedule(id),
                "nonce": authority.get_nonce(id),
            }),
            Request::HashOperation {
                caller,
                target,
                data,
            } => json!({ "id": authority.hash_operation(caller, target, &data.0) }),
            Request::Advance { seconds } => {
                let clock = self
                    .manual_clock
                    .as_ref()
                    .ok_or(ConsoleError::ClockNotManual)?;
                let now = clock
                    .advance(seconds)
                    .ok_or(ConsoleError::ClockOverflow(seconds))?;
                json!({ "now": now })
            }
            Request::Events => {
                let dropped = self.recorder.take_dropped();
                if dropped > 0 {
                    warn!(dropped, "Event backlog overflowed, oldest events discarded");
                }
                serde_json::to_value(self.recorder.drain())?
            }
        };
        Ok(value)
    }

    pub fn now(&self) -> u64 {
        self.host.now()
    }
}
