//! Hysteresis heater controller — a function-pointer state table.
//!
//! ```text
//!  IDLE ──[setpoint appears]──▶ HEATING_OFF
//!    ▲                            │      ▲
//!    │                   [T <= S-band]  [T >= S+band]
//!    │                            ▼      │
//!    └──[setpoint removed]──── HEATING_ON
//!         (from either)
//! ```
//!
//! Each control cycle the engine calls `on_update` for the current state.
//! `Some(next)` triggers `on_exit(current)` → `on_enter(next)`. Handlers
//! receive `&mut HeaterContext`, which carries the polled setpoint, the
//! latest temperature, and the actuator command the service applies after
//! the tick. Inside the band nothing changes — that dead zone is what
//! keeps the relay from chattering.

use log::info;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Actuator duties requested by the controller (0-255). Applying them to
/// real PWM/GPIO is the adapter's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaterCommands {
    pub heater_duty: u8,
    pub fan_duty: u8,
}

impl HeaterCommands {
    pub const fn all_off() -> Self {
        Self {
            heater_duty: 0,
            fan_duty: 0,
        }
    }
}

/// Everything the state handlers see. Mutated only by the controller's
/// own evaluation step; the service refreshes `setpoint_c` and
/// `temperature_c` before each tick.
#[derive(Debug, Clone)]
pub struct HeaterContext {
    /// Target temperature, if the external setpoint source has one.
    pub setpoint_c: Option<f32>,
    /// Latest temperature reading; `None` when the sensor read failed.
    pub temperature_c: Option<f32>,
    /// Hysteresis half-band around the setpoint (degC).
    pub hysteresis_c: f32,
    /// Duty to request while heating.
    pub heater_duty_on: u8,
    pub commands: HeaterCommands,
}

impl HeaterContext {
    pub fn new(hysteresis_c: f32, heater_duty_on: u8) -> Self {
        Self {
            setpoint_c: None,
            temperature_c: None,
            hysteresis_c,
            heater_duty_on,
            commands: HeaterCommands::all_off(),
        }
    }
}

// ---------------------------------------------------------------------------
// State identity and table
// ---------------------------------------------------------------------------

/// Heater control states. `Idle` = no setpoint, heater forced off;
/// the On/Off pair is the hysteresis sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HeaterStateId {
    Idle = 0,
    HeatingOff = 1,
    HeatingOn = 2,
}

impl HeaterStateId {
    pub const COUNT: usize = 3;
}

pub type StateActionFn = fn(&mut HeaterContext);
pub type StateUpdateFn = fn(&mut HeaterContext) -> Option<HeaterStateId>;

/// Static descriptor for one state — plain `fn` pointers, no dispatch.
pub struct StateDescriptor {
    pub id: HeaterStateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// Build the static state table. Called once at controller start.
pub fn build_state_table() -> [StateDescriptor; HeaterStateId::COUNT] {
    [
        StateDescriptor {
            id: HeaterStateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: HeaterStateId::HeatingOff,
            name: "HeatingOff",
            on_enter: Some(heating_off_enter),
            on_exit: None,
            on_update: heating_off_update,
        },
        StateDescriptor {
            id: HeaterStateId::HeatingOn,
            name: "HeatingOn",
            on_enter: Some(heating_on_enter),
            on_exit: Some(heating_on_exit),
            on_update: heating_on_update,
        },
    ]
}

// ---------------------------------------------------------------------------
// State handlers
// ---------------------------------------------------------------------------

fn idle_enter(ctx: &mut HeaterContext) {
    ctx.commands.heater_duty = 0;
    info!("IDLE: no setpoint, measurement-only (heater off)");
}

fn idle_update(ctx: &mut HeaterContext) -> Option<HeaterStateId> {
    // A setpoint appeared: enter the hysteresis sub-machine not-heating,
    // and let the band decide from there.
    ctx.setpoint_c.map(|_| HeaterStateId::HeatingOff)
}

fn heating_off_enter(ctx: &mut HeaterContext) {
    ctx.commands.heater_duty = 0;
}

fn heating_off_update(ctx: &mut HeaterContext) -> Option<HeaterStateId> {
    let Some(setpoint) = ctx.setpoint_c else {
        return Some(HeaterStateId::Idle);
    };
    let temperature = ctx.temperature_c?; // no reading: hold state
    if temperature <= setpoint - ctx.hysteresis_c {
        info!(
            "heater ON: {temperature:.2} degC <= {:.2}",
            setpoint - ctx.hysteresis_c
        );
        return Some(HeaterStateId::HeatingOn);
    }
    None
}

fn heating_on_enter(ctx: &mut HeaterContext) {
    ctx.commands.heater_duty = ctx.heater_duty_on;
}

fn heating_on_exit(ctx: &mut HeaterContext) {
    ctx.commands.heater_duty = 0;
}

fn heating_on_update(ctx: &mut HeaterContext) -> Option<HeaterStateId> {
    let Some(setpoint) = ctx.setpoint_c else {
        // Setpoint withdrawn: heater off immediately via on_exit/idle_enter.
        return Some(HeaterStateId::Idle);
    };
    let temperature = ctx.temperature_c?;
    if temperature >= setpoint + ctx.hysteresis_c {
        info!(
            "heater OFF: {temperature:.2} degC >= {:.2}",
            setpoint + ctx.hysteresis_c
        );
        return Some(HeaterStateId::HeatingOff);
    }
    None
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The controller engine: state table plus current-state pointer.
pub struct HeaterFsm {
    table: [StateDescriptor; HeaterStateId::COUNT],
    current: usize,
}

impl HeaterFsm {
    pub fn new() -> Self {
        Self {
            table: build_state_table(),
            current: HeaterStateId::Idle as usize,
        }
    }

    /// Run the initial `on_enter`. Call once before the first `tick`.
    pub fn start(&mut self, ctx: &mut HeaterContext) {
        info!("heater FSM starting in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Evaluate one control cycle against the refreshed context.
    pub fn tick(&mut self, ctx: &mut HeaterContext) {
        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> HeaterStateId {
        self.table[self.current].id
    }

    fn transition(&mut self, next: HeaterStateId, ctx: &mut HeaterContext) {
        let next_idx = next as usize;
        info!(
            "heater FSM: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }
        self.current = next_idx;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

impl Default for HeaterFsm {
    fn default() -> Self {
        Self::new()
    }
}
