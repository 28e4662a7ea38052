//! Cyclic processing modules
//!
//! The processing stages of `odo_exec` (dead reckoning and line correction) are written as
//! [`State`] implementations: they own their internal state, are configured once by `init`, and
//! are then fed one input per cycle through `proc`. Timing, threading and access to the equipment
//! are left to whoever drives the module, which keeps the processing itself deterministic and
//! testable without any hardware or threads.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Configuration given to the module on initialisation.
    type InitData;
    /// Reason the configuration was rejected.
    type InitError;

    /// Input consumed on each cycle.
    type InputData;
    /// Result produced on each cycle.
    type OutputData;
    /// Diagnostic information on a cycle, not needed by the consumer of the output.
    type StatusReport;
    /// Reason a cycle could not be processed.
    type ProcError;

    /// Initialise the module, discarding any previous state.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Process one cycle's input.
    ///
    /// A module which has not been initialised shall return an error rather than panic.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Create a module from its default (uninitialised) state and initialise it.
pub fn create<S>(init_data: S::InitData) -> Result<S, S::InitError>
where
    S: State + Default,
{
    let mut module = S::default();
    module.init(init_data)?;
    Ok(module)
}
