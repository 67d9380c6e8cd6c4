//! Every command the supply answers to, and the pattern the grammar engine registers it under.
//!
//! Patterns use the usual SCPI notation: upper case letters are the short
//! form, bracketed nodes are optional. A trailing `?` marks a query.

use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumCountMacro, IntoStaticStr)]
pub enum Command {
    #[strum(serialize = "*RST")]
    Reset,
    #[strum(serialize = "*TST?")]
    SelfTestQuery,

    #[strum(serialize = "SYSTem:LOCal")]
    Local,
    #[strum(serialize = "SYSTem:REMote")]
    Remote,
    #[strum(serialize = "SYSTem:RWLock")]
    RwLock,
    #[strum(serialize = "SYSTem:BEEPer:STATe")]
    BeeperState,
    #[strum(serialize = "SYSTem:BEEPer:STATe?")]
    BeeperStateQuery,
    #[strum(serialize = "SYSTem:BEEPer[:IMMediate]")]
    BeepImmediate,

    #[strum(serialize = "DISPlay[:WINDow]:TEXT:CLEar")]
    DisplayTextClear,
    #[strum(serialize = "DISPlay[:WINDow]:TEXT[:DATA]")]
    DisplayText,
    #[strum(serialize = "DISPlay:BRIGhtness")]
    DisplayBrightness,
    #[strum(serialize = "DISPlay:ENABle")]
    DisplayEnable,

    #[strum(serialize = "INSTrument[:SELect]")]
    InstrumentSelect,
    #[strum(serialize = "INSTrument[:SELect]?")]
    InstrumentSelectQuery,
    #[strum(serialize = "INSTrument:NSELect")]
    InstrumentNSelect,
    #[strum(serialize = "INSTrument:NSELect?")]
    InstrumentNSelectQuery,

    #[strum(serialize = "[SOURce]:VOLTage[:LEVel][:IMMediate][:AMPLitude]")]
    Voltage,
    #[strum(serialize = "[SOURce]:VOLTage[:LEVel][:IMMediate][:AMPLitude]?")]
    VoltageQuery,
    #[strum(serialize = "[SOURce]:VOLTage[:LEVel]:STEP[:INCRement]")]
    VoltageStep,
    #[strum(serialize = "[SOURce]:VOLTage[:LEVel]:STEP[:INCRement]?")]
    VoltageStepQuery,
    #[strum(serialize = "[SOURce]:CURRent[:LEVel][:IMMediate][:AMPLitude]")]
    Current,
    #[strum(serialize = "[SOURce]:CURRent[:LEVel][:IMMediate][:AMPLitude]?")]
    CurrentQuery,
    #[strum(serialize = "[SOURce]:CURRent[:LEVel]:STEP[:INCRement]")]
    CurrentStep,
    #[strum(serialize = "[SOURce]:CURRent[:LEVel]:STEP[:INCRement]?")]
    CurrentStepQuery,

    #[strum(serialize = "APPLy")]
    Apply,
    #[strum(serialize = "APPLy?")]
    ApplyQuery,

    #[strum(serialize = "OUTPut[:CHANnel][:STATe]")]
    Output,
    #[strum(serialize = "OUTPut[:CHANnel][:STATe]?")]
    OutputQuery,

    #[strum(serialize = "MEASure[:SCALar]:VOLTage[:DC]?")]
    MeasureVoltage,
    #[strum(serialize = "MEASure[:SCALar]:CURRent[:DC]?")]
    MeasureCurrent,
    #[strum(serialize = "MEASure[:SCALar]:POWer?")]
    MeasurePower,

    #[strum(serialize = "ADDRess[:SET]")]
    Address,
}

impl Command {
    /// Pattern to register with the grammar engine.
    pub fn pattern(self) -> &'static str {
        self.into()
    }

    pub fn is_query(self) -> bool {
        self.pattern().ends_with('?')
    }

    /// Most parameters the command takes. Anything beyond is rejected before it runs.
    pub fn max_params(self) -> usize {
        use Command as C;

        match self {
            C::Apply => 3,
            C::BeeperState
            | C::DisplayText
            | C::DisplayBrightness
            | C::DisplayEnable
            | C::InstrumentSelect
            | C::InstrumentNSelect
            | C::Voltage
            | C::VoltageQuery
            | C::VoltageStep
            | C::VoltageStepQuery
            | C::Current
            | C::CurrentQuery
            | C::CurrentStep
            | C::CurrentStepQuery
            | C::Output
            | C::Address => 1,
            _ => 0,
        }
    }
}
