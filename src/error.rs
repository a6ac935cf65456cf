//! Error related data structures (§7: cartridge format errors and
//! save-state format errors — the only two ways the core reports failure
//! to its caller; bus access and undefined opcodes never fail).

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unknown cartridge type code, or a header too short to read.
    CartridgeFormat(String),
    /// ROM size disagrees with the declared header size code.
    RomSize,
    /// Bad magic, unsupported version, length mismatch, or decompression
    /// failure while loading a save state.
    SaveStateFormat(String),
    CustomError(String),
}

impl Error {
    pub fn description(&self) -> String {
        match self {
            Error::CartridgeFormat(message) => format!("Invalid cartridge: {message}"),
            Error::RomSize => String::from("Invalid ROM size"),
            Error::SaveStateFormat(message) => format!("Invalid save state: {message}"),
            Error::CustomError(message) => message.clone(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Error {}

impl From<dmg_common::error::Error> for Error {
    fn from(error: dmg_common::error::Error) -> Self {
        Error::SaveStateFormat(error.to_string())
    }
}
