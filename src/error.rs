use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq)]
/// Everything that can go wrong between the serial line and an output event
pub enum NavError {
    /// The byte source failed; stops the read loop
    #[error("Transport failure: {0}")]
    Transport(String),
    /// A line that is not valid UTF-8
    #[error("Failed to decode line: {0}")]
    Decode(String),
    /// The trailing checksum does not match the payload
    #[error("Checksum mismatch: sentence says {expected:02X}, payload is {computed:02X}")]
    ChecksumMismatch {
        /// Checksum carried by the sentence
        expected: u8,
        /// XOR of the payload bytes
        computed: u8,
    },
    /// The line is not shaped like an NMEA sentence
    #[error("Malformed sentence: {0}")]
    MalformedSentence(String),
    /// A well-formed sentence of a type we do not decode
    #[error("Unsupported sentence type: {0}")]
    UnsupportedSentenceType(String),
    /// A field could not be converted to its expected type
    #[error("Failed to decode field {field}: {value:?}")]
    FieldDecode {
        /// Name of the field in the sentence grammar
        field: &'static str,
        /// Raw text of the field
        value: String,
    },
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NavError {
    /// Only transport failures end the read loop; everything else drops one line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NavError::Transport(_))
    }
}

impl From<std::io::Error> for NavError {
    fn from(err: std::io::Error) -> Self {
        NavError::Transport(err.to_string())
    }
}

impl From<serialport::Error> for NavError {
    fn from(err: serialport::Error) -> Self {
        NavError::Transport(err.to_string())
    }
}
