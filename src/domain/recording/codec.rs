//! Codec identifier value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::CodecParseError;

/// Streaming WAV (16-bit PCM)
pub const WAV: &str = "audio/wav";

/// FLAC (lossless)
pub const FLAC: &str = "audio/flac";

/// Opus in WebM, the usual browser capture format
pub const WEBM_OPUS: &str = "audio/webm;codecs=opus";

/// Opus in Ogg
pub const OGG_OPUS: &str = "audio/ogg;codecs=opus";

/// Capture encoding identifier.
///
/// Either a normalized MIME type (optionally with a `codecs=` parameter) or
/// the `Unspecified` marker, meaning "whatever the platform encoder picks".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Codec {
    #[default]
    Unspecified,
    Mime(String),
}

impl Codec {
    pub fn wav() -> Self {
        Self::Mime(WAV.to_string())
    }

    pub fn flac() -> Self {
        Self::Mime(FLAC.to_string())
    }

    /// Full identifier, empty for `Unspecified`
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unspecified => "",
            Self::Mime(s) => s,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// Container MIME type without parameters (`audio/webm;codecs=opus` -> `audio/webm`)
    pub fn mime_type(&self) -> &str {
        self.as_str().split(';').next().unwrap_or_default()
    }

    /// File extension for artifacts of this codec
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
            "audio/flac" | "audio/x-flac" => "flac",
            "audio/webm" => "webm",
            "audio/ogg" => "ogg",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/mp4" | "audio/aac" => "m4a",
            _ => "bin",
        }
    }

    /// Best guess from a file extension; unknown extensions are `Unspecified`
    pub fn from_extension(ext: &str) -> Self {
        let mime = match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => WAV,
            "flac" => FLAC,
            "webm" => WEBM_OPUS,
            "ogg" | "opus" => OGG_OPUS,
            "mp3" => "audio/mpeg",
            "m4a" => "audio/mp4",
            _ => return Self::Unspecified,
        };
        Self::Mime(mime.to_string())
    }

    /// Whether this identifier names a WAV container
    pub fn is_wav(&self) -> bool {
        self.extension() == "wav"
    }

    /// Normalize an identifier: lowercase, no whitespace
    fn normalize(input: &str) -> String {
        input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    }
}

impl FromStr for Codec {
    type Err = CodecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = Self::normalize(s);
        let valid = normalized
            .split_once('/')
            .map(|(kind, sub)| !kind.is_empty() && !sub.is_empty() && !sub.starts_with(';'))
            .unwrap_or(false);

        if !valid {
            return Err(CodecParseError {
                input: s.to_string(),
            });
        }
        Ok(Self::Mime(normalized))
    }
}

impl From<String> for Codec {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Self::Unspecified)
    }
}

impl From<Codec> for String {
    fn from(value: Codec) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "(platform default)"),
            Self::Mime(s) => write!(f, "{}", s),
        }
    }
}

/// Default capture preference order, best first
pub fn default_preferences() -> Vec<Codec> {
    [WEBM_OPUS, OGG_OPUS, FLAC, WAV]
        .iter()
        .map(|s| Codec::Mime(s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_spaces() {
        let codec: Codec = " Audio/WebM; codecs=Opus ".parse().unwrap();
        assert_eq!(codec.as_str(), "audio/webm;codecs=opus");
        assert_eq!(codec.mime_type(), "audio/webm");
    }

    #[test]
    fn parse_rejects_non_mime() {
        assert!("".parse::<Codec>().is_err());
        assert!("wav".parse::<Codec>().is_err());
        assert!("audio/".parse::<Codec>().is_err());
        assert!("/wav".parse::<Codec>().is_err());
    }

    #[test]
    fn extensions() {
        assert_eq!(Codec::wav().extension(), "wav");
        assert_eq!(Codec::flac().extension(), "flac");
        assert_eq!(WEBM_OPUS.parse::<Codec>().unwrap().extension(), "webm");
        assert_eq!(Codec::Unspecified.extension(), "bin");
    }

    #[test]
    fn from_extension_guesses_container() {
        assert_eq!(Codec::from_extension("WAV"), Codec::wav());
        assert_eq!(Codec::from_extension("flac"), Codec::flac());
        assert_eq!(Codec::from_extension("ogg").as_str(), OGG_OPUS);
        assert_eq!(Codec::from_extension("txt"), Codec::Unspecified);
    }

    #[test]
    fn unspecified_is_default_and_empty() {
        assert_eq!(Codec::default(), Codec::Unspecified);
        assert_eq!(Codec::Unspecified.as_str(), "");
        assert!(Codec::Unspecified.is_unspecified());
    }

    #[test]
    fn serde_uses_plain_string() {
        let json = serde_json::to_string(&Codec::flac()).unwrap();
        assert_eq!(json, "\"audio/flac\"");
        let back: Codec = serde_json::from_str("\"\"").unwrap();
        assert_eq!(back, Codec::Unspecified);
    }

    #[test]
    fn default_preferences_order() {
        let prefs = default_preferences();
        assert_eq!(prefs.first().unwrap().as_str(), WEBM_OPUS);
        assert_eq!(prefs.last().unwrap(), &Codec::wav());
    }
}
