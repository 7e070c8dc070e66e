//! Capture codec negotiation

use tracing::debug;

use crate::domain::recording::Codec;

use super::ports::MediaEncoder;

/// Pick the first preferred codec the encoder reports as supported.
///
/// Falls back to `Codec::Unspecified` when nothing matches; that is a
/// degraded choice, not an error. Callers re-run this on every session start.
pub fn negotiate_codec<E>(preferences: &[Codec], encoder: &E) -> Codec
where
    E: MediaEncoder + ?Sized,
{
    let chosen = preferences
        .iter()
        .filter(|c| !c.is_unspecified())
        .find(|c| encoder.is_type_supported(c))
        .cloned()
        .unwrap_or_default();
    debug!(codec = %chosen, "negotiated capture codec");
    chosen
}
