//! Playback infrastructure module

mod rodio_probe;

pub use rodio_probe::RodioProbe;
