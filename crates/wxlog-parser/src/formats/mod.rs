mod common;
mod station_frame;

pub use station_frame::StationFrameParser;
