pub mod acquisition;
pub mod live_stream;
pub mod surface_source;
