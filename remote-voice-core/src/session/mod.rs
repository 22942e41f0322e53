pub mod capture;
pub mod drain;
pub mod ingest;
pub mod stream;
pub mod voice_capture;
