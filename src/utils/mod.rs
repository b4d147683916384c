pub mod http; // PostgREST/GoTrue error body parsing
pub mod time;
