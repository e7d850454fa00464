//! Charalens service library: the HTTP server, shared by the binary and the
//! integration tests.

pub mod server;
