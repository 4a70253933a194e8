//! End-to-end tests across the lockout, expiration, session and worker crates.

mod helpers;

mod expiration_test;
mod lockout_test;
mod session_test;
