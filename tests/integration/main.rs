//! End-to-end tests over the wired service stack.

mod helpers;

mod lifecycle_test;
mod promise_test;
mod range_test;
mod transfer_test;
