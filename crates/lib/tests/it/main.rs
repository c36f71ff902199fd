/*! Integration tests for Userbase.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * - service: UserService end to end against a real backend
 *   (InMemory, or HTTP via TEST_BACKEND=http)
 * - http: HttpBackend against the bundled REST router
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("userbase=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod http;
mod service;
