#![allow(dead_code)]

use std::sync::Once;

pub mod cli;
pub mod fixtures;
pub mod mock_server;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        maestro_allure::logging::init_test_logging();
    });
}
