//! Server state

use crate::driver::MockDriver;

/// Server state shared across handlers
pub struct MockState {
    pub driver: MockDriver,
}

impl MockState {
    pub fn new(driver: MockDriver) -> Self {
        Self { driver }
    }
}
