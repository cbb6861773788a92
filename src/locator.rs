use std::time::Duration;
use tracing::{debug, error, warn};

use crate::driver::Driver;
use crate::error::{ActionError, DriverError};
use crate::types::Selector;

/// Poll for `selector` up to `retries` times, each attempt waiting at most
/// `timeout`. A missing session is reported at once instead of retried.
pub fn locate<'a, D: Driver>(
    driver: &'a D,
    selector: &Selector,
    retries: u32,
    timeout: Duration,
) -> Result<D::Element<'a>, ActionError> {
    for attempt in 1..=retries {
        match driver.find_element(selector, timeout) {
            Ok(element) => {
                debug!(%selector, attempt, "element located");
                return Ok(element);
            }
            Err(DriverError::NotInitialized) => {
                error!(%selector, "browser driver is not set");
                return Err(ActionError::driver_not_initialized());
            }
            Err(e) => {
                warn!(%selector, attempt, error = %e, "element not found on attempt {attempt}");
            }
        }
    }
    error!(%selector, retries, "element not found after {retries} attempts");
    Err(ActionError::element_not_found())
}
