// Classpath Discovery
//
// Collects the resource locations the child needs from explicit marker
// locators, deduplicated, in first-seen order.

use tracing::debug;

use crate::domain::Classpath;
use crate::error::Result;
use crate::port::ResourceLocator;

/// Union of every marker's locations
///
/// # Errors
/// - AppError::EnvironmentAssumption if any marker cannot report its locations
pub fn discover_required_classpath(markers: &[&dyn ResourceLocator]) -> Result<Classpath> {
    let mut classpath = Classpath::new();

    for marker in markers {
        let locations = marker.locations()?;
        let before = classpath.len();
        classpath.extend(locations);

        debug!(
            marker = marker.name(),
            added = classpath.len() - before,
            "Collected marker locations"
        );
    }

    Ok(classpath)
}
