//! Per-target render and publish orchestration.

mod coordinator;

pub use coordinator::{CoordinatorState, PublishCoordinator, RunReport, TargetFailure};

use std::path::PathBuf;
use std::sync::Arc;

use crate::channel::{ChannelPublisher, Transport};
use crate::error::ConfigurationError;
use crate::package::PackageLocator;
use crate::target::TargetSelection;
use crate::template::TemplateRenderer;

/// What to publish and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    pub package: String,
    /// Template path relative to the package share directory
    pub template: PathBuf,
    /// Base channel name; may be empty
    pub topic: String,
    pub targets: TargetSelection,
}

/// Locate the template and build a coordinator for it.
///
/// Fails before anything is published when the package cannot be found or
/// the template cannot be read.
pub fn prepare<T: Transport>(
    options: &PublishOptions,
    locator: &dyn PackageLocator,
    transport: Arc<T>,
) -> Result<PublishCoordinator<T>, ConfigurationError> {
    let share = locator.share_directory(&options.package).map_err(|e| {
        tracing::error!(package = %options.package, error = %e, "Cannot find share folder for package");
        e
    })?;

    let template = share.join(&options.template);
    tracing::info!(template = %template.display(), "Using xacro file");

    let renderer = TemplateRenderer::load(&template)?;
    let publisher = ChannelPublisher::new(transport, options.topic.clone());

    Ok(PublishCoordinator::new(renderer, publisher))
}
