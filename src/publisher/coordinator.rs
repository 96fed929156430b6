use serde::Serialize;

use crate::channel::{ChannelPublisher, Transport};
use crate::error::PublishError;
use crate::metrics::RenderMetrics;
use crate::target::{Target, TargetSelection};
use crate::template::TemplateRenderer;

/// Lifecycle of one coordinator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Idle,
    Resolving,
    Rendering,
    Publishing,
    /// All targets handled; publications stay latched until shutdown
    Serving,
}

/// A target skipped because its template failed to render
#[derive(Debug, Clone, Serialize)]
pub struct TargetFailure {
    pub target: Target,
    pub error: String,
}

/// Outcome of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Channels published, in target order
    pub published: Vec<String>,
    pub failed: Vec<TargetFailure>,
}

/// Renders and publishes the template once per target.
///
/// Targets are handled strictly in order. A render failure is logged and
/// the target skipped; a publish error aborts the run.
pub struct PublishCoordinator<T: Transport> {
    renderer: TemplateRenderer,
    publisher: ChannelPublisher<T>,
    state: CoordinatorState,
}

impl<T: Transport> PublishCoordinator<T> {
    pub fn new(renderer: TemplateRenderer, publisher: ChannelPublisher<T>) -> Self {
        Self {
            renderer,
            publisher,
            state: CoordinatorState::Idle,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn publisher(&self) -> &ChannelPublisher<T> {
        &self.publisher
    }

    fn transition(&mut self, next: CoordinatorState) {
        tracing::trace!(from = ?self.state, to = ?next, "Coordinator state change");
        self.state = next;
    }

    /// Publish every selected target.
    ///
    /// An empty target list publishes the unset target instead, so a run
    /// always attempts at least one publish.
    #[tracing::instrument(
        name = "coordinator.run",
        skip(self, selection),
        fields(
            template = %self.renderer.path().display(),
            base_channel = %self.publisher.base_channel()
        )
    )]
    pub fn run(&mut self, selection: TargetSelection) -> Result<RunReport, PublishError> {
        self.transition(CoordinatorState::Resolving);
        let mut targets = selection.into_targets();
        if targets.is_empty() {
            tracing::info!("No targets selected, publishing the unset target");
            targets.push(Target::Unset);
        }
        tracing::info!(count = targets.len(), "Resolved targets");

        let mut report = RunReport::default();

        for target in &targets {
            self.transition(CoordinatorState::Rendering);
            let document = match self.renderer.render(target) {
                Ok(document) => document,
                Err(e) => {
                    RenderMetrics::record_failure();
                    tracing::error!(
                        target_name = %target,
                        template = %self.renderer.path().display(),
                        error = %e,
                        "Cannot publish target"
                    );
                    report.failed.push(TargetFailure {
                        target: target.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            self.transition(CoordinatorState::Publishing);
            let record = self.publisher.publish(target, &document)?;
            report.published.push(record.channel.clone());
        }

        self.transition(CoordinatorState::Serving);
        tracing::info!(
            published = report.published.len(),
            failed = report.failed.len(),
            "All targets processed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::channel::LatchedBus;
    use crate::target::resolve;

    const TEMPLATE: &str = r#"<robot xmlns:xacro="http://www.ros.org/wiki/xacro">
  <xacro:arg name="target" default="full"/>
  <xacro:if value="${'$(arg target)' == 'head'}">
    <xacro:include filename="head_variant_that_does_not_exist.xacro"/>
  </xacro:if>
  <link name="$(arg target)"/>
</robot>"#;

    fn coordinator(bus: &Arc<LatchedBus>, base: &str) -> PublishCoordinator<LatchedBus> {
        let dir = std::env::temp_dir();
        let renderer = TemplateRenderer::from_source(dir.join("bot.xacro"), dir, TEMPLATE);
        PublishCoordinator::new(renderer, ChannelPublisher::new(bus.clone(), base))
    }

    #[test]
    fn test_render_failure_is_isolated() {
        let bus = Arc::new(LatchedBus::new());
        let mut coordinator = coordinator(&bus, "robot_description");

        let report = coordinator
            .run(TargetSelection::Spec("arm,head,torso".to_string()))
            .unwrap();

        assert_eq!(
            report.published,
            vec!["robot_description/arm", "robot_description/torso"]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].target, Target::named("head"));
        assert!(bus.latest("robot_description/head").is_none());
        assert_eq!(coordinator.state(), CoordinatorState::Serving);
    }

    #[test]
    fn test_wildcard_publishes_base_channel() {
        let bus = Arc::new(LatchedBus::new());
        let mut coordinator = coordinator(&bus, "robot_description");

        let report = coordinator.run(TargetSelection::default()).unwrap();

        assert_eq!(report.published, vec!["robot_description"]);
        let document = bus.latest("robot_description").unwrap();
        assert!(document.data.contains(r#"<link name="full"/>"#));
    }

    #[test]
    fn test_explicit_empty_list_falls_back_to_unset() {
        let bus = Arc::new(LatchedBus::new());
        let mut coordinator = coordinator(&bus, "robot_description");

        let report = coordinator.run(TargetSelection::Explicit(Vec::new())).unwrap();

        assert_eq!(report.published, vec!["robot_description"]);
        assert_eq!(coordinator.publisher().records().len(), 1);
    }

    #[test]
    fn test_explicit_list_ignores_spec() {
        let bus = Arc::new(LatchedBus::new());
        let mut coordinator = coordinator(&bus, "robot_description");

        let report = coordinator
            .run(TargetSelection::Explicit(resolve("left")))
            .unwrap();

        assert_eq!(report.published, vec!["robot_description/left"]);
    }

    #[test]
    fn test_duplicate_targets_overwrite() {
        let bus = Arc::new(LatchedBus::new());
        let mut coordinator = coordinator(&bus, "robot_description");

        let report = coordinator
            .run(TargetSelection::Spec("arm,arm".to_string()))
            .unwrap();

        assert_eq!(report.published.len(), 2);
        assert_eq!(bus.latest("robot_description/arm").unwrap().sequence, 2);
        assert_eq!(coordinator.publisher().records().len(), 2);
    }

    #[test]
    fn test_empty_base_channel_is_fatal() {
        let bus = Arc::new(LatchedBus::new());
        let mut coordinator = coordinator(&bus, "");

        let err = coordinator
            .run(TargetSelection::Spec("arm,torso".to_string()))
            .unwrap_err();

        assert_eq!(err, PublishError::MissingChannel);
        assert!(bus.channels().is_empty());
        assert_eq!(coordinator.state(), CoordinatorState::Publishing);
    }
}
