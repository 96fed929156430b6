//! Template rendering.
//!
//! This module provides:
//! - A small XML tree read and written with quick-xml
//! - `$(arg name)` / `${expression}` substitution
//! - Xacro directive expansion (`arg`, `property`, `include`, `if`, `unless`)
//! - [`TemplateRenderer`], which renders a loaded template once per target
//!
//! # Example
//!
//! ```ignore
//! let renderer = TemplateRenderer::load("/opt/share/bot/urdf/bot.xacro")?;
//!
//! // <link name="$(arg target)_base"/> becomes <link name="left_arm_base"/>
//! let document = renderer.render(&Target::named("left_arm"))?;
//! ```

mod document;
mod engine;
mod renderer;
mod substitution;
mod types;

pub use renderer::TemplateRenderer;
pub use types::{RenderError, RenderResult};
