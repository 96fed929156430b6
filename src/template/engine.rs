//! Xacro-style expansion engine.
//!
//! Supported directives (all in the `xacro:` namespace):
//!
//! | Directive | Effect |
//! |-----------|--------|
//! | `arg name default` | Declares an argument; a passed parameter wins over `default` |
//! | `property name value` | Defines a property for `${name}` |
//! | `include filename` | Inlines the children of another document's root |
//! | `if value` / `unless value` | Keeps or drops children on a boolean |
//!
//! Includes resolve relative to the directory of the including document.

use std::fs;
use std::path::{Path, PathBuf};

use super::document::{self, Element, Node};
use super::substitution::{is_truthy, substitute, Scope};
use super::types::{Parameters, RenderError, RenderResult};

const DIRECTIVE_PREFIX: &str = "xacro:";
const NAMESPACE_ATTRIBUTE: &str = "xmlns:xacro";
const MAX_INCLUDE_DEPTH: usize = 32;

/// Expand `source` (read from `origin`) into a standalone document
pub fn expand(
    source: &str,
    origin: &Path,
    base_dir: &Path,
    parameters: &Parameters,
) -> RenderResult<String> {
    let root = document::parse(source).map_err(|message| RenderError::Malformed {
        path: origin.to_path_buf(),
        message,
    })?;

    let mut expander = Expander {
        scope: Scope::with_arguments(parameters.clone()),
        depth: 0,
    };
    let root = expander.expand_element(root, base_dir)?;

    document::write(&root).map_err(RenderError::Output)
}

struct Expander {
    scope: Scope,
    depth: usize,
}

impl Expander {
    fn expand_element(&mut self, element: Element, dir: &Path) -> RenderResult<Element> {
        let mut attributes = Vec::with_capacity(element.attributes.len());
        for (key, value) in element.attributes {
            if key == NAMESPACE_ATTRIBUTE {
                continue;
            }
            let value = substitute(&value, &self.scope)?;
            attributes.push((key, value));
        }

        let children = self.expand_children(element.children, dir)?;

        Ok(Element {
            name: element.name,
            attributes,
            children,
        })
    }

    fn expand_children(&mut self, nodes: Vec<Node>, dir: &Path) -> RenderResult<Vec<Node>> {
        let mut output = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::Element(element) => match element.name.strip_prefix(DIRECTIVE_PREFIX) {
                    Some(directive) => {
                        let directive = directive.to_string();
                        output.extend(self.apply_directive(&directive, element, dir)?);
                    }
                    None => output.push(Node::Element(self.expand_element(element, dir)?)),
                },
                Node::Text(text) => output.push(Node::Text(substitute(&text, &self.scope)?)),
                other => output.push(other),
            }
        }

        Ok(output)
    }

    fn apply_directive(
        &mut self,
        directive: &str,
        element: Element,
        dir: &Path,
    ) -> RenderResult<Vec<Node>> {
        match directive {
            "arg" => {
                let name = required(directive, &element, "name")?.to_string();
                if !self.scope.has_argument(&name) {
                    if let Some(default) = element.attribute("default") {
                        let value = substitute(default, &self.scope)?;
                        self.scope.set_argument(name, value);
                    }
                }
                Ok(Vec::new())
            }
            "property" => {
                let name = required(directive, &element, "name")?.to_string();
                let value = substitute(required(directive, &element, "value")?, &self.scope)?;
                self.scope.set_property(name, value);
                Ok(Vec::new())
            }
            "include" => {
                let filename = substitute(required(directive, &element, "filename")?, &self.scope)?;
                self.include(&dir.join(filename))
            }
            "if" | "unless" => {
                let value = substitute(required(directive, &element, "value")?, &self.scope)?;
                let keep = is_truthy(&value)? == (directive == "if");
                if keep {
                    self.expand_children(element.children, dir)
                } else {
                    Ok(Vec::new())
                }
            }
            other => Err(RenderError::UnsupportedDirective(other.to_string())),
        }
    }

    fn include(&mut self, path: &Path) -> RenderResult<Vec<Node>> {
        if self.depth >= MAX_INCLUDE_DEPTH {
            return Err(RenderError::IncludeDepth(path.to_path_buf()));
        }

        let source = fs::read_to_string(path).map_err(|source| RenderError::Include {
            path: path.to_path_buf(),
            source,
        })?;
        let root = document::parse(&source).map_err(|message| RenderError::Malformed {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::debug!(path = %path.display(), "Including template");

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
        self.depth += 1;
        let nodes = self.expand_children(root.children, &dir);
        self.depth -= 1;
        nodes
    }
}

fn required<'a>(directive: &str, element: &'a Element, attribute: &'static str) -> RenderResult<&'a str> {
    element
        .attribute(attribute)
        .ok_or_else(|| RenderError::MissingAttribute {
            directive: directive.to_string(),
            attribute,
        })
}
