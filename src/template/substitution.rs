//! `$(arg name)` and `${expression}` substitution

use std::collections::HashMap;

use super::types::{RenderError, RenderResult};

/// Arguments and properties visible to a template
#[derive(Debug, Clone, Default)]
pub struct Scope {
    arguments: HashMap<String, String>,
    properties: HashMap<String, String>,
}

impl Scope {
    pub fn with_arguments(arguments: HashMap<String, String>) -> Self {
        Self {
            arguments,
            properties: HashMap::new(),
        }
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.arguments.insert(name.into(), value.into());
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    fn argument(&self, name: &str) -> RenderResult<&str> {
        self.arguments
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RenderError::UndefinedArgument(name.to_string()))
    }

    fn property(&self, name: &str) -> RenderResult<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RenderError::UndefinedProperty(name.to_string()))
    }
}

/// Expand all substitutions in `text` in a single left-to-right pass.
///
/// `$(...)` commands may also appear inside `${...}` expressions, e.g.
/// `${'$(arg target)' == 'head'}`; they are expanded within the expression
/// body before it is evaluated. Substituted values are never rescanned.
pub fn substitute(text: &str, scope: &Scope) -> RenderResult<String> {
    if !text.contains('$') {
        return Ok(text.to_string());
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('$') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(body) = tail.strip_prefix("$(") {
            let (command, after) = delimited(tail, body, ')')?;
            result.push_str(&run_command(command, scope)?);
            rest = after;
        } else if let Some(body) = tail.strip_prefix("${") {
            let (expr, after) = delimited(tail, body, '}')?;
            let expr = expand_commands(expr, scope)?;
            result.push_str(&evaluate(&expr, scope)?);
            rest = after;
        } else {
            result.push('$');
            rest = &tail[1..];
        }
    }
    result.push_str(rest);

    Ok(result)
}

/// Interpret a substituted value as a condition
pub fn is_truthy(value: &str) -> RenderResult<bool> {
    match value.trim() {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        other => Err(RenderError::Expression(format!(
            "'{}' is not a boolean",
            other
        ))),
    }
}

/// Split `body` at the first `close`, returning the inner text and the rest
fn delimited<'a>(whole: &str, body: &'a str, close: char) -> RenderResult<(&'a str, &'a str)> {
    let end = body
        .find(close)
        .ok_or_else(|| RenderError::Expression(format!("unterminated '{}'", whole)))?;
    Ok((&body[..end], &body[end + close.len_utf8()..]))
}

/// Expand `$(...)` commands inside an expression body
fn expand_commands(expr: &str, scope: &Scope) -> RenderResult<String> {
    let mut result = String::with_capacity(expr.len());
    let mut rest = expr;

    while let Some(start) = rest.find("$(") {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];
        let (command, after) = delimited(tail, &tail[2..], ')')?;
        result.push_str(&run_command(command, scope)?);
        rest = after;
    }
    result.push_str(rest);

    Ok(result)
}

fn run_command(command: &str, scope: &Scope) -> RenderResult<String> {
    let mut words = command.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("arg"), Some(name), None) => scope.argument(name).map(str::to_string),
        _ => Err(RenderError::Expression(format!(
            "unsupported command '$({})'",
            command
        ))),
    }
}

fn evaluate(expr: &str, scope: &Scope) -> RenderResult<String> {
    if let Some((lhs, rhs)) = split_operator(expr, "==") {
        let equal = compare(&operand(lhs, scope)?, &operand(rhs, scope)?);
        return Ok(equal.to_string());
    }
    if let Some((lhs, rhs)) = split_operator(expr, "!=") {
        let equal = compare(&operand(lhs, scope)?, &operand(rhs, scope)?);
        return Ok((!equal).to_string());
    }
    operand(expr, scope)
}

/// Split at the first `op` that is not inside a quoted literal
fn split_operator<'a>(expr: &'a str, op: &str) -> Option<(&'a str, &'a str)> {
    let mut quote: Option<char> = None;

    for (index, c) in expr.char_indices() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if expr[index..].starts_with(op) => {
                return Some((&expr[..index], &expr[index + op.len()..]));
            }
            None => {}
        }
    }

    None
}

fn compare(lhs: &str, rhs: &str) -> bool {
    match (lhs.parse::<f64>(), rhs.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => lhs == rhs,
    }
}

fn operand(raw: &str, scope: &Scope) -> RenderResult<String> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(RenderError::Expression("empty expression".to_string()));
    }

    for quote in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return Ok(token[1..token.len() - 1].to_string());
        }
    }

    match token {
        "True" | "true" => return Ok("true".to_string()),
        "False" | "false" => return Ok("false".to_string()),
        _ => {}
    }

    if token.parse::<f64>().is_ok() {
        return Ok(token.to_string());
    }

    if token.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return scope.property(token).map(str::to_string);
    }

    Err(RenderError::Expression(format!(
        "cannot evaluate '{}'",
        token
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        let mut scope = Scope::default();
        scope.set_argument("target", "head");
        scope.set_property("width", "0.5");
        scope
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(substitute("no substitutions", &scope()).unwrap(), "no substitutions");
    }

    #[test]
    fn test_substitute_argument() {
        let result = substitute("link_$(arg target)_base", &scope()).unwrap();
        assert_eq!(result, "link_head_base");
    }

    #[test]
    fn test_substitute_property() {
        let result = substitute("size=\"${width} 1\"", &scope()).unwrap();
        assert_eq!(result, "size=\"0.5 1\"");
    }

    #[test]
    fn test_argument_inside_expression() {
        let matched = substitute("${'$(arg target)' == 'head'}", &scope()).unwrap();
        assert_eq!(matched, "true");

        let other = substitute("${'$(arg target)' != 'head'}", &scope()).unwrap();
        assert_eq!(other, "false");
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(substitute("${width == 0.50}", &scope()).unwrap(), "true");
    }

    #[test]
    fn test_undefined_argument() {
        let err = substitute("$(arg missing)", &scope()).unwrap_err();
        assert!(matches!(err, RenderError::UndefinedArgument(name) if name == "missing"));
    }

    #[test]
    fn test_undefined_property() {
        let err = substitute("${height}", &scope()).unwrap_err();
        assert!(matches!(err, RenderError::UndefinedProperty(name) if name == "height"));
    }

    #[test]
    fn test_unterminated_expression() {
        assert!(matches!(
            substitute("${width", &scope()),
            Err(RenderError::Expression(_))
        ));
    }

    #[test]
    fn test_unsupported_command() {
        assert!(matches!(
            substitute("$(find robot)", &scope()),
            Err(RenderError::Expression(_))
        ));
    }

    #[test]
    fn test_argument_value_is_not_rescanned() {
        let mut scope = scope();
        scope.set_argument("target", "x${y}");

        let result = substitute("link_$(arg target)", &scope).unwrap();
        assert_eq!(result, "link_x${y}");
    }

    #[test]
    fn test_argument_value_inside_expression_is_literal() {
        let mut scope = scope();
        scope.set_argument("target", "$(arg other)");

        let result = substitute("${'$(arg target)' == 'head'}", &scope).unwrap();
        assert_eq!(result, "false");
    }

    #[test]
    fn test_lone_dollar_is_kept() {
        assert_eq!(substitute("cost $5 ${width}", &scope()).unwrap(), "cost $5 0.5");
    }

    #[test]
    fn test_operator_inside_quotes_is_literal() {
        assert_eq!(substitute("${'a==b' == 'c'}", &scope()).unwrap(), "false");
        assert_eq!(substitute("${'a==b' == 'a==b'}", &scope()).unwrap(), "true");
        assert_eq!(substitute("${'x!=y' != 'x!=y'}", &scope()).unwrap(), "false");
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy("true").unwrap());
        assert!(is_truthy(" 1 ").unwrap());
        assert!(!is_truthy("False").unwrap());
        assert!(is_truthy("maybe").is_err());
    }
}
