use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::error::Error;

const PREFIX: &str = "${";
const OPTIONAL_PREFIX: &str = "${?";
const SUFFIX: char = '}';

/// A `${a.b.0}` reference from one node of a document to another.
///
/// Steps are matched against object keys, or parsed as indices when the node reached so far
/// is an array. `${?a.b}` marks an optional reference that resolves to `null` when the
/// target is missing.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Reference {
    expression: String,
    steps: Vec<String>,
    optional: bool,
}

impl Reference {
    /// Parses `value` as a reference. Strings that do not look like `${...}` are not
    /// references and yield `Ok(None)`.
    pub fn parse(value: &str) -> crate::Result<Option<Self>> {
        let (body, optional) = if let Some(rest) = value.strip_prefix(OPTIONAL_PREFIX) {
            (rest, true)
        } else if let Some(rest) = value.strip_prefix(PREFIX) {
            (rest, false)
        } else {
            return Ok(None);
        };
        let Some(expression) = body.strip_suffix(SUFFIX) else {
            return Ok(None);
        };
        let steps = Self::split_steps(expression)?;
        Ok(Some(Reference {
            expression: steps.join("."),
            steps,
            optional,
        }))
    }

    fn split_steps(expression: &str) -> crate::Result<Vec<String>> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPathExpression("path is empty"));
        }
        if trimmed.starts_with('.') {
            return Err(Error::InvalidPathExpression("leading period '.' not allowed"));
        }
        if trimmed.ends_with('.') {
            return Err(Error::InvalidPathExpression("trailing period '.' not allowed"));
        }
        let bytes = trimmed.as_bytes();
        let mut steps = vec![];
        let mut start = 0;
        for end in memchr::memchr_iter(b'.', bytes) {
            if end == start {
                return Err(Error::InvalidPathExpression("adjacent periods '..' not allowed"));
            }
            steps.push(Self::step(&trimmed[start..end])?);
            start = end + 1;
        }
        steps.push(Self::step(&trimmed[start..])?);
        Ok(steps)
    }

    fn step(raw: &str) -> crate::Result<String> {
        let step = raw.trim();
        if step.is_empty() {
            return Err(Error::InvalidPathExpression("blank path element not allowed"));
        }
        Ok(step.to_string())
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Finds the node this reference points at inside `document`.
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for step in &self.steps {
            current = match current {
                Value::Object(object) => object.get(step)?,
                Value::Array(array) => array.get(step.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.optional {
            write!(f, "{OPTIONAL_PREFIX}{}{SUFFIX}", self.expression)
        } else {
            write!(f, "{PREFIX}{}{SUFFIX}", self.expression)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Result;
    use crate::error::Error;
    use crate::reference::Reference;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("${a}", &["a"], false)]
    #[case("${a.b.c}", &["a", "b", "c"], false)]
    #[case("${ servers.0.host }", &["servers", "0", "host"], false)]
    #[case("${?a.b}", &["a", "b"], true)]
    #[case("${ a . b }", &["a", "b"], false)]
    #[case("${?servers . 0}", &["servers", "0"], true)]
    fn test_valid_reference(
        #[case] input: &str,
        #[case] steps: &[&str],
        #[case] optional: bool,
    ) -> Result<()> {
        let reference = Reference::parse(input)?.expect("should be a reference");
        assert_eq!(reference.steps(), steps);
        assert_eq!(reference.is_optional(), optional);
        assert_eq!(reference.to_string(), input.replace(' ', ""));
        Ok(())
    }

    #[rstest]
    #[case("plain")]
    #[case("$a")]
    #[case("${a")]
    #[case("prefix ${a}")]
    fn test_not_a_reference(#[case] input: &str) -> Result<()> {
        assert!(Reference::parse(input)?.is_none());
        Ok(())
    }

    #[rstest]
    #[case("${}")]
    #[case("${ }")]
    #[case("${.a}")]
    #[case("${a.}")]
    #[case("${a..b}")]
    #[case("${a. .b}")]
    #[case("${a .}")]
    fn test_invalid_reference(#[case] input: &str) {
        assert!(matches!(
            Reference::parse(input),
            Err(Error::InvalidPathExpression(_))
        ));
    }

    #[test]
    fn test_lookup() -> Result<()> {
        let document = json!({
            "servers": [{ "host": "a" }, { "host": "b" }],
            "0": "zero",
        });
        let host = Reference::parse("${servers.1.host}")?.unwrap();
        assert_eq!(host.lookup(&document), Some(&json!("b")));
        let key = Reference::parse("${0}")?.unwrap();
        assert_eq!(key.lookup(&document), Some(&json!("zero")));
        let spaced = Reference::parse("${ servers . 0 . host }")?.unwrap();
        assert_eq!(spaced.expression(), "servers.0.host");
        assert_eq!(spaced.lookup(&document), Some(&json!("a")));
        let missing = Reference::parse("${servers.2.host}")?.unwrap();
        assert_eq!(missing.lookup(&document), None);
        let through_scalar = Reference::parse("${0.length}")?.unwrap();
        assert_eq!(through_scalar.lookup(&document), None);
        Ok(())
    }
}
