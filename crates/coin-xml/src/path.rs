//! Element paths.
//!
//! A path is a list of `(type, index)` steps from an ancestor down to an
//! element. The index counts only siblings of the same type; `None` matches
//! any of them. In text form steps are separated by `/` and an index is
//! written in brackets: `scene/node[2]/name`.

use std::fmt;
use std::str::FromStr;

use crate::error::XmlError;

/// One step of an [`XmlPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Element type.
    pub element_type: String,
    /// Index among same-typed siblings, or `None` for any.
    pub index: Option<usize>,
}

/// Sequence of steps, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct XmlPath {
    steps: Vec<PathStep>,
}

impl XmlPath {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of types with no index constraints.
    pub fn from_types<S: AsRef<str>>(types: &[S]) -> Self {
        Self {
            steps: types
                .iter()
                .map(|t| PathStep {
                    element_type: t.as_ref().to_string(),
                    index: None,
                })
                .collect(),
        }
    }

    /// Append a step.
    pub fn push(&mut self, element_type: &str, index: Option<usize>) {
        self.steps.push(PathStep {
            element_type: element_type.to_string(),
            index,
        });
    }

    /// Insert a step at the front.
    pub fn prepend(&mut self, element_type: &str, index: Option<usize>) {
        self.steps.insert(
            0,
            PathStep {
                element_type: element_type.to_string(),
                index,
            },
        );
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps, outermost first.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

impl fmt::Display for XmlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&step.element_type)?;
            if let Some(index) = step.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

impl FromStr for XmlPath {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut path = Self::new();
        for part in s.split('/').filter(|part| !part.is_empty()) {
            let (name, index) = match part.split_once('[') {
                Some((name, rest)) => {
                    let digits = rest
                        .strip_suffix(']')
                        .ok_or_else(|| XmlError::InvalidPath(s.to_string()))?;
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| XmlError::InvalidPath(s.to_string()))?;
                    (name, Some(index))
                }
                None => (part, None),
            };
            if name.is_empty() {
                return Err(XmlError::InvalidPath(s.to_string()));
            }
            path.push(name, index);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path: XmlPath = "scene/node[2]/name".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.steps()[1].index, Some(2));
        assert_eq!(path.steps()[2].index, None);
        assert_eq!(path.to_string(), "scene/node[2]/name");
    }

    #[test]
    fn test_invalid_paths() {
        assert!("a[x]".parse::<XmlPath>().is_err());
        assert!("a[1".parse::<XmlPath>().is_err());
        assert!("[1]".parse::<XmlPath>().is_err());
    }

    #[test]
    fn test_prepend() {
        let mut path = XmlPath::from_types(&["b"]);
        path.prepend("a", Some(0));
        assert_eq!(path.to_string(), "a[0]/b");
    }
}
