use std::collections::BTreeMap;

/// One matcher in a path template. `Literal` requires an exact string
/// match; `Param` matches any single segment and binds it by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    pub fn lit(value: impl Into<String>) -> Self {
        Segment::Literal(value.into())
    }

    pub fn param(name: impl Into<String>) -> Self {
        Segment::Param(name.into())
    }

    fn matches(&self, part: &str) -> bool {
        match self {
            Segment::Literal(value) => value == part,
            Segment::Param(_) => true,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Segment::Literal(value) => value.clone(),
            Segment::Param(name) => format!(":{name}"),
        }
    }
}

/// Fixed-arity path template. Matching requires equal segment counts and
/// every segment matcher to accept its runtime counterpart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTemplate(Vec<Segment>);

impl PathTemplate {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Build from `&["users", ":id"]` style segment lists; a leading `:` marks a
    /// named parameter segment.
    pub fn from_parts(parts: &[&str]) -> Self {
        Self(
            parts
                .iter()
                .map(|part| match part.strip_prefix(':') {
                    Some(name) => Segment::param(name),
                    None => Segment::lit(*part),
                })
                .collect(),
        )
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Slash-joined display form, e.g. `users/:id`.
    pub fn name(&self) -> String {
        self.0
            .iter()
            .map(Segment::display)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn match_segments(&self, parts: &[&str]) -> Option<PathValues> {
        if parts.len() != self.0.len() {
            return None;
        }

        let mut named = BTreeMap::new();
        for (segment, part) in self.0.iter().zip(parts) {
            if !segment.matches(part) {
                return None;
            }
            if let Segment::Param(name) = segment {
                named.insert(name.clone(), (*part).to_string());
            }
        }

        Some(PathValues {
            segments: parts.iter().map(|part| (*part).to_string()).collect(),
            named,
        })
    }
}

/// Runtime path segments bound by a successful match. All segments are
/// available positionally; parameter segments also by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathValues {
    segments: Vec<String>,
    named: BTreeMap<String, String>,
}

impl PathValues {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_segments_require_exact_match() {
        let template = PathTemplate::from_parts(&["users", "all"]);
        assert!(template.match_segments(&["users", "all"]).is_some());
        assert!(template.match_segments(&["users", "42"]).is_none());
        assert!(template.match_segments(&["users"]).is_none());
        assert!(template.match_segments(&["users", "all", "x"]).is_none());
    }

    #[test]
    fn param_segment_binds_by_name_and_position() {
        let template = PathTemplate::from_parts(&["users", ":id"]);
        let values = template.match_segments(&["users", "42"]).expect("match");
        assert_eq!(values.get("id"), Some("42"));
        assert_eq!(values.segments(), ["users", "42"]);
    }

    #[test]
    fn template_name_marks_params() {
        let template = PathTemplate::from_parts(&["users", ":id"]);
        assert_eq!(template.name(), "users/:id");
    }
}
