//! Path accessors for reading and writing values inside a mapping node.
//!
//! A path starts at the root `$` and is followed by any number of accessors:
//!
//! - `.name` for a field
//! - `["name"]` for a field whose name contains special characters, with
//!   `\"` standing for a literal quote
//! - `[0]` for an item of a list
//!
//! For example `$["cluster.v1"].config.endpoints[0]`.

use crate::error::{Error, Result};
use crate::mapping::{Fields, MappingNode, NodeContent};

/// Depth limit for callers that have no better value.
pub const DEFAULT_MAX_TRAVERSE_DEPTH: usize = 64;

/// A single step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathAccessor {
    Field(String),
    Index(usize),
}

/// A parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPath {
    accessors: Vec<PathAccessor>,
}

impl MappingPath {
    /// Parse a path such as `$.config["cluster.v1"].hosts[0]`.
    pub fn parse(path: &str) -> Result<Self> {
        let Some(rest) = path.strip_prefix('$') else {
            return Err(Error::InvalidMappingPath {
                path: path.to_string(),
                reason: None,
            });
        };

        let mut scanner = PathScanner::new(path);
        for ch in rest.chars() {
            scanner.consume(ch)?;
        }
        let accessors = scanner.finish()?;
        Ok(Self { accessors })
    }

    pub fn accessors(&self) -> &[PathAccessor] {
        &self.accessors
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// True for the bare root path `$`.
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl std::str::FromStr for MappingPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        MappingPath::parse(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// After the root or a closed bracket, expecting `.` or `[`.
    Accessor,
    FieldName,
    BracketOpen,
    Index,
    QuotedField,
    /// A quoted field name was closed, expecting `]`.
    QuotedFieldEnd,
}

struct PathScanner<'a> {
    path: &'a str,
    state: ScanState,
    current: String,
    prev_char: Option<char>,
    accessors: Vec<PathAccessor>,
}

impl<'a> PathScanner<'a> {
    fn new(path: &'a str) -> Self {
        Self {
            path,
            state: ScanState::Accessor,
            current: String::new(),
            prev_char: None,
            accessors: Vec::new(),
        }
    }

    fn consume(&mut self, ch: char) -> Result<()> {
        self.state = match (self.state, ch) {
            (ScanState::Accessor, '.') => ScanState::FieldName,
            (ScanState::Accessor, '[') => ScanState::BracketOpen,

            (ScanState::FieldName, '.') => {
                self.take_field()?;
                ScanState::FieldName
            }
            (ScanState::FieldName, '[') => {
                self.take_field()?;
                ScanState::BracketOpen
            }
            (ScanState::FieldName, _) => {
                self.current.push(ch);
                ScanState::FieldName
            }

            (ScanState::BracketOpen, '"') => ScanState::QuotedField,
            (ScanState::BracketOpen, digit) | (ScanState::Index, digit)
                if digit.is_ascii_digit() =>
            {
                self.current.push(digit);
                ScanState::Index
            }
            (ScanState::Index, ']') => {
                self.take_index()?;
                ScanState::Accessor
            }

            (ScanState::QuotedField, '"') if self.prev_char == Some('\\') => {
                self.current.pop();
                self.current.push('"');
                ScanState::QuotedField
            }
            (ScanState::QuotedField, '"') => {
                let name = std::mem::take(&mut self.current);
                self.accessors.push(PathAccessor::Field(name));
                ScanState::QuotedFieldEnd
            }
            (ScanState::QuotedField, _) => {
                self.current.push(ch);
                ScanState::QuotedField
            }
            (ScanState::QuotedFieldEnd, ']') => ScanState::Accessor,

            (_, unexpected) => {
                return Err(Error::invalid_path(
                    self.path,
                    format!("unexpected character '{}'", unexpected),
                ));
            }
        };
        // An escaped quote must not escape the character after it.
        self.prev_char = if self.state == ScanState::QuotedField && ch == '"' {
            None
        } else {
            Some(ch)
        };
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<PathAccessor>> {
        match self.state {
            ScanState::Accessor => {}
            ScanState::FieldName => self.take_field()?,
            ScanState::BracketOpen
            | ScanState::Index
            | ScanState::QuotedField
            | ScanState::QuotedFieldEnd => {
                return Err(Error::invalid_path(self.path, "unclosed bracket"));
            }
        }
        Ok(self.accessors)
    }

    fn take_field(&mut self) -> Result<()> {
        if self.current.is_empty() {
            return Err(Error::invalid_path(self.path, "empty field name"));
        }
        let name = std::mem::take(&mut self.current);
        self.accessors.push(PathAccessor::Field(name));
        Ok(())
    }

    fn take_index(&mut self) -> Result<()> {
        let digits = std::mem::take(&mut self.current);
        let index = digits.parse::<usize>().map_err(|err| {
            Error::invalid_path(self.path, format!("invalid index \"{}\": {}", digits, err))
        })?;
        self.accessors.push(PathAccessor::Index(index));
        Ok(())
    }
}

/// Read the value at `path` in `node`.
///
/// Returns `Ok(None)` when the path does not exist in the node, when a
/// step does not fit the shape of the node (such as an index into a map),
/// when the value found is nil, and when the path has more accessors than
/// `max_depth`. Only a malformed path is an error.
///
/// ```rust
/// use blueprint_core::{get_path_value, yaml};
///
/// let node = yaml::decode("config:\n  hosts:\n    - api.example.com").unwrap();
/// let host = get_path_value("$.config.hosts[0]", &node, 10).unwrap().unwrap();
/// assert_eq!(host.as_scalar().unwrap().as_str(), Some("api.example.com"));
/// ```
pub fn get_path_value<'a>(
    path: &str,
    node: &'a MappingNode,
    max_depth: usize,
) -> Result<Option<&'a MappingNode>> {
    let parsed = MappingPath::parse(path)?;
    if parsed.len() > max_depth {
        tracing::trace!(path, max_depth, "path is deeper than the traversal limit");
        return Ok(None);
    }

    let mut current = node;
    for accessor in parsed.accessors() {
        let next = match accessor {
            PathAccessor::Field(name) => current.get_field(name),
            PathAccessor::Index(index) => current.get_item(*index),
        };
        match next {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    if current.is_nil() {
        return Ok(None);
    }
    Ok(Some(current))
}

/// Write `value` at `path` inside `root`.
///
/// Missing fields are created, and so is the item one past the end of a
/// list. Nil nodes on the way become a map or a list depending on the
/// accessor that follows. The mutation happens in place.
///
/// Fails with `MappingPathNotInjectable` when a step does not fit the shape
/// of the node or an index would leave a gap in a list, and with
/// `MappingPathMaxDepthExceeded` when the path has more accessors than
/// `max_depth`. The tree is left untouched when injection fails.
pub fn inject_path_value(
    path: &str,
    value: MappingNode,
    root: &mut MappingNode,
    max_depth: usize,
) -> Result<()> {
    let parsed = MappingPath::parse(path)?;
    if parsed.len() > max_depth {
        return Err(Error::MappingPathMaxDepthExceeded {
            path: path.to_string(),
            max_depth,
        });
    }
    tracing::debug!(path, depth = parsed.len(), "injecting value");

    if !can_inject(root, parsed.accessors()) {
        return Err(Error::MappingPathNotInjectable {
            path: path.to_string(),
        });
    }

    let mut current = root;
    for accessor in parsed.accessors() {
        current = match child_or_insert(current, accessor) {
            Some(child) => child,
            None => {
                return Err(Error::MappingPathNotInjectable {
                    path: path.to_string(),
                });
            }
        };
    }
    *current = value;
    Ok(())
}

/// Walk `accessors` without changing the tree and report whether every
/// step either exists or can be created.
fn can_inject(root: &MappingNode, accessors: &[PathAccessor]) -> bool {
    let mut current = Some(root).filter(|node| !node.is_nil());
    for accessor in accessors {
        current = match (current, accessor) {
            (None, PathAccessor::Field(_)) => None,
            // Only the first item of a list created on the way can be written.
            (None, PathAccessor::Index(index)) => {
                if *index != 0 {
                    return false;
                }
                None
            }
            (Some(node), PathAccessor::Field(name)) => match node.as_fields() {
                Some(fields) => fields.get(name),
                None => return false,
            },
            (Some(node), PathAccessor::Index(index)) => match node.as_items() {
                Some(items) if *index <= items.len() => items.get(*index),
                _ => return false,
            },
        }
        .filter(|node| !node.is_nil());
    }
    true
}

fn child_or_insert<'a>(
    node: &'a mut MappingNode,
    accessor: &PathAccessor,
) -> Option<&'a mut MappingNode> {
    if node.is_nil() {
        node.content = match accessor {
            PathAccessor::Field(_) => NodeContent::Fields(Fields::new()),
            PathAccessor::Index(_) => NodeContent::Items(Vec::new()),
        };
    }

    match (accessor, &mut node.content) {
        (PathAccessor::Field(name), NodeContent::Fields(fields)) => {
            Some(fields.entry(name.clone()).or_default())
        }
        (PathAccessor::Index(index), NodeContent::Items(items)) => {
            if *index == items.len() {
                items.push(MappingNode::nil());
            }
            items.get_mut(*index)
        }
        _ => None,
    }
}
