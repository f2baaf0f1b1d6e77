//! Splitting of strings into literal and `${..}` placeholder segments.

use crate::error::{Result, SubstitutionError, SubstitutionIssue};
use crate::types::{StringOrSubstitution, Substitution};
use blueprint_source_map::{Position, SourceMeta};

/// Options that control how segment positions are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach source positions to every segment.
    pub output_line_info: bool,
    /// Columns are relative to the start of each line of the value rather
    /// than offset by the column the value starts at. Used for YAML block
    /// scalars whose content column is not known precisely.
    pub ignore_parent_column: bool,
    /// Characters between the reported start of the value and its first
    /// content character (e.g. 1 for an opening quote).
    pub preceding_char_count: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            output_line_info: false,
            ignore_parent_column: false,
            preceding_char_count: 0,
        }
    }
}

/// A parser that splits raw string values into literal and placeholder segments.
///
/// An empty result or a single literal segment tells the caller that the
/// value holds no placeholders and can be treated as a plain scalar.
pub trait SubstitutionParser {
    fn parse(
        &self,
        context: &str,
        value: &str,
        start: Option<&SourceMeta>,
        options: ParseOptions,
    ) -> Result<Vec<StringOrSubstitution>>;
}

/// The default `${..}` splitter.
///
/// Placeholder expressions are kept as raw text. Double-quoted string literals
/// inside a placeholder may contain `}` without closing it. An opening `${`
/// that is never closed is kept as literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolationParser;

impl SubstitutionParser for InterpolationParser {
    fn parse(
        &self,
        context: &str,
        value: &str,
        start: Option<&SourceMeta>,
        options: ParseOptions,
    ) -> Result<Vec<StringOrSubstitution>> {
        parse_substitution_values(context, value, start, options)
    }
}

/// Split `value` into literal text and `${..}` placeholders.
pub fn parse_substitution_values(
    context: &str,
    value: &str,
    start: Option<&SourceMeta>,
    options: ParseOptions,
) -> Result<Vec<StringOrSubstitution>> {
    if !value.contains("${") {
        return Ok(vec![StringOrSubstitution::StringValue {
            value: value.to_string(),
            source_meta: start.cloned(),
        }]);
    }

    let mut state = SplitState::new(start, options);
    for ch in value.chars() {
        state.consume(ch);
    }
    state.finish();

    if !state.issues.is_empty() {
        return Err(SubstitutionError {
            context: context.to_string(),
            issues: state.issues,
            position: start.map(|meta| meta.position),
        });
    }

    tracing::trace!(
        context,
        segments = state.parsed.len(),
        "split string into substitution segments"
    );
    Ok(state.parsed)
}

/// Position relative to the start of the value (0-based line and column).
#[derive(Debug, Clone, Copy, Default)]
struct RelativePosition {
    line: usize,
    column: usize,
}

struct SplitState<'a> {
    start: Option<&'a SourceMeta>,
    options: ParseOptions,
    parsed: Vec<StringOrSubstitution>,
    issues: Vec<SubstitutionIssue>,
    literal: String,
    literal_start: RelativePosition,
    literal_end: RelativePosition,
    in_substitution: bool,
    in_string_literal: bool,
    expression: String,
    substitution_start: RelativePosition,
    current: RelativePosition,
    prev_char: Option<char>,
}

impl<'a> SplitState<'a> {
    fn new(start: Option<&'a SourceMeta>, options: ParseOptions) -> Self {
        Self {
            start,
            options,
            parsed: Vec::new(),
            issues: Vec::new(),
            literal: String::new(),
            literal_start: RelativePosition::default(),
            literal_end: RelativePosition::default(),
            in_substitution: false,
            in_string_literal: false,
            expression: String::new(),
            substitution_start: RelativePosition::default(),
            current: RelativePosition::default(),
            prev_char: None,
        }
    }

    fn consume(&mut self, ch: char) {
        if self.in_substitution {
            self.consume_in_substitution(ch);
        } else if ch == '{' && self.prev_char == Some('$') {
            // The "$" was taken as literal text on the previous character.
            // Preceding text is only flushed once the placeholder closes.
            self.literal.pop();
            self.literal_end = self.previous_column();
            self.in_substitution = true;
            self.in_string_literal = false;
            self.expression.clear();
            self.substitution_start = self.previous_column();
        } else {
            if self.literal.is_empty() {
                self.literal_start = self.current;
            }
            self.literal.push(ch);
        }

        self.prev_char = Some(ch);
        self.advance(ch);
    }

    fn consume_in_substitution(&mut self, ch: char) {
        if ch == '"' && self.prev_char != Some('\\') {
            self.in_string_literal = !self.in_string_literal;
        }

        if ch == '}' && !self.in_string_literal {
            self.close_substitution();
            return;
        }
        self.expression.push(ch);
    }

    fn close_substitution(&mut self) {
        let expression_start = RelativePosition {
            line: self.substitution_start.line,
            column: self.substitution_start.column + 2,
        };
        let expression = std::mem::take(&mut self.expression);
        self.flush_literal(self.literal_end);

        if expression.trim().is_empty() {
            self.issues.push(SubstitutionIssue::Empty {
                position: self.absolute(self.substitution_start),
            });
        } else if expression.contains("${") {
            self.issues.push(SubstitutionIssue::Nested {
                position: self.absolute(self.substitution_start),
                expression,
            });
        } else {
            let after_close = RelativePosition {
                line: self.current.line,
                column: self.current.column + 1,
            };
            let substitution = Substitution {
                expression,
                source_meta: self.meta(expression_start, self.current),
            };
            self.parsed.push(StringOrSubstitution::SubstitutionValue {
                substitution,
                source_meta: self.meta(self.substitution_start, after_close),
            });
        }

        self.in_substitution = false;
        self.in_string_literal = false;
    }

    fn finish(&mut self) {
        if self.in_substitution {
            // Unterminated placeholder, keep the raw text as a literal.
            if self.literal.is_empty() {
                self.literal_start = self.substitution_start;
            }
            self.literal.push_str("${");
            let expression = std::mem::take(&mut self.expression);
            self.literal.push_str(&expression);
            self.in_substitution = false;
        }
        self.flush_literal(self.current);
    }

    fn flush_literal(&mut self, end: RelativePosition) {
        if self.literal.is_empty() {
            return;
        }
        let value = std::mem::take(&mut self.literal);
        self.parsed.push(StringOrSubstitution::StringValue {
            source_meta: self.meta(self.literal_start, end),
            value,
        });
    }

    fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.current.line += 1;
            self.current.column = 0;
        } else {
            self.current.column += 1;
        }
    }

    fn previous_column(&self) -> RelativePosition {
        RelativePosition {
            line: self.current.line,
            column: self.current.column.saturating_sub(1),
        }
    }

    fn meta(&self, start: RelativePosition, end: RelativePosition) -> Option<SourceMeta> {
        if !self.options.output_line_info {
            return None;
        }
        Some(SourceMeta::span(
            self.absolute_position(start),
            self.absolute_position(end),
        ))
    }

    fn absolute(&self, relative: RelativePosition) -> Option<Position> {
        self.start.map(|_| self.absolute_position(relative))
    }

    fn absolute_position(&self, relative: RelativePosition) -> Position {
        let parent = self
            .start
            .map(|meta| meta.position)
            .unwrap_or_else(Position::start);

        let column = if self.options.ignore_parent_column || relative.line > 0 {
            relative.column + 1
        } else {
            parent.column + self.options.preceding_char_count + relative.column
        };
        Position::new(parent.line + relative.line, column)
    }
}
