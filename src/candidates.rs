use std::collections::HashSet;
use std::io::BufRead;

use regex::Regex;
use simple_error::SimpleError;
use tracing::{debug, trace};

use crate::types::*;

///Printf-style format directives: `%%`, `%d`, `%-5s`, `%[1]v`, `%(name)s`, `%.2f`, ...
const PLACEHOLDER_PATTERN: &str = r"%(?:%|(?:[1-9]\d*\$|\([^)]+\)|\[\d+\])?\+? ?#?(?:0|'[^$])?-?\d*(?:\.\d+)?[vT%bcdoqxXUeEfFgGsp])";

///Literals up to this many characters that contain a format directive are considered placeholders
pub const PLACEHOLDER_MAX_LENGTH: usize = 5;

/// Decides which extracted literals become candidates.
///
/// Empty literals never pass. Short literals containing a format directive (`"%d"`, `"%-5s"`)
/// are rejected unless placeholders are kept. Only the first occurrence of a literal passes.
#[derive(Debug,Clone)]
pub struct CandidateFilter {
    placeholder: Option<Regex>,
    seen: HashSet<String>,
}

impl CandidateFilter {
    pub fn new() -> Result<Self, SimpleError> {
        let placeholder = Regex::new(PLACEHOLDER_PATTERN).map_err(|e| SimpleError::with("invalid placeholder pattern", e))?;
        Ok(Self {
            placeholder: Some(placeholder),
            seen: HashSet::new(),
        })
    }

    ///A filter that lets format placeholders through
    pub fn keep_placeholders() -> Self {
        Self {
            placeholder: None,
            seen: HashSet::new(),
        }
    }

    pub fn is_placeholder(&self, literal: &str) -> bool {
        match &self.placeholder {
            Some(regex) => literal.chars().count() <= PLACEHOLDER_MAX_LENGTH && regex.is_match(literal),
            None => false,
        }
    }

    /// Returns true if the literal should be indexed and queried
    pub fn accept(&mut self, literal: &str) -> bool {
        if literal.is_empty() {
            return false;
        }
        if self.is_placeholder(literal) {
            trace!("skipping format placeholder {:?}", literal);
            return false;
        }
        if self.seen.contains(literal) {
            return false;
        }
        self.seen.insert(literal.to_string());
        true
    }
}

///Parses `file:line:column`, `file:line` or just `file`. The file part may contain colons itself.
pub fn parse_position(s: &str) -> SourcePosition {
    let mut fields = s.rsplitn(3, ':');
    let last = fields.next().unwrap_or("");
    let middle = fields.next();
    let first = fields.next();
    match (first, middle.map(|m| m.parse::<u32>()), last.parse::<u32>()) {
        (Some(file), Some(Ok(line)), Ok(column)) => SourcePosition::new(file, line, column),
        (_, Some(_), Ok(line)) => {
            //only the last field is numeric
            let file = &s[..s.len() - last.len() - 1];
            SourcePosition::new(file, line, 0)
        }
        _ => SourcePosition::new(s, 0, 0),
    }
}

///Decodes the escapes `\t`, `\n`, `\r` and `\\` in a literal
pub fn unescape(s: &str) -> Result<String, SimpleError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some(other) => return Err(SimpleError::new(format!("unknown escape sequence \\{}", other))),
            None => return Err(SimpleError::new("dangling backslash")),
        }
    }
    Ok(result)
}

/// Read a candidate list: one `literal<TAB>position` record per line (the position is optional).
/// Blank lines and lines starting with `#` are skipped, the filter decides what is kept.
pub fn read_candidates(reader: impl BufRead, filter: &mut CandidateFilter) -> Result<Vec<(String, SourcePosition)>, SimpleError> {
    let mut candidates = Vec::new();
    let mut rejected = 0;
    for (i, line) in reader.lines().enumerate() {
        let linenr = i + 1;
        let line = line.map_err(|e| SimpleError::with(&format!("unable to read line {}", linenr), e))?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() > 2 {
            return Err(SimpleError::new(format!("line {}: expected at most 2 tab-separated fields, got {}", linenr, fields.len())));
        }
        let literal = unescape(fields[0]).map_err(|e| SimpleError::new(format!("line {}: {}", linenr, e)))?;
        let position = match fields.get(1) {
            Some(position) if !position.is_empty() => parse_position(position),
            _ => SourcePosition::unknown(),
        };
        if filter.accept(&literal) {
            candidates.push((literal, position));
        } else {
            rejected += 1;
        }
    }
    debug!("read {} candidates ({} rejected by filter)", candidates.len(), rejected);
    Ok(candidates)
}
