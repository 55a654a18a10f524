//! Recursive-descent parser producing the pattern syntax tree.

use std::collections::HashMap;

use crate::errors::GenerationError;
use crate::xeger::Category;

/// One node of the parsed pattern. A whole pattern is a `Vec<Node>`
/// concatenation.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(char),
    /// Any printable character except the given one (`[^x]`).
    NotLiteral(char),
    /// `.`: any printable character except newline.
    Any,
    /// Bracketed class; `negated` complements the items against the
    /// printable alphabet.
    Class {
        negated: bool,
        items: Vec<ClassItem>,
    },
    Category(Category),
    /// Parenthesized group; `index` is set for capturing groups so
    /// backreferences can replay the realized text.
    Group {
        index: Option<usize>,
        body: Vec<Node>,
    },
    Alternation(Vec<Vec<Node>>),
    /// Lookahead/lookbehind. Positive assertions contribute their body as
    /// plain text during synthesis; negative ones contribute nothing.
    Assertion {
        negative: bool,
        body: Vec<Node>,
    },
    Backref(usize),
    Repeat {
        min: u32,
        max: Option<u32>,
        node: Box<Node>,
    },
    /// Zero-width position marker (`^`, `$`, `\b`, ...).
    Anchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Category(Category),
}

/// Parse `pattern` into its syntax tree.
pub fn parse(pattern: &str) -> Result<Vec<Node>, GenerationError> {
    let mut parser = Parser {
        pattern,
        chars: pattern.chars().collect(),
        pos: 0,
        groups: 0,
        names: HashMap::new(),
    };
    let nodes = parser.alternation()?;
    if parser.pos != parser.chars.len() {
        return Err(parser.error("unbalanced parenthesis"));
    }
    Ok(nodes)
}

struct Parser<'a> {
    pattern: &'a str,
    chars: Vec<char>,
    pos: usize,
    groups: usize,
    names: HashMap<String, usize>,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> GenerationError {
        GenerationError::InvalidPattern {
            pattern: self.pattern.to_string(),
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn alternation(&mut self) -> Result<Vec<Node>, GenerationError> {
        let mut branches = vec![self.sequence()?];
        while self.eat('|') {
            branches.push(self.sequence()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap_or_default())
        } else {
            Ok(vec![Node::Alternation(branches)])
        }
    }

    fn sequence(&mut self) -> Result<Vec<Node>, GenerationError> {
        let mut nodes = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let atom = self.atom()?;
            nodes.push(self.quantified(atom)?);
        }
        Ok(nodes)
    }

    fn atom(&mut self) -> Result<Node, GenerationError> {
        match self.bump() {
            Some('(') => self.group(),
            Some('[') => self.class(),
            Some('.') => Ok(Node::Any),
            Some('^') | Some('$') => Ok(Node::Anchor),
            Some('\\') => self.escape(),
            Some('*' | '+' | '?') => Err(self.error("nothing to repeat")),
            Some(c) => Ok(Node::Literal(c)),
            None => Err(self.error("unexpected end of pattern")),
        }
    }

    fn quantified(&mut self, atom: Node) -> Result<Node, GenerationError> {
        let (min, max) = match self.peek() {
            Some('*') => {
                self.pos += 1;
                (0, None)
            }
            Some('+') => {
                self.pos += 1;
                (1, None)
            }
            Some('?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some('{') => match self.braced_quantifier() {
                Some(bounds) => bounds,
                // `{` that is not a well-formed quantifier is a literal.
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };
        // A trailing '?' marks a lazy quantifier; synthesis does not
        // distinguish greediness.
        self.eat('?');
        Ok(Node::Repeat {
            min,
            max,
            node: Box::new(atom),
        })
    }

    fn braced_quantifier(&mut self) -> Option<(u32, Option<u32>)> {
        let start = self.pos;
        self.pos += 1; // '{'
        let min = self.digits()?;
        let bounds = if self.eat('}') {
            Some((min, Some(min)))
        } else if self.eat(',') {
            if self.eat('}') {
                Some((min, None))
            } else {
                let max = self.digits()?;
                self.eat('}').then_some((min, Some(max)))
            }
        } else {
            None
        };
        if bounds.is_none() {
            self.pos = start;
        }
        bounds
    }

    fn digits(&mut self) -> Option<u32> {
        let mut value: u32 = 0;
        let mut seen = false;
        while let Some(c) = self.peek() {
            let Some(digit) = c.to_digit(10) else { break };
            value = value.saturating_mul(10).saturating_add(digit);
            seen = true;
            self.pos += 1;
        }
        seen.then_some(value)
    }

    fn group(&mut self) -> Result<Node, GenerationError> {
        let node = if self.eat('?') {
            match self.bump() {
                Some(':') => Node::Group {
                    index: None,
                    body: self.alternation()?,
                },
                Some('=') => Node::Assertion {
                    negative: false,
                    body: self.alternation()?,
                },
                Some('!') => Node::Assertion {
                    negative: true,
                    body: self.alternation()?,
                },
                Some('<') => match self.bump() {
                    Some('=') => Node::Assertion {
                        negative: false,
                        body: self.alternation()?,
                    },
                    Some('!') => Node::Assertion {
                        negative: true,
                        body: self.alternation()?,
                    },
                    _ => return Err(self.error("unknown group extension '(?<'")),
                },
                Some('P') => {
                    if self.eat('<') {
                        let name = self.name_until('>')?;
                        self.groups += 1;
                        let index = self.groups;
                        self.names.insert(name, index);
                        Node::Group {
                            index: Some(index),
                            body: self.alternation()?,
                        }
                    } else if self.eat('=') {
                        let name = self.name_until(')')?;
                        let index = *self
                            .names
                            .get(&name)
                            .ok_or_else(|| self.error("backreference to unknown group"))?;
                        // name_until consumed the ')'.
                        return Ok(Node::Backref(index));
                    } else {
                        return Err(self.error("unknown group extension '(?P'"));
                    }
                }
                _ => return Err(self.error("unknown group extension")),
            }
        } else {
            self.groups += 1;
            let index = self.groups;
            Node::Group {
                index: Some(index),
                body: self.alternation()?,
            }
        };
        if !self.eat(')') {
            return Err(self.error("missing closing parenthesis"));
        }
        Ok(node)
    }

    fn name_until(&mut self, terminator: char) -> Result<String, GenerationError> {
        let mut name = String::new();
        loop {
            match self.bump() {
                Some(c) if c == terminator => break,
                Some(c) => name.push(c),
                None => return Err(self.error("unterminated group name")),
            }
        }
        if name.is_empty() {
            return Err(self.error("empty group name"));
        }
        Ok(name)
    }

    fn class(&mut self) -> Result<Node, GenerationError> {
        let negated = self.eat('^');
        let mut items = Vec::new();
        let mut first = true;
        loop {
            let c = match self.peek() {
                Some(']') if !first => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    self.pos += 1;
                    c
                }
                None => return Err(self.error("unterminated character class")),
            };
            first = false;
            let item = if c == '\\' {
                self.class_escape()?
            } else {
                ClassItem::Char(c)
            };
            // Range: char '-' char, unless '-' closes the class.
            if let ClassItem::Char(lo) = item {
                if self.peek() == Some('-') && self.peek_at(1) != Some(']') && self.peek_at(1).is_some()
                {
                    self.pos += 1; // '-'
                    let hi = match self.bump() {
                        Some('\\') => match self.class_escape()? {
                            ClassItem::Char(c) => c,
                            _ => return Err(self.error("bad character range")),
                        },
                        Some(c) => c,
                        None => return Err(self.error("unterminated character class")),
                    };
                    if lo > hi {
                        return Err(self.error("bad character range"));
                    }
                    items.push(ClassItem::Range(lo, hi));
                    continue;
                }
            }
            items.push(item);
        }
        // Collapse the common single-character negation to its own form.
        if negated && items.len() == 1 {
            if let ClassItem::Char(c) = items[0] {
                return Ok(Node::NotLiteral(c));
            }
        }
        Ok(Node::Class { negated, items })
    }

    fn class_escape(&mut self) -> Result<ClassItem, GenerationError> {
        match self.bump() {
            Some('d') => Ok(ClassItem::Category(Category::Digit)),
            Some('D') => Ok(ClassItem::Category(Category::NotDigit)),
            Some('s') => Ok(ClassItem::Category(Category::Space)),
            Some('S') => Ok(ClassItem::Category(Category::NotSpace)),
            Some('w') => Ok(ClassItem::Category(Category::Word)),
            Some('W') => Ok(ClassItem::Category(Category::NotWord)),
            Some(c) => Ok(ClassItem::Char(control_char(c, true))),
            None => Err(self.error("trailing backslash")),
        }
    }

    fn escape(&mut self) -> Result<Node, GenerationError> {
        match self.bump() {
            Some('d') => Ok(Node::Category(Category::Digit)),
            Some('D') => Ok(Node::Category(Category::NotDigit)),
            Some('s') => Ok(Node::Category(Category::Space)),
            Some('S') => Ok(Node::Category(Category::NotSpace)),
            Some('w') => Ok(Node::Category(Category::Word)),
            Some('W') => Ok(Node::Category(Category::NotWord)),
            Some('b') | Some('B') | Some('A') | Some('Z') => Ok(Node::Anchor),
            Some('x') => {
                let hi = self.bump().and_then(|c| c.to_digit(16));
                let lo = self.bump().and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        let code = hi * 16 + lo;
                        Ok(Node::Literal(char::from_u32(code).unwrap_or('\u{0}')))
                    }
                    _ => Err(self.error("invalid \\x escape")),
                }
            }
            Some(c) if c.is_ascii_digit() && c != '0' => {
                Ok(Node::Backref(c.to_digit(10).unwrap_or(0) as usize))
            }
            Some(c) => Ok(Node::Literal(control_char(c, false))),
            None => Err(self.error("trailing backslash")),
        }
    }
}

fn control_char(c: char, in_class: bool) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\x0c',
        'v' => '\x0b',
        '0' => '\0',
        'a' => '\x07',
        // Inside a class, \b is the backspace character.
        'b' if in_class => '\x08',
        other => other,
    }
}
