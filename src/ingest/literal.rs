//! Parser for the Python-literal strings found in the `genres` and
//! `belongs_to_collection` columns, e.g. `[{'id': 28, 'name': 'Action'}]`.
//!
//! Every entry point returns `Option`/empty values instead of errors: a cell
//! that cannot be parsed is treated as absent.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Looks up a string key in a dict literal.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Dict(entries) => entries.iter().find_map(|(k, v)| match k {
                Literal::Str(s) if s == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

pub fn parse(input: &str) -> Option<Literal> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    match parser.chars.peek() {
        None => Some(value),
        Some(_) => None,
    }
}

/// Genre names from a list of `{'name': ...}` dicts. Elements without a
/// string name are skipped; duplicates and blank names are dropped.
pub fn parse_genre_names(cell: &str) -> Vec<String> {
    let Some(Literal::List(items)) = parse(cell) else {
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::new();
    for item in &items {
        if let Some(name) = item.get("name").and_then(Literal::as_str) {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Collection name from a `{'name': ...}` dict; empty or unparsable is `None`.
pub fn parse_collection_name(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    let literal = parse(trimmed)?;
    let name = literal.get("name")?.as_str()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Containers nested deeper than this are rejected.
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn value(&mut self) -> Option<Literal> {
        self.skip_ws();
        match *self.chars.peek()? {
            '[' => self.nested(|p| p.sequence('[', ']').map(Literal::List)),
            '(' => self.nested(|p| p.sequence('(', ')').map(Literal::List)),
            '{' => self.nested(Self::dict),
            '\'' | '"' => self.string().map(Literal::Str),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() => self.word(),
            _ => None,
        }
    }

    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<Literal>) -> Option<Literal> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        self.skip_ws();
        if self.chars.next()? == expected {
            Some(())
        } else {
            None
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Option<Vec<Literal>> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.peek() == Some(&close) {
                self.chars.next();
                return Some(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.chars.next()? {
                ',' => continue,
                c if c == close => return Some(items),
                _ => return None,
            }
        }
    }

    fn dict(&mut self) -> Option<Literal> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.peek() == Some(&'}') {
                self.chars.next();
                return Some(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.expect(':')?;
            let value = self.value()?;
            entries.push((key, value));
            self.skip_ws();
            match self.chars.next()? {
                ',' => continue,
                '}' => return Some(Literal::Dict(entries)),
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'x' => out.push(self.hex_escape(2)?),
                    'u' => out.push(self.hex_escape(4)?),
                    other => out.push(other),
                },
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            code = code * 16 + self.chars.next()?.to_digit(16)?;
        }
        char::from_u32(code)
    }

    fn number(&mut self) -> Option<Literal> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        text.parse::<f64>().ok().map(Literal::Number)
    }

    fn word(&mut self) -> Option<Literal> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match text.as_str() {
            "None" => Some(Literal::None),
            "True" => Some(Literal::Bool(true)),
            "False" => Some(Literal::Bool(false)),
            "nan" => Some(Literal::Number(f64::NAN)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genres() {
        let cell = "[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]";
        assert_eq!(parse_genre_names(cell), vec!["Animation", "Comedy", "Family"]);
    }

    #[test]
    fn test_parse_genres_with_double_quotes_and_escapes() {
        let cell = r#"[{'id': 1, 'name': "Children's"}, {'id': 2, 'name': 'Rock \'n\' Roll'}]"#;
        assert_eq!(parse_genre_names(cell), vec!["Children's", "Rock 'n' Roll"]);
    }

    #[test]
    fn test_malformed_genres_are_empty() {
        assert!(parse_genre_names("").is_empty());
        assert!(parse_genre_names("[{'id': 16, 'name': 'Animation'}").is_empty());
        assert!(parse_genre_names("not a list").is_empty());
        assert!(parse_genre_names("{'name': 'Action'}").is_empty());
    }

    #[test]
    fn test_deeply_nested_cells_are_absent() {
        assert!(parse_genre_names(&"[".repeat(100_000)).is_empty());
        assert!(parse_genre_names(&format!("{}{}", "[".repeat(100_000), "]".repeat(100_000))).is_empty());
        assert_eq!(parse_collection_name(&"{'name': ".repeat(100_000)), None);

        let shallow = format!("{}1{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse(&shallow).is_some());
        let deep = format!("{}1{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), None);
    }

    #[test]
    fn test_genre_entries_without_name_are_skipped() {
        let cell = "[{'id': 1}, 'Drama', {'id': 2, 'name': 'Horror'}, {'name': 'Horror'}]";
        assert_eq!(parse_genre_names(cell), vec!["Horror"]);
    }

    #[test]
    fn test_parse_collection() {
        let cell = "{'id': 10194, 'name': 'Toy Story Collection', 'poster_path': '/7G9915LfUQ2lVfwMEEhDsn3kT4B.jpg', 'backdrop_path': None}";
        assert_eq!(parse_collection_name(cell), Some("Toy Story Collection".to_string()));
    }

    #[test]
    fn test_missing_collection() {
        assert_eq!(parse_collection_name(""), None);
        assert_eq!(parse_collection_name("NaN"), None);
        assert_eq!(parse_collection_name("{'id': 1, 'name': ''}"), None);
        assert_eq!(parse_collection_name("{'id': 1"), None);
        assert_eq!(parse_collection_name("0.065736"), None);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("None"), Some(Literal::None));
        assert_eq!(parse("True"), Some(Literal::Bool(true)));
        assert_eq!(parse("-1.5e2"), Some(Literal::Number(-150.0)));
        assert_eq!(parse("(1, 2)"), Some(Literal::List(vec![Literal::Number(1.0), Literal::Number(2.0)])));
        assert_eq!(parse("'\\x41'"), Some(Literal::Str("A".to_string())));
    }
}
