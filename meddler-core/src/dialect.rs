use std::fmt::Write;

/// Quoting and placeholder conventions of a SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Identifier quote character.
    pub quote: char,
    /// Placeholder token. A `1` in it is replaced by the parameter position.
    pub placeholder: &'static str,
}

impl Dialect {
    pub const SQLITE: Dialect = Dialect {
        quote: '`',
        placeholder: "?",
    };
    pub const MYSQL: Dialect = Dialect {
        quote: '`',
        placeholder: "?",
    };
    pub const POSTGRES: Dialect = Dialect {
        quote: '"',
        placeholder: "$1",
    };

    pub fn write_quoted(&self, out: &mut String, identifier: &str) {
        out.push(self.quote);
        for c in identifier.chars() {
            if c == self.quote {
                out.push(c);
            }
            out.push(c);
        }
        out.push(self.quote);
    }

    /// Placeholder of the 1-based parameter `index`.
    pub fn write_placeholder(&self, out: &mut String, index: usize) {
        let mut parts = self.placeholder.splitn(2, '1');
        out.push_str(parts.next().unwrap_or_default());
        if let Some(rest) = parts.next() {
            let _ = write!(out, "{index}");
            out.push_str(rest);
        }
    }

    pub fn placeholder(&self, index: usize) -> String {
        let mut out = String::new();
        self.write_placeholder(&mut out, index);
        out
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::SQLITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote() {
        let mut out = String::new();
        Dialect::POSTGRES.write_quoted(&mut out, "name");
        out.push(',');
        Dialect::MYSQL.write_quoted(&mut out, "my`col");
        assert_eq!(out, r#""name",`my``col`"#);
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::SQLITE.placeholder(3), "?");
        assert_eq!(Dialect::POSTGRES.placeholder(3), "$3");
        let dialect = Dialect {
            placeholder: ":p1",
            ..Dialect::SQLITE
        };
        assert_eq!(dialect.placeholder(12), ":p12");
    }
}
