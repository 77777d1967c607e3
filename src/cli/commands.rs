use std::str::FromStr;

use sqlparser::{
    dialect::GenericDialect,
    tokenizer::{Token, Tokenizer},
};

use crate::{
    core::{strip_quotes, DbError},
    table::Clause,
};

/// Commands accepted by the console, one per input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create_table <table> <column:type> ...`
    CreateTable { name: String, columns: Vec<String> },
    /// `drop_table <table>`
    DropTable { name: String },
    /// `list_tables`
    ListTables,
    /// `info <table>`
    Info { name: String },
    /// `insert into <table> values (<value>, ...)`
    Insert { table: String, values: Vec<String> },
    /// `select from <table> [where <column> = <value>]`
    Select {
        table: String,
        filter: Option<Clause>,
    },
    /// `update <table> set <column> = <value>[, ...] where <column> = <value>`
    Update {
        table: String,
        set: Vec<Clause>,
        filter: Clause,
    },
    /// `delete from <table> where <column> = <value>`
    Delete { table: String, filter: Clause },
    Help,
    Exit,
}

impl Command {
    /// Whether the command rewrites a document.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::CreateTable { .. }
                | Command::DropTable { .. }
                | Command::Insert { .. }
                | Command::Update { .. }
                | Command::Delete { .. }
        )
    }
}

impl FromStr for Command {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = Tokenizer::new(&GenericDialect {}, s)
            .tokenize()
            .map_err(|e| DbError::syntax(e.to_string()))?;

        CommandParser::new(tokens).parse_command()
    }
}

struct CommandParser {
    /// Raw tokens, whitespace included.
    raw: Vec<Token>,
    /// Tokens without whitespace.
    tokens: Vec<Token>,
    index: usize,
}

impl CommandParser {
    fn new(raw: Vec<Token>) -> Self {
        let tokens = raw
            .iter()
            .filter(|token| !matches!(token, Token::Whitespace(_) | Token::EOF))
            .cloned()
            .collect();

        Self {
            raw,
            tokens,
            index: 0,
        }
    }

    fn parse_command(&mut self) -> Result<Command, DbError> {
        let keyword = match self.next_token() {
            Some(Token::Word(word)) if word.quote_style.is_none() => word.value.to_lowercase(),
            Some(token) => return Err(DbError::syntax(format!("unknown command \"{}\"", token))),
            None => return Err(DbError::syntax("empty command")),
        };

        let command = match keyword.as_str() {
            "create_table" => self.parse_create_table()?,
            "drop_table" => Command::DropTable {
                name: self.parse_identifier("table name")?,
            },
            "list_tables" => Command::ListTables,
            "info" => Command::Info {
                name: self.parse_identifier("table name")?,
            },
            "insert" => self.parse_insert()?,
            "select" => self.parse_select()?,
            "update" => self.parse_update()?,
            "delete" => self.parse_delete()?,
            "help" => Command::Help,
            "exit" => Command::Exit,
            _ => return Err(DbError::syntax(format!("unknown command \"{}\"", keyword))),
        };

        self.expect_end()?;
        Ok(command)
    }

    /// The table name must be a single word, read the same way as in every
    /// other command. Column specs are taken as whitespace separated groups
    /// so that `name:str` reaches the catalog as one string.
    fn parse_create_table(&mut self) -> Result<Command, DbError> {
        let mut groups = self.whitespace_groups().into_iter().skip(1);
        let name = match groups.next().as_deref() {
            Some([Token::Word(word)]) => word.value.clone(),
            Some(group) => {
                return Err(DbError::syntax(format!(
                    "invalid table name \"{}\"",
                    group_text(group)
                )))
            }
            None => return Err(DbError::syntax("usage: create_table <table> <column:type> ...")),
        };
        let columns = groups.map(|group| group_text(&group)).collect();

        self.index = self.tokens.len();
        Ok(Command::CreateTable { name, columns })
    }

    fn parse_insert(&mut self) -> Result<Command, DbError> {
        self.expect_keyword("into")?;
        let table = self.parse_identifier("table name")?;
        self.expect_keyword("values")?;
        self.expect_token(&Token::LParen)?;

        let mut values = vec![];
        if self.consume_token(&Token::RParen) {
            return Ok(Command::Insert { table, values });
        }
        loop {
            values.push(self.parse_literal()?);
            if self.consume_token(&Token::Comma) {
                continue;
            }
            self.expect_token(&Token::RParen)?;
            break;
        }

        Ok(Command::Insert { table, values })
    }

    fn parse_select(&mut self) -> Result<Command, DbError> {
        self.expect_keyword("from")?;
        let table = self.parse_identifier("table name")?;
        let filter = if self.peek_keyword("where") {
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Command::Select { table, filter })
    }

    fn parse_update(&mut self) -> Result<Command, DbError> {
        let table = self.parse_identifier("table name")?;
        self.expect_keyword("set")?;

        let mut set = vec![self.parse_assignment()?];
        while self.consume_token(&Token::Comma) {
            set.push(self.parse_assignment()?);
        }
        let filter = self.parse_where()?;

        Ok(Command::Update { table, set, filter })
    }

    fn parse_delete(&mut self) -> Result<Command, DbError> {
        self.expect_keyword("from")?;
        let table = self.parse_identifier("table name")?;
        let filter = self.parse_where()?;

        Ok(Command::Delete { table, filter })
    }

    /// `where <column> = <value>`, with the value unquoted for comparison.
    fn parse_where(&mut self) -> Result<Clause, DbError> {
        self.expect_keyword("where")?;
        let column = self.parse_identifier("column name")?;
        self.expect_token(&Token::Eq)?;
        let value = self.parse_literal()?;

        Ok(Clause::new(column, strip_quotes(&value)))
    }

    /// `<column> = <value>`, with the value kept raw for coercion.
    fn parse_assignment(&mut self) -> Result<Clause, DbError> {
        let column = self.parse_identifier("column name")?;
        self.expect_token(&Token::Eq)?;
        let value = self.parse_literal()?;

        Ok(Clause::new(column, value))
    }

    fn parse_identifier(&mut self, what: &str) -> Result<String, DbError> {
        match self.next_token() {
            Some(Token::Word(word)) => Ok(word.value),
            Some(token) => Err(DbError::syntax(format!(
                "expected {}, found \"{}\"",
                what, token
            ))),
            None => Err(DbError::syntax(format!("expected {}", what))),
        }
    }

    /// A value as the user wrote it, quotes included.
    fn parse_literal(&mut self) -> Result<String, DbError> {
        match self.next_token() {
            Some(token @ (Token::Word(_) | Token::SingleQuotedString(_) | Token::Number(..))) => {
                Ok(token.to_string())
            }
            Some(sign @ (Token::Minus | Token::Plus)) => match self.next_token() {
                Some(Token::Number(n, _)) => Ok(format!("{}{}", sign, n)),
                _ => Err(DbError::syntax(format!("expected a number after \"{}\"", sign))),
            },
            Some(token) => Err(DbError::syntax(format!(
                "expected a value, found \"{}\"",
                token
            ))),
            None => Err(DbError::syntax("expected a value")),
        }
    }

    fn whitespace_groups(&self) -> Vec<Vec<Token>> {
        let mut groups = vec![];
        let mut current = vec![];
        for token in &self.raw {
            match token {
                Token::Whitespace(_) | Token::EOF => {
                    if !current.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                }
                token => current.push(token.clone()),
            }
        }
        if !current.is_empty() {
            groups.push(current);
        }
        groups
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.tokens.get(self.index),
            Some(Token::Word(word))
                if word.quote_style.is_none() && word.value.eq_ignore_ascii_case(keyword)
        )
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), DbError> {
        if self.peek_keyword(keyword) {
            self.index += 1;
            return Ok(());
        }
        Err(self.unexpected(&format!("\"{}\"", keyword)))
    }

    fn consume_token(&mut self, expected: &Token) -> bool {
        if self.tokens.get(self.index) == Some(expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), DbError> {
        if self.consume_token(expected) {
            return Ok(());
        }
        Err(self.unexpected(&format!("\"{}\"", expected)))
    }

    fn expect_end(&self) -> Result<(), DbError> {
        match self.tokens.get(self.index) {
            None => Ok(()),
            Some(token) => Err(DbError::syntax(format!("unexpected \"{}\"", token))),
        }
    }

    fn unexpected(&self, expected: &str) -> DbError {
        match self.tokens.get(self.index) {
            Some(token) => DbError::syntax(format!("expected {}, found \"{}\"", expected, token)),
            None => DbError::syntax(format!("expected {}", expected)),
        }
    }
}

fn group_text(group: &[Token]) -> String {
    group.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    fn syntax_error(line: &str) -> String {
        let err = line.parse::<Command>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax, "{}", line);
        err.message
    }

    #[test]
    fn table_lifecycle_commands() {
        assert_eq!(
            parse("create_table users name:str age:int"),
            Command::CreateTable {
                name: "users".into(),
                columns: vec!["name:str".into(), "age:int".into()],
            }
        );
        assert_eq!(
            parse("create_table users"),
            Command::CreateTable {
                name: "users".into(),
                columns: vec![],
            }
        );
        assert_eq!(
            parse("drop_table users"),
            Command::DropTable {
                name: "users".into()
            }
        );
        assert_eq!(parse("  LIST_TABLES "), Command::ListTables);
        assert_eq!(
            parse("info users"),
            Command::Info {
                name: "users".into()
            }
        );
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("exit"), Command::Exit);
    }

    #[test]
    fn malformed_specs_reach_the_catalog() {
        // Validation of `name:type` belongs to the catalog, not the parser.
        assert_eq!(
            parse("create_table t age"),
            Command::CreateTable {
                name: "t".into(),
                columns: vec!["age".into()],
            }
        );
    }

    #[test]
    fn create_table_name_is_a_single_word() {
        assert!(syntax_error("create_table my-table v:int").contains("\"my-table\""));
        assert!(syntax_error("create_table 42 v:int").contains("\"42\""));
        // Quoted names lose their quotes, as they do in every other command.
        assert_eq!(
            parse("create_table \"quoted\" v:int"),
            Command::CreateTable {
                name: "quoted".into(),
                columns: vec!["v:int".into()],
            }
        );
        assert_eq!(
            parse("insert into \"quoted\" values (1)"),
            Command::Insert {
                table: "quoted".into(),
                values: vec!["1".into()],
            }
        );
    }

    #[test]
    fn insert_keeps_raw_values() {
        assert_eq!(
            parse("insert into users values (\"Sergei\", 28, true, 'it''s', -4)"),
            Command::Insert {
                table: "users".into(),
                values: vec![
                    "\"Sergei\"".into(),
                    "28".into(),
                    "true".into(),
                    "'it's'".into(),
                    "-4".into(),
                ],
            }
        );
        assert_eq!(
            parse("insert into t values ()"),
            Command::Insert {
                table: "t".into(),
                values: vec![],
            }
        );
    }

    #[test]
    fn select_with_and_without_filter() {
        assert_eq!(
            parse("select from users"),
            Command::Select {
                table: "users".into(),
                filter: None,
            }
        );
        assert_eq!(
            parse("select from users where name = \"Sergei\""),
            Command::Select {
                table: "users".into(),
                filter: Some(Clause::new("name", "Sergei")),
            }
        );
        assert_eq!(
            parse("select from users where age=28"),
            Command::Select {
                table: "users".into(),
                filter: Some(Clause::new("age", "28")),
            }
        );
    }

    #[test]
    fn update_and_delete() {
        assert_eq!(
            parse("update users set age = 29 where name = 'Sergei'"),
            Command::Update {
                table: "users".into(),
                set: vec![Clause::new("age", "29")],
                filter: Clause::new("name", "Sergei"),
            }
        );
        assert_eq!(
            parse("update users set age = 29, name = \"Serg\" where ID = 1"),
            Command::Update {
                table: "users".into(),
                set: vec![Clause::new("age", "29"), Clause::new("name", "\"Serg\"")],
                filter: Clause::new("ID", "1"),
            }
        );
        assert_eq!(
            parse("delete from users where ID = 1"),
            Command::Delete {
                table: "users".into(),
                filter: Clause::new("ID", "1"),
            }
        );
    }

    #[test]
    fn malformed_clauses() {
        assert!(syntax_error("select from users where age 28").contains("\"=\""));
        assert!(syntax_error("select from users where age =").contains("value"));
        syntax_error("select from users where");
        syntax_error("update users set age where ID = 1");
        syntax_error("update users set age = 1");
        syntax_error("delete from users");
        syntax_error("insert into users values (1, 2");
        syntax_error("insert users values (1)");
        syntax_error("drop_table");
        syntax_error("list_tables now");
    }

    #[test]
    fn unknown_and_empty_input() {
        assert!(syntax_error("vacuum users").contains("unknown command"));
        assert!(syntax_error("").contains("empty"));
        syntax_error("insert into t values ('unterminated");
    }

    #[test]
    fn mutations() {
        assert!(parse("delete from t where ID = 1").is_mutation());
        assert!(parse("create_table t").is_mutation());
        assert!(!parse("select from t").is_mutation());
        assert!(!parse("info t").is_mutation());
    }
}
