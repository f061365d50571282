/// 分词用的空白字符集合（含退格铃等控制字符）
const BLANK_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\x07'];

/// 需要保证独立成词的操作符字符
const OPERATOR_CHARS: &[char] = &['|', '<', '>'];

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Word(String),
    Pipe,
    Redirect(RedirectOp),
    Eof,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RedirectOp {
    Input,   // <
    Output,  // >
    Append,  // 连续两个 >
    HereDoc, // 连续两个 <（未实现，解析时识别、执行时报错）
}

/// 预处理：给每个操作符补上前后空格，保证它不会和相邻单词粘在一起。
/// 纯文本变换，对同一行里的多次出现、相邻操作符一视同仁。
pub fn prepare_line(line: &str) -> String {
    let mut prepared = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        if OPERATOR_CHARS.contains(&c) {
            prepared.push(' ');
            prepared.push(c);
            prepared.push(' ');
        } else {
            prepared.push(c);
        }
    }
    prepared
}

pub struct Lexer {
    tokens: std::vec::IntoIter<String>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let prepared = prepare_line(input);
        let tokens: Vec<String> = prepared
            .split(|c: char| BLANK_CHARS.contains(&c))
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Self {
            tokens: tokens.into_iter(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        match self.tokens.next() {
            None => Token::Eof,
            Some(t) => match t.as_str() {
                "|" => Token::Pipe,
                ">" => Token::Redirect(RedirectOp::Output),
                "<" => Token::Redirect(RedirectOp::Input),
                _ => Token::Word(t),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_pads_every_occurrence() {
        assert_eq!(prepare_line("a|b|c"), "a | b | c");
        assert_eq!(prepare_line("a>b"), "a > b");
        // 相邻操作符各自补空格，中间留两个空格，分词时会一并吃掉
        assert_eq!(prepare_line("a>>b"), "a >  > b");
    }

    #[test]
    fn test_simple_command() {
        let mut lexer = Lexer::new("ls -l");
        assert_eq!(lexer.next_token(), Token::Word("ls".to_string()));
        assert_eq!(lexer.next_token(), Token::Word("-l".to_string()));
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn test_glued_pipe() {
        let mut lexer = Lexer::new("ls|grep foo");
        assert_eq!(lexer.next_token(), Token::Word("ls".to_string()));
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert_eq!(lexer.next_token(), Token::Word("grep".to_string()));
        assert_eq!(lexer.next_token(), Token::Word("foo".to_string()));
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn test_doubled_redirect_stays_two_tokens() {
        let mut lexer = Lexer::new("echo hi >> out.txt");
        assert_eq!(lexer.next_token(), Token::Word("echo".to_string()));
        assert_eq!(lexer.next_token(), Token::Word("hi".to_string()));
        assert_eq!(lexer.next_token(), Token::Redirect(RedirectOp::Output));
        assert_eq!(lexer.next_token(), Token::Redirect(RedirectOp::Output));
        assert_eq!(lexer.next_token(), Token::Word("out.txt".to_string()));
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn test_blank_line_yields_no_tokens() {
        let mut lexer = Lexer::new("  \t \r ");
        assert_eq!(lexer.next_token(), Token::Eof);
    }
}
