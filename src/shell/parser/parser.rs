use super::ast::{Pipeline, Redirection, Stage};
use super::lexer::{Lexer, RedirectOp, Token};

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    fn next_token(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// 把整行解析成一条流水线。空行（零 token）返回空流水线，
    /// 管道符前后缺命令一律按语法错误处理。
    pub fn parse_pipeline(&mut self) -> Result<Pipeline, String> {
        let mut pipeline = Pipeline::default();
        if self.current_token == Token::Eof {
            return Ok(pipeline);
        }

        loop {
            pipeline.stages.push(self.parse_stage()?);

            match self.current_token {
                Token::Eof => break,
                Token::Pipe => {
                    self.next_token();
                    if self.current_token == Token::Eof {
                        return Err("syntax error: missing command after `|`".to_string());
                    }
                }
                _ => return Err("syntax error: unexpected token".to_string()),
            }
        }

        Ok(pipeline)
    }

    fn parse_stage(&mut self) -> Result<Stage, String> {
        let mut stage = Stage::default();

        // 阶段的第一个 token 必须是命令名
        match &self.current_token {
            Token::Word(word) => {
                stage.program = word.clone();
                self.next_token();
            }
            _ => return Err("syntax error: missing command before `|`".to_string()),
        }

        // 其余 token 是参数或重定向
        loop {
            match &self.current_token {
                Token::Eof | Token::Pipe => break,
                Token::Redirect(op) => {
                    let redirection = self.parse_redirection(*op)?;
                    stage.redirections.push(redirection);
                }
                Token::Word(word) => {
                    stage.arguments.push(word.clone());
                    self.next_token();
                }
            }
        }

        Ok(stage)
    }

    /// 连续两个相同操作符折叠为追加 / here-doc 形式
    fn parse_redirection(&mut self, first: RedirectOp) -> Result<Redirection, String> {
        self.next_token();

        let operator = if self.current_token == Token::Redirect(first) {
            self.next_token();
            match first {
                RedirectOp::Output => RedirectOp::Append,
                RedirectOp::Input => RedirectOp::HereDoc,
                other => other,
            }
        } else {
            first
        };

        match &self.current_token {
            Token::Word(target) => {
                let redirection = Redirection {
                    operator,
                    target: target.clone(),
                };
                self.next_token();
                Ok(redirection)
            }
            _ => Err("syntax error: expected filename after redirection operator".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_simple_command() {
        let mut parser = Parser::new("ls -l /tmp");
        let pipeline = parser.parse_pipeline().unwrap();

        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(pipeline.stages[0].program, "ls");
        assert_eq!(pipeline.stages[0].arguments, vec!["-l", "/tmp"]);
        assert!(pipeline.stages[0].redirections.is_empty());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_pipeline_order_is_source_order() {
        let mut parser = Parser::new("cat /etc/passwd | grep root | wc -l");
        let pipeline = parser.parse_pipeline().unwrap();

        assert_eq!(pipeline.stages.len(), 3);
        assert_eq!(pipeline.stages[0].program, "cat");
        assert_eq!(pipeline.stages[1].program, "grep");
        assert_eq!(pipeline.stages[2].program, "wc");
        assert_eq!(pipeline.stages[2].arguments, vec!["-l"]);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_redirection_removed_from_arguments() {
        let mut parser = Parser::new("echo hello > out.txt");
        let pipeline = parser.parse_pipeline().unwrap();

        let stage = &pipeline.stages[0];
        assert_eq!(stage.program, "echo");
        assert_eq!(stage.arguments, vec!["hello"]);
        assert_eq!(stage.redirections.len(), 1);
        assert_eq!(stage.redirections[0].target, "out.txt");
        assert!(matches!(
            stage.redirections[0].operator,
            RedirectOp::Output
        ));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_doubled_output_is_append() {
        let mut parser = Parser::new("echo hi >> log.txt");
        let pipeline = parser.parse_pipeline().unwrap();

        let stage = &pipeline.stages[0];
        assert_eq!(stage.redirections.len(), 1);
        assert!(matches!(
            stage.redirections[0].operator,
            RedirectOp::Append
        ));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_doubled_input_is_heredoc() {
        let mut parser = Parser::new("cat << EOF");
        let pipeline = parser.parse_pipeline().unwrap();

        let stage = &pipeline.stages[0];
        assert!(matches!(
            stage.redirections[0].operator,
            RedirectOp::HereDoc
        ));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_multiple_redirections_keep_order() {
        let mut parser = Parser::new("tr a-z A-Z < in.txt > out.txt");
        let pipeline = parser.parse_pipeline().unwrap();

        let stage = &pipeline.stages[0];
        assert_eq!(stage.arguments, vec!["a-z", "A-Z"]);
        assert_eq!(stage.redirections.len(), 2);
        assert!(matches!(stage.redirections[0].operator, RedirectOp::Input));
        assert!(matches!(
            stage.redirections[1].operator,
            RedirectOp::Output
        ));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_empty_line_is_empty_pipeline() {
        let mut parser = Parser::new("   \t  ");
        let pipeline = parser.parse_pipeline().unwrap();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_empty_stage_is_syntax_error() {
        assert!(Parser::new("| cat").parse_pipeline().is_err());
        assert!(Parser::new("ls |").parse_pipeline().is_err());
        assert!(Parser::new("a | | b").parse_pipeline().is_err());
    }

    #[test]
    fn test_missing_redirect_target_is_syntax_error() {
        assert!(Parser::new("echo hi >").parse_pipeline().is_err());
        assert!(Parser::new("cat < | wc").parse_pipeline().is_err());
    }
}
