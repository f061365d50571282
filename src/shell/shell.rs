use log::{debug, error, warn};
use std::error::Error;
use std::io::Write;

use crate::shell::executor::Executor;
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::theme::Theme;

/// 语法错误的退出状态
const SYNTAX_ERROR_STATUS: i32 = 2;

pub struct Shell<'a> {
    theme: Theme,
    readline: ReadlineManager<'a>,
    executor: Executor,
    last_status: i32,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: Theme) -> Self {
        Self {
            theme,
            readline: ReadlineManager::new(config),
            executor: Executor::new(),
            last_status: 0,
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 vush...");
        self.readline.load_history()?;

        println!(
            "{}",
            (self.theme.success_style)(self.theme.welcome_message.clone())
        );
        debug!("vush 准备就绪...");

        self.run_loop()?;
        self.readline.save_history()?;

        debug!("退出 vush...");
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = self.theme.prompt(self.last_status).to_string();

            match self.readline.readline(&prompt) {
                Ok(line) => self.handle_input(&line),
                Err(err) => match err {
                    // EOF 与 exit 内建等价：干净收尾
                    ReadlineError::Eof => {
                        warn!("接收到 EOF 信号，退出 vush...");
                        println!(
                            "{}",
                            (self.theme.success_style)(self.theme.exit_message.clone())
                        );
                        break;
                    }
                    ReadlineError::Interrupted => {
                        debug!("接收到中断信号，丢弃当前行");
                    }
                    err => {
                        error!("发生错误: {}", err);
                        eprintln!("{}", (self.theme.error_style)(format!("vush: {}", err)));
                    }
                },
            }
        }
        Ok(())
    }

    /// 一行输入走完 解析 → 执行，并记录末级退出状态。
    /// 空行不产生任何进程，上一次的状态保持不变。
    fn handle_input(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        if let Err(err) = self.readline.add_history(line.to_string()) {
            warn!("写入历史记录失败: {}", err);
        }
        debug!("执行命令: {}", line);

        let mut parser = Parser::new(line);
        match parser.parse_pipeline() {
            Ok(pipeline) => {
                if pipeline.is_empty() {
                    return;
                }
                match self.executor.execute(pipeline) {
                    Ok(status) => {
                        debug!("退出状态: {}", status);
                        self.last_status = status;
                    }
                    Err(e) => {
                        eprintln!("{}", (self.theme.error_style)(format!("vush: {}", e)));
                        self.last_status = 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("{}", (self.theme.error_style)(format!("vush: {}", e)));
                self.last_status = SYNTAX_ERROR_STATUS;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::theme;

    #[test]
    fn test_blank_line_keeps_last_status() {
        let config = Config::new();
        let mut shell = Shell::new(&config, theme::load_theme("plain"));
        shell.last_status = 7;

        // 普通空白行在 trim 检查处就返回
        shell.handle_input("   \t  ");
        assert_eq!(shell.last_status, 7);

        // 只含控制字符的行要到分词后才发现是空流水线，同样不动状态
        shell.handle_input("\x07");
        assert_eq!(shell.last_status, 7);
    }

    #[test]
    fn test_syntax_error_sets_status() {
        let config = Config::new();
        let mut shell = Shell::new(&config, theme::load_theme("plain"));
        shell.handle_input("ls |");
        assert_eq!(shell.last_status, SYNTAX_ERROR_STATUS);
    }
}
