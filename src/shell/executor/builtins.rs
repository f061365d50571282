use log::debug;
use std::env;
use std::io::{self, Write};
use std::process;

use crate::shell::parser::ast::Stage;
use crate::utils::path;

/// 内建命令表，与检测逻辑共用
pub const BUILTIN_NAMES: &[&str] = &["cd", "pwd", "exit", "export", "alias"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// 在本进程里执行内建命令，返回退出状态。
/// 失败只打印报告，不影响交互会话本身。
pub fn dispatch(stage: &Stage) -> i32 {
    debug!("执行内建命令: {:?}", stage.program);
    match stage.program.as_str() {
        "cd" => builtin_cd(&stage.arguments),
        "pwd" => builtin_pwd(),
        "exit" => builtin_exit(),
        "export" => builtin_export(&stage.arguments),
        // alias 占位：识别但不执行任何动作
        "alias" => 0,
        _ => {
            eprintln!("vush: {}: not a builtin", stage.program);
            1
        }
    }
}

fn builtin_cd(args: &[String]) -> i32 {
    let path = args.first().map(|s| s.as_str()).unwrap_or("~");
    let path = shellexpand::tilde(path);
    match env::set_current_dir(path.as_ref()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("vush: cd: {}: {}", path, e);
            1
        }
    }
}

fn builtin_pwd() -> i32 {
    // 直接写文件描述符，重定向到文件时才能落到目标上
    let mut stdout = io::stdout();
    if let Err(e) = writeln!(stdout, "{}", path::current_dir()) {
        eprintln!("vush: pwd: {}", e);
        return 1;
    }
    let _ = stdout.flush();
    0
}

fn builtin_exit() -> ! {
    debug!("exit: 结束交互会话");
    process::exit(0);
}

/// export NAME=VALUE：按第一个 = 切分；没有 = 则静默忽略
fn builtin_export(args: &[String]) -> i32 {
    let Some(assignment) = args.first() else {
        return 0;
    };
    if let Some((name, value)) = assignment.split_once('=') {
        debug!("设置环境变量: {}={}", name, value);
        env::set_var(name, value);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_detection() {
        for name in ["cd", "pwd", "exit", "export", "alias"] {
            assert!(is_builtin(name));
        }
        assert!(!is_builtin("ls"));
        assert!(!is_builtin(""));
    }

    #[test]
    fn test_export_without_equals_is_noop() {
        let args = vec!["VUSH_NO_EQ_MARKER".to_string()];
        assert_eq!(builtin_export(&args), 0);
        assert!(env::var("VUSH_NO_EQ_MARKER").is_err());
    }

    #[test]
    fn test_export_splits_on_first_equals() {
        let args = vec!["VUSH_EQ_TEST=a=b".to_string()];
        assert_eq!(builtin_export(&args), 0);
        assert_eq!(env::var("VUSH_EQ_TEST").ok().as_deref(), Some("a=b"));
    }

    #[test]
    fn test_cd_to_missing_dir_keeps_cwd() {
        let before = env::current_dir().ok();
        let args = vec!["/vush-no-such-dir".to_string()];
        assert_eq!(builtin_cd(&args), 1);
        assert_eq!(env::current_dir().ok(), before);
    }
}
