use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use nix::unistd::{close, dup, dup2};

use crate::shell::parser::ast::Redirection;
use crate::shell::parser::lexer::RedirectOp;

/// 输出重定向建新文件时的权限：属主读写、同组只读
const REDIRECT_FILE_MODE: u32 = 0o640;

/// 一个已经打开的重定向目标，等待被 dup 到标准流上
pub struct RedirectTarget {
    file: File,
    slot: RawFd,
}

fn target_slot(operator: RedirectOp) -> RawFd {
    match operator {
        RedirectOp::Input | RedirectOp::HereDoc => libc::STDIN_FILENO,
        RedirectOp::Output | RedirectOp::Append => libc::STDOUT_FILENO,
    }
}

fn open_target(redirection: &Redirection) -> io::Result<File> {
    let mut options = OpenOptions::new();
    match redirection.operator {
        RedirectOp::Input => {
            options.read(true);
        }
        RedirectOp::Output => {
            options
                .write(true)
                .create(true)
                .truncate(true)
                .mode(REDIRECT_FILE_MODE);
        }
        RedirectOp::Append => {
            options.append(true).create(true).mode(REDIRECT_FILE_MODE);
        }
        RedirectOp::HereDoc => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "here-document redirection is not supported",
            ));
        }
    }
    options
        .open(&redirection.target)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", redirection.target, e)))
}

/// 在任何进程启动之前打开一个阶段的全部重定向目标，保持
/// 从左到右的顺序。任何一个目标打不开，整个阶段都不会启动。
pub fn open_stage(redirections: &[Redirection]) -> io::Result<Vec<RedirectTarget>> {
    let mut targets = Vec::with_capacity(redirections.len());
    for redirection in redirections {
        targets.push(RedirectTarget {
            file: open_target(redirection)?,
            slot: target_slot(redirection.operator),
        });
    }
    Ok(targets)
}

/// 子进程里把打开的目标复制到标准流上。原始描述符带
/// O_CLOEXEC，exec 时自动回收，不需要手动关闭。
pub fn apply(targets: &[RedirectTarget]) -> io::Result<()> {
    for target in targets {
        dup2(target.file.as_raw_fd(), target.slot)?;
    }
    Ok(())
}

/// 内建命令在本进程里执行，重定向需要先备份再恢复标准流。
/// Drop 时按相反顺序恢复。
pub struct RedirectGuard {
    saved: Vec<(RawFd, RawFd)>, // (标准流槽位, 备份描述符)
}

impl RedirectGuard {
    pub fn apply(redirections: &[Redirection]) -> io::Result<Self> {
        let mut guard = RedirectGuard { saved: Vec::new() };
        for redirection in redirections {
            let file = open_target(redirection)?;
            let slot = target_slot(redirection.operator);
            let backup = dup(slot)?;
            if let Err(e) = dup2(file.as_raw_fd(), slot) {
                let _ = close(backup);
                return Err(e.into());
            }
            guard.saved.push((slot, backup));
        }
        Ok(guard)
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        // 恢复前先把缓冲写给重定向目标
        let _ = io::stdout().flush();
        for (slot, backup) in self.saved.iter().rev() {
            let _ = dup2(*backup, *slot);
            let _ = close(*backup);
        }
    }
}
