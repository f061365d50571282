use log::{debug, error};
use std::convert::Infallible;
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execvp, fork, pipe, ForkResult, Pid};

use super::builtins;
use super::redirect::{self, RedirectGuard, RedirectTarget};
use crate::shell::parser::ast::{Pipeline, Stage};

/// 末级进程等不到时的状态哨兵
const WAIT_FAILED_STATUS: i32 = -1;

/// 外部命令找不到 / 无法替换进程映像时子进程的退出码
const EXIT_NOT_FOUND: i32 = 127;
const EXIT_EXEC_FAILED: i32 = 126;

pub struct Executor;

/// 重定向目标全部打开之后、fork 之前的阶段
struct PreparedStage {
    stage: Stage,
    targets: Vec<RedirectTarget>,
}

impl Executor {
    pub fn new() -> Self {
        Executor
    }

    /// 执行一条流水线，返回末级阶段的退出状态。
    /// 单阶段且命令名是内建时在本进程里调度，其余一律 fork。
    pub fn execute(&mut self, pipeline: Pipeline) -> io::Result<i32> {
        if pipeline.is_empty() {
            return Ok(0);
        }

        if pipeline.stages.len() == 1 && builtins::is_builtin(&pipeline.stages[0].program) {
            let stage = &pipeline.stages[0];
            let _guard = RedirectGuard::apply(&stage.redirections)?;
            return Ok(builtins::dispatch(stage));
        }

        self.run_pipeline(pipeline.stages)
    }

    fn run_pipeline(&mut self, stages: Vec<Stage>) -> io::Result<i32> {
        // 先解析全部重定向；任何一个目标打不开，整条流水线都不启动
        let mut prepared = Vec::with_capacity(stages.len());
        for stage in stages {
            let targets = redirect::open_stage(&stage.redirections)?;
            prepared.push(PreparedStage { stage, targets });
        }

        let mut children = Vec::with_capacity(prepared.len());
        let spawn_result = spawn_stages(prepared, &mut children);
        let status = wait_children(&children);
        // 中途 fork/pipe 失败也要先把已经生出来的阶段收割掉
        spawn_result?;
        Ok(status)
    }
}

/// 把所有阶段一口气 fork 出来、按从左到右的顺序接好管道，
/// 之后才开始等待。某一级写满管道缓冲时下一级已经在读，
/// 不会死锁。
fn spawn_stages(prepared: Vec<PreparedStage>, children: &mut Vec<Pid>) -> io::Result<()> {
    let last = prepared.len() - 1;
    let mut stage_stdin: Option<OwnedFd> = None;

    for (i, prep) in prepared.into_iter().enumerate() {
        let stage_pipe = if i < last { Some(pipe()?) } else { None };

        match unsafe { fork() }.map_err(io::Error::from)? {
            ForkResult::Parent { child } => {
                debug!("阶段 {} ({}) pid={}", i, prep.stage.program, child);
                children.push(child);
                // 子进程已持有两端；父进程立刻放掉写端和上一只读端，
                // 否则下游永远读不到 EOF
                stage_stdin = stage_pipe.map(|(read_end, _write_end)| read_end);
            }
            ForkResult::Child => run_child(prep, stage_stdin, stage_pipe),
        }
    }
    Ok(())
}

/// 子进程侧：接好描述符然后 exec。永不返回；任何失败都只
/// 终止当前子进程，报告后以非零状态退出，不会波及父进程。
fn run_child(
    prep: PreparedStage,
    stage_stdin: Option<OwnedFd>,
    stage_pipe: Option<(OwnedFd, OwnedFd)>,
) -> ! {
    let err = match wire_and_exec(&prep, stage_stdin, stage_pipe) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    let code = if err.kind() == io::ErrorKind::NotFound {
        EXIT_NOT_FOUND
    } else {
        EXIT_EXEC_FAILED
    };
    eprintln!("vush: {}: {}", prep.stage.program, err);
    unsafe { libc::_exit(code) }
}

fn wire_and_exec(
    prep: &PreparedStage,
    stage_stdin: Option<OwnedFd>,
    stage_pipe: Option<(OwnedFd, OwnedFd)>,
) -> io::Result<Infallible> {
    if let Some(fd) = stage_stdin {
        dup2(fd.as_raw_fd(), libc::STDIN_FILENO)?;
    }
    if let Some((read_end, write_end)) = stage_pipe {
        drop(read_end);
        dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO)?;
    }
    // 文件重定向在管道之后应用，两者冲突时以重定向为准
    redirect::apply(&prep.targets)?;

    let program = CString::new(prep.stage.program.as_str())?;
    let mut argv = Vec::with_capacity(prep.stage.arguments.len() + 1);
    argv.push(program.clone());
    for arg in &prep.stage.arguments {
        argv.push(CString::new(arg.as_str())?);
    }
    execvp(&program, &argv)?;
    unreachable!("execvp 只在失败时返回");
}

/// 按创建顺序等待全部阶段，整条流水线的状态取末级阶段
fn wait_children(children: &[Pid]) -> i32 {
    let mut status = 0;
    for (i, pid) in children.iter().enumerate() {
        let stage_status = match waitpid(*pid, None) {
            Ok(WaitStatus::Exited(_, code)) => code,
            Ok(WaitStatus::Signaled(_, signal, _)) => 128 + signal as i32,
            Ok(other) => {
                debug!("未预期的等待结果: {:?}", other);
                1
            }
            Err(e) => {
                error!("waitpid {} 失败: {}", pid, e);
                WAIT_FAILED_STATUS
            }
        };
        if i + 1 == children.len() {
            status = stage_status;
        }
    }
    status
}
