use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::Write;
use std::process;

pub fn init_logger(config: &Config) {
    let level = match &config.logger_level {
        level if level.eq_ignore_ascii_case("error") => LevelFilter::Error,
        level if level.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        level if level.eq_ignore_ascii_case("info") => LevelFilter::Info,
        level if level.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        level if level.eq_ignore_ascii_case("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    };

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                process::id(),
                record.level(),
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .filter(Some(&config.name), level)
        .filter(None, LevelFilter::Warn);

    // 日志写进配置目录下按日期命名的文件；建不出来就退回 stderr
    match open_log_file(config) {
        Some(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }

    builder.init();
    log::debug!("日志级别设置为: {}", level);
}

fn open_log_file(config: &Config) -> Option<File> {
    if let Err(e) = fs::create_dir_all(&config.logger_dir) {
        eprintln!("vush: 无法创建日志目录: {}", e);
        return None;
    }
    let date = Local::now().format("%Y-%m-%d");
    let log_file = config.logger_dir.join(format!("vush_{}.log", date));
    match File::options().create(true).append(true).open(&log_file) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("vush: 无法创建日志文件: {}", e);
            None
        }
    }
}
