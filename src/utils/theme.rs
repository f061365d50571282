use colored::Colorize;

pub struct Theme {
    pub prompt_success: String,
    pub prompt_error: String,
    pub welcome_message: String,
    pub exit_message: String,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub success_style: Box<dyn Fn(String) -> String>,
}

impl Theme {
    /// 提示符按上一条命令的退出状态变色：成功绿、失败红
    pub fn prompt(&self, last_status: i32) -> &str {
        if last_status == 0 {
            &self.prompt_success
        } else {
            &self.prompt_error
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt_success: "~ ".green().to_string(),
            prompt_error: "~ ".red().to_string(),
            welcome_message: "欢迎使用 vush～输入 exit 或 Ctrl-D 退出"
                .bright_cyan()
                .to_string(),
            exit_message: "再见～".bright_cyan().to_string(),
            error_style: Box::new(|s| s.bright_red().to_string()),
            success_style: Box::new(|s| s.bright_cyan().to_string()),
        }
    }
}

pub fn load_theme(theme_name: &str) -> Theme {
    match theme_name {
        "plain" => Theme {
            prompt_success: "~ ".to_string(),
            prompt_error: "~ ".to_string(),
            welcome_message: "欢迎使用 vush".to_string(),
            exit_message: "再见".to_string(),
            error_style: Box::new(|s| s),
            success_style: Box::new(|s| s),
        },
        _ => Theme::default(),
    }
}
